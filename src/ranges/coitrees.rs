use coitrees::{BasicCOITree, GenericInterval, Interval, IntervalTree};

use crate::{error::MethPlotError, traits::GenericRange, Position};

/// A [`coitrees::BasicCOITree`] interval tree over one sequence's ranges,
/// with each node carrying the index of its element in an external container.
pub struct COITrees {
    pub(crate) ranges: BasicCOITree<usize, usize>,
}

impl std::fmt::Debug for COITrees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("COITrees")
            .field("number of ranges:", &self.ranges.len())
            .finish()
    }
}

fn to_coitrees_coord(position: Position) -> Result<i32, MethPlotError> {
    position
        .try_into()
        .map_err(|_| MethPlotError::InvalidGenomicRange(position, position))
}

impl COITrees {
    /// Build the tree from ranges, indexing each node by its position in `ranges`.
    pub fn from_ranges<R: GenericRange>(ranges: &[R]) -> Result<Self, MethPlotError> {
        let mut intervals = Vec::with_capacity(ranges.len());
        for (index, range) in ranges.iter().enumerate() {
            // coitrees uses right-inclusive "last", same as our ranges
            let first = to_coitrees_coord(range.start())?;
            let last = to_coitrees_coord(range.end())?;
            intervals.push(Interval::new(first, last, index));
        }
        Ok(Self {
            ranges: BasicCOITree::new(&intervals),
        })
    }

    /// Return the sorted indices of all ranges overlapping `[start, end]`.
    pub fn query_indices(&self, start: Position, end: Position) -> Result<Vec<usize>, MethPlotError> {
        let first = to_coitrees_coord(start)?;
        let last = to_coitrees_coord(end)?;
        let mut hits = Vec::new();
        self.ranges.query(first, last, |node| hits.push(*node.metadata()));
        hits.sort_unstable();
        Ok(hits)
    }

    /// Return the number of ranges in this [`COITrees`] container.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Return whether the [`COITrees`] object is empty (contains no ranges).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::COITrees;
    use crate::ranges::Region;

    #[test]
    fn test_query_indices() {
        let ranges = vec![
            Region::new(1, 5).unwrap(),
            Region::new(4, 7).unwrap(),
            Region::new(10, 17).unwrap(),
        ];
        let tree = COITrees::from_ranges(&ranges).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.query_indices(5, 5).unwrap(), vec![0, 1]);
        assert_eq!(tree.query_indices(8, 9).unwrap(), Vec::<usize>::new());
        assert_eq!(tree.query_indices(7, 10).unwrap(), vec![1, 2]);
    }
}
