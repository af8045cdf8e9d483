//! Range types and validation.
//!

use crate::{
    error::MethPlotError,
    traits::{GenericRange, TsvSerialize},
    Position,
};

pub mod coitrees;

/// A bare 1-based, right-inclusive range on an implied sequence.
///
/// This is the normalized shape every DMR or enhancer input is reduced to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Region {
    pub start: Position,
    pub end: Position,
}

impl Region {
    /// Create a new 1-based right-inclusive range, checking `start <= end`.
    pub fn new(start: Position, end: Position) -> Result<Self, MethPlotError> {
        if start > end {
            return Err(MethPlotError::InvalidGenomicRange(start, end));
        }
        Ok(Self { start, end })
    }
}

impl GenericRange for Region {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

/// Represents a range on a named sequence, possibly containing some data.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRecord<U> {
    pub seqname: String,
    pub start: Position,
    pub end: Position,
    pub data: U,
}

impl<U> RangeRecord<U> {
    pub fn new(seqname: String, start: Position, end: Position, data: U) -> Self {
        Self {
            seqname,
            start,
            end,
            data,
        }
    }
}

impl<U: Clone> GenericRange for RangeRecord<U> {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

impl TsvSerialize for RangeRecord<()> {
    fn to_tsv(&self) -> String {
        format!("{}\t{}\t{}", self.seqname, self.start, self.end)
    }
}

impl<U: TsvSerialize> TsvSerialize for RangeRecord<Option<U>> {
    fn to_tsv(&self) -> String {
        match &self.data {
            None => format!("{}\t{}\t{}", self.seqname, self.start, self.end),
            Some(data) => format!(
                "{}\t{}\t{}\t{}",
                self.seqname,
                self.start,
                self.end,
                data.to_tsv()
            ),
        }
    }
}

/// Validates whether a given range is valid on a sequence of a given `length`.
///
/// # Arguments
///
/// * `start` - 1-based start position.
/// * `end` - 1-based, inclusive end position.
/// * `length` - The length of the sequence.
pub fn validate_range(
    start: Position,
    end: Position,
    length: Position,
) -> Result<(), MethPlotError> {
    if start > end {
        return Err(MethPlotError::InvalidGenomicRange(start, end));
    }

    if start == 0 || end > length {
        return Err(MethPlotError::InvalidGenomicRange(start, end));
    }
    Ok(())
}
