//! Traits used by the methtracks library.
//!

use crate::{error::MethPlotError, plot::PlotRequest, Position};

/// The [`GenericRange`] trait defines common functionality for all range types.
///
/// Ranges are 1-based and right-inclusive, so a range with equal start and end
/// covers a single base.
pub trait GenericRange: Clone {
    fn start(&self) -> Position;
    fn end(&self) -> Position;
    fn width(&self) -> Position {
        self.end() - self.start() + 1
    }
    /// Whether this range shares at least one base with `other`.
    fn overlaps<R: GenericRange>(&self, other: &R) -> bool {
        self.start() <= other.end() && other.start() <= self.end()
    }
    /// Whether `position` falls inside this range.
    fn contains(&self, position: Position) -> bool {
        self.start() <= position && position <= self.end()
    }
    /// Return a tuple version of this range.
    fn as_tuple(&self) -> (Position, Position) {
        (self.start(), self.end())
    }
}

/// A [`TrackRenderer`] draws a fully assembled [`PlotRequest`].
///
/// The render call is the only side effect of plotting; implementations should
/// not alter the request, and their errors are passed back to the caller as-is.
pub trait TrackRenderer {
    fn render(&self, request: &PlotRequest) -> Result<(), MethPlotError>;
}

/// Defines how to serialize something to TSV.
pub trait TsvSerialize {
    // Serialize something to a TSV [`String`].
    fn to_tsv(&self) -> String;
}

impl TsvSerialize for String {
    fn to_tsv(&self) -> String {
        self.to_string()
    }
}

impl TsvSerialize for Option<String> {
    fn to_tsv(&self) -> String {
        self.as_ref()
            .map_or("".to_string(), |x| format!("\t{}", x.to_tsv()))
    }
}

impl<U: TsvSerialize> TsvSerialize for Vec<U> {
    fn to_tsv(&self) -> String {
        self.iter()
            .map(|x| x.to_tsv())
            .collect::<Vec<_>>()
            .join("\t")
    }
}
