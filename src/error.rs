//! The [`MethPlotError`] `enum` definition and error messages.
//!
use crate::Position;
use genomap::GenomeMapError;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// The [`MethPlotError`] defines the standard set of errors that should
/// be passed to the user.
#[derive(Debug, Error)]
pub enum MethPlotError {
    // IO related errors
    #[error("File reading error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("TSV parsing error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("File '{0}' is empty")]
    EmptyFile(String),

    // Number parsing errors
    #[error("Integer parsing error: {0}")]
    ParseIntError(#[from] ParseIntError),
    #[error("Float parsing error: {0}")]
    ParseFloatError(#[from] ParseFloatError),

    // Configuration errors
    #[error("Unsupported genome '{0}': must be one of 'hg19', 'hg38', or 'mm39'")]
    UnsupportedGenome(String),
    #[error("Unsupported species '{0}': must be 'human' or 'mouse'")]
    UnsupportedSpecies(String),
    #[error("No {0} annotation is configured for '{1}'")]
    MissingAnnotation(&'static str, String),
    #[error("Sequence name '{0}' is not in the chromosome sizes of genome '{1}'")]
    UnknownChromosome(String, String),
    #[error("Genome file is invalid: {0}")]
    InvalidGenomeFile(String),
    #[error("Error encountered in genomap::GenomeMap")]
    GenomeMapError(#[from] GenomeMapError),
    #[error("Style file is invalid: {0}")]
    InvalidStyle(String),

    // Region input shape errors
    #[error("Region table has no '{0}' column")]
    MissingRegionColumn(&'static str),
    #[error("Region table has an invalid '{0}' entry: '{1}'")]
    InvalidRegionValue(&'static str, String),
    #[error("Genomic ranges are ragged: {0} seqnames, {1} starts, {2} ends")]
    RaggedRanges(usize, usize, usize),
    #[error("Unsupported region file format: {0}")]
    UnsupportedRegionFormat(String),
    #[error("Range invalid: start ({0}) must not be greater than end ({1})")]
    InvalidGenomicRange(Position, Position),
    #[error("Bed-like line has too few columns. The first three columns must be sequence name, and start and end positions.\nLine: {0}")]
    BedlikeTooFewColumns(String),

    // Methylation sites and grouping errors
    #[error("Methylation sites table is invalid: {0}")]
    InvalidSitesTable(String),
    #[error("Group file line needs a sample and a group: '{0}'")]
    InvalidGroupFile(String),
    #[error("Group assignment has {0} labels but there are {1} samples")]
    GroupLengthMismatch(usize, usize),
    #[error("Sample '{0}' has no group assigned")]
    UnassignedSample(String),
    #[error("Group assignment refers to unknown sample '{0}'")]
    UnknownSample(String),

    // Annotation errors
    #[error("GTF line is invalid: {0}")]
    InvalidGtfLine(String),

    // Rendering errors
    #[error("Rendering error: {0}")]
    Render(String),

    // Command line tool related errors
    #[error("Command line argument error: {0}")]
    ArgumentError(#[from] clap::error::Error),
}
