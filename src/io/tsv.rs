//! Essential TSV parsing functionality, which wraps the [`csv`] crate's reader.

use csv::{Reader, ReaderBuilder};
use std::io::Read;
use std::path::PathBuf;

use super::file::InputFile;
use crate::error::MethPlotError;

/// Strings read as a missing value in numeric columns.
pub const MISSING_VALUES: [&str; 4] = ["", ".", "NA", "NaN"];

/// Build a TSV reader which ignores comment lines and works on gzip-compressed
/// files.
///
/// Tables with a header row (site tables, region tables, style files) should
/// set `has_headers`; BED-like files have none.
pub fn build_tsv_reader(
    filepath: impl Into<PathBuf>,
    has_headers: bool,
) -> Result<Reader<Box<dyn Read>>, MethPlotError> {
    let input = InputFile::new(filepath);
    let stream: Box<dyn Read> = Box::new(input.reader()?);

    let reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_headers)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(stream);
    Ok(reader)
}

/// Parse a numeric cell, mapping any of [`MISSING_VALUES`] to `None`.
pub fn parse_optional_float(cell: &str) -> Result<Option<f64>, MethPlotError> {
    if MISSING_VALUES.contains(&cell) {
        return Ok(None);
    }
    let value: f64 = cell.parse()?;
    if value.is_nan() {
        return Ok(None);
    }
    Ok(Some(value))
}
