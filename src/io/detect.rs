//! Region filetype detection functionality.
//!

use std::path::PathBuf;

use super::file::InputFile;
use crate::{error::MethPlotError, Position};

/// Enum that indicates the shape of some region file.
#[derive(Debug, PartialEq)]
pub enum RegionFile {
    /// A table with a header row naming `start` and `end` columns.
    Table(PathBuf),
    /// A header-less BED-like file: sequence name, start and end first.
    Bedlike(PathBuf),
    Unsupported(PathBuf),
}

impl RegionFile {
    /// Detect the shape of a region file from its first non-comment line.
    ///
    /// Detection works like this:
    ///  1. Skip comment lines, starting with `#`, and blank lines.
    ///  2. If the line's tab-separated cells include `start` and `end`
    ///     (case-insensitive), it is a header and the file is a [`RegionFile::Table`].
    ///  3. If the line has at least three cells and the second and third parse
    ///     into [`Position`]s, the file is [`RegionFile::Bedlike`].
    ///  4. Anything else is [`RegionFile::Unsupported`].
    pub fn detect(filepath: impl Into<PathBuf>) -> Result<Self, MethPlotError> {
        let filepath: PathBuf = filepath.into();
        let line = InputFile::new(&filepath)
            .first_data_line()?
            .ok_or_else(|| MethPlotError::EmptyFile(filepath.to_string_lossy().to_string()))?;

        let cells: Vec<String> = line.split('\t').map(|c| c.trim().to_lowercase()).collect();
        let has_column = |name: &str| cells.iter().any(|c| c == name);
        if has_column("start") && has_column("end") {
            return Ok(RegionFile::Table(filepath));
        }

        if cells.len() >= 3
            && cells[1].parse::<Position>().is_ok()
            && cells[2].parse::<Position>().is_ok()
        {
            return Ok(RegionFile::Bedlike(filepath));
        }

        Ok(RegionFile::Unsupported(filepath))
    }
}

#[cfg(test)]
mod tests {
    use super::RegionFile;
    use crate::error::MethPlotError;

    #[test]
    fn test_region_file_detect() {
        assert!(matches!(
            RegionFile::detect("tests_data/dmrs.tsv").unwrap(),
            RegionFile::Table(_)
        ));
        assert!(matches!(
            RegionFile::detect("tests_data/dmrs.bed").unwrap(),
            RegionFile::Bedlike(_)
        ));
        assert!(matches!(
            RegionFile::detect("tests_data/invalid_regions.tsv").unwrap(),
            RegionFile::Unsupported(_)
        ));
    }

    #[test]
    fn test_empty_region_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            RegionFile::detect(file.path()),
            Err(MethPlotError::EmptyFile(_))
        ));
    }
}
