//! DMR and enhancer region inputs, and their normalization.
//!
//! Regions arrive in one of two shapes:
//!
//!  1. A [`RegionTable`]: a header-bearing table with (at least) `start` and
//!     `end` columns, e.g. a data frame dumped to TSV. An optional sequence
//!     name column (`chr`, `chrom`, `chromosome`, `seqname` or `seqnames`)
//!     restricts rows to a chromosome; without one, every row is taken to be
//!     on the plotted chromosome.
//!
//!  2. A [`GenomicRanges`] object: parallel sequence name, start and end
//!     vectors, e.g. as read from a BED file.
//!
//! Both normalize to the same thing, an ordered `Vec<Region>` on the plotted
//! chromosome, through [`RegionSet::normalize()`]. Input order is kept.

use std::path::PathBuf;

use log::debug;

use crate::{
    error::MethPlotError,
    io::{build_tsv_reader, detect::RegionFile},
    ranges::{RangeRecord, Region},
    reporting::Report,
    Position,
};

/// Column names recognized as holding the sequence name in a [`RegionTable`].
pub const SEQNAME_COLUMNS: [&str; 5] = ["chr", "chrom", "chromosome", "seqname", "seqnames"];

/// A table of regions with named columns; cells are kept as strings until
/// normalization so that malformed tables are reported with their content.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RegionTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Build a two-column `start`/`end` table.
    pub fn from_coordinates(coordinates: &[(Position, Position)]) -> Self {
        let headers = vec!["start".to_string(), "end".to_string()];
        let rows = coordinates
            .iter()
            .map(|(start, end)| vec![start.to_string(), end.to_string()])
            .collect();
        Self { headers, rows }
    }

    /// Read a tab-separated table with a header row.
    pub fn from_path(filepath: impl Into<PathBuf>) -> Result<Self, MethPlotError> {
        let mut reader = build_tsv_reader(filepath, true)?;
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, name: &'static str) -> Result<usize, MethPlotError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or(MethPlotError::MissingRegionColumn(name))
    }

    fn seqname_column(&self) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| SEQNAME_COLUMNS.contains(&h.as_str()))
    }

    /// Normalize the table's rows on `chromosome` into ordered [`Region`]s.
    pub fn normalize(
        &self,
        chromosome: &str,
        report: &mut Report,
    ) -> Result<Vec<Region>, MethPlotError> {
        let start_col = self.column("start")?;
        let end_col = self.column("end")?;
        let seqname_col = self.seqname_column();

        let mut regions = Vec::with_capacity(self.rows.len());
        let mut dropped = 0;
        for row in &self.rows {
            if let Some(col) = seqname_col {
                if row.get(col).map(|s| s.as_str()) != Some(chromosome) {
                    dropped += 1;
                    continue;
                }
            }
            let start = parse_cell(row, start_col, "start")?;
            let end = parse_cell(row, end_col, "end")?;
            regions.push(Region::new(start, end)?);
        }
        if dropped > 0 {
            report.add_issue(format!(
                "{} region table row(s) not on {} were dropped",
                dropped, chromosome
            ));
        }
        Ok(regions)
    }
}

fn parse_cell(row: &[String], col: usize, name: &'static str) -> Result<Position, MethPlotError> {
    let cell = row.get(col).map(|s| s.as_str()).unwrap_or("");
    cell.trim()
        .parse()
        .map_err(|_| MethPlotError::InvalidRegionValue(name, cell.to_string()))
}

/// A structured set of genomic ranges, stored as parallel vectors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenomicRanges {
    seqnames: Vec<String>,
    starts: Vec<Position>,
    ends: Vec<Position>,
}

impl GenomicRanges {
    /// Create a new [`GenomicRanges`], raising [`MethPlotError::RaggedRanges`]
    /// if the vectors are not all the same length.
    pub fn new(
        seqnames: Vec<String>,
        starts: Vec<Position>,
        ends: Vec<Position>,
    ) -> Result<Self, MethPlotError> {
        if seqnames.len() != starts.len() || starts.len() != ends.len() {
            return Err(MethPlotError::RaggedRanges(
                seqnames.len(),
                starts.len(),
                ends.len(),
            ));
        }
        Ok(Self {
            seqnames,
            starts,
            ends,
        })
    }

    /// Read a BED-like file. BED starts are 0-based, so they are shifted by one
    /// to the 1-based inclusive coordinates used everywhere else. A zero-length
    /// record (an insertion point) becomes the single base right after it.
    pub fn from_bed(filepath: impl Into<PathBuf>) -> Result<Self, MethPlotError> {
        let mut ranges = Self::default();
        let reader = build_tsv_reader(filepath, false)?;
        for record in reader.into_records() {
            let record = record?;
            if record.len() < 3 {
                let line = record.iter().collect::<Vec<_>>().join("\t");
                return Err(MethPlotError::BedlikeTooFewColumns(line));
            }
            let start: Position = record[1].parse()?;
            let end: Position = record[2].parse()?;
            let one_based = start
                .checked_add(1)
                .ok_or(MethPlotError::InvalidGenomicRange(start, end))?;
            let end = if end == start { one_based } else { end };
            ranges.push(record[0].to_string(), one_based, end);
        }
        Ok(ranges)
    }

    pub fn push(&mut self, seqname: String, start: Position, end: Position) {
        self.seqnames.push(seqname);
        self.starts.push(start);
        self.ends.push(end);
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the ranges as [`RangeRecord`]s.
    pub fn iter_records(&self) -> impl Iterator<Item = RangeRecord<()>> + '_ {
        self.seqnames
            .iter()
            .zip(self.starts.iter().zip(self.ends.iter()))
            .map(|(seqname, (start, end))| RangeRecord::new(seqname.clone(), *start, *end, ()))
    }

    /// Normalize the ranges on `chromosome` into ordered [`Region`]s.
    pub fn normalize(
        &self,
        chromosome: &str,
        report: &mut Report,
    ) -> Result<Vec<Region>, MethPlotError> {
        let mut regions = Vec::with_capacity(self.len());
        let mut dropped = 0;
        for record in self.iter_records() {
            if record.seqname != chromosome {
                dropped += 1;
                continue;
            }
            regions.push(Region::new(record.start, record.end)?);
        }
        if dropped > 0 {
            report.add_issue(format!(
                "{} genomic range(s) not on {} were dropped",
                dropped, chromosome
            ));
        }
        Ok(regions)
    }
}

/// A DMR input in either of its two supported shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum RegionSet {
    Table(RegionTable),
    Ranges(GenomicRanges),
}

impl RegionSet {
    /// Load a region file, picking the shape from the file's content.
    pub fn from_path(filepath: impl Into<PathBuf>) -> Result<Self, MethPlotError> {
        match RegionFile::detect(filepath)? {
            RegionFile::Table(path) => Ok(RegionSet::Table(RegionTable::from_path(path)?)),
            RegionFile::Bedlike(path) => Ok(RegionSet::Ranges(GenomicRanges::from_bed(path)?)),
            RegionFile::Unsupported(path) => Err(MethPlotError::UnsupportedRegionFormat(
                path.to_string_lossy().to_string(),
            )),
        }
    }

    /// Normalize either shape to an ordered sequence of [`Region`]s on
    /// `chromosome`. Regions on other sequences are dropped and noted in
    /// `report`.
    pub fn normalize(
        &self,
        chromosome: &str,
        report: &mut Report,
    ) -> Result<Vec<Region>, MethPlotError> {
        let regions = match self {
            RegionSet::Table(table) => table.normalize(chromosome, report)?,
            RegionSet::Ranges(ranges) => ranges.normalize(chromosome, report)?,
        };
        debug!("normalized {} region(s) on {}", regions.len(), chromosome);
        Ok(regions)
    }
}

impl From<RegionTable> for RegionSet {
    fn from(value: RegionTable) -> Self {
        RegionSet::Table(value)
    }
}

impl From<GenomicRanges> for RegionSet {
    fn from(value: GenomicRanges) -> Self {
        RegionSet::Ranges(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::temp_file;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_shape_invariance() {
        let table: RegionSet = RegionTable::from_coordinates(&[(300, 400), (100, 200)]).into();
        let ranges: RegionSet = GenomicRanges::new(
            strings(&["chr11", "chr11"]),
            vec![300, 100],
            vec![400, 200],
        )
        .unwrap()
        .into();

        let mut report = Report::new();
        let from_table = table.normalize("chr11", &mut report).unwrap();
        let from_ranges = ranges.normalize("chr11", &mut report).unwrap();
        assert_eq!(from_table, from_ranges);
        assert_eq!(
            from_table,
            vec![Region { start: 300, end: 400 }, Region { start: 100, end: 200 }]
        );
        assert!(report.is_empty());
    }

    #[test]
    fn test_other_chromosomes_dropped() {
        let ranges = GenomicRanges::new(
            strings(&["chr11", "chr2", "chr11"]),
            vec![1, 5, 10],
            vec![2, 6, 11],
        )
        .unwrap();
        let mut report = Report::new();
        let regions = RegionSet::from(ranges).normalize("chr11", &mut report).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(report.issues().len(), 1);

        let table = RegionTable::new(
            strings(&["seqnames", "start", "end", "pvalue"]),
            vec![
                strings(&["chr11", "10", "20", "0.01"]),
                strings(&["chr12", "10", "20", "0.02"]),
            ],
        );
        let mut report = Report::new();
        let regions = RegionSet::from(table).normalize("chr11", &mut report).unwrap();
        assert_eq!(regions, vec![Region { start: 10, end: 20 }]);
        assert_eq!(report.issues().len(), 1);
    }

    #[test]
    fn test_missing_column() {
        let table = RegionTable::new(strings(&["from", "to"]), vec![strings(&["1", "2"])]);
        let result = table.normalize("chr1", &mut Report::new());
        assert!(matches!(result, Err(MethPlotError::MissingRegionColumn("start"))));

        let table = RegionTable::new(strings(&["start", "stop"]), vec![strings(&["1", "2"])]);
        let result = table.normalize("chr1", &mut Report::new());
        assert!(matches!(result, Err(MethPlotError::MissingRegionColumn("end"))));
    }

    #[test]
    fn test_invalid_value() {
        let table = RegionTable::new(strings(&["start", "end"]), vec![strings(&["1e3", "2000"])]);
        let result = table.normalize("chr1", &mut Report::new());
        assert!(matches!(
            result,
            Err(MethPlotError::InvalidRegionValue("start", ref v)) if v == "1e3"
        ));
    }

    #[test]
    fn test_inverted_region() {
        let table = RegionTable::from_coordinates(&[(20, 10)]);
        let result = table.normalize("chr1", &mut Report::new());
        assert!(matches!(result, Err(MethPlotError::InvalidGenomicRange(20, 10))));
    }

    #[test]
    fn test_ragged_ranges() {
        let result = GenomicRanges::new(strings(&["chr1"]), vec![1, 2], vec![3, 4]);
        assert!(matches!(result, Err(MethPlotError::RaggedRanges(1, 2, 2))));
    }

    #[test]
    fn test_bed_zero_length_record() {
        let bed = temp_file("chr11\t27015500\t27015700\nchr11\t27015800\t27015800\n", ".bed");
        let regions = RegionSet::from_path(bed.path())
            .unwrap()
            .normalize("chr11", &mut Report::new())
            .unwrap();
        assert_eq!(
            regions,
            vec![
                Region { start: 27015501, end: 27015700 },
                Region { start: 27015801, end: 27015801 },
            ]
        );
    }

    #[test]
    fn test_bed_start_overflow() {
        let bed = temp_file(&format!("chr11\t{}\t{}\n", Position::MAX, Position::MAX), ".bed");
        let result = GenomicRanges::from_bed(bed.path());
        assert!(matches!(result, Err(MethPlotError::InvalidGenomicRange(_, _))));
    }

    #[test]
    fn test_from_path_detects_shape() {
        let table = RegionSet::from_path("tests_data/dmrs.tsv").unwrap();
        let bed = RegionSet::from_path("tests_data/dmrs.bed").unwrap();
        assert!(matches!(table, RegionSet::Table(_)));
        assert!(matches!(bed, RegionSet::Ranges(_)));

        let mut report = Report::new();
        assert_eq!(
            table.normalize("chr11", &mut report).unwrap(),
            bed.normalize("chr11", &mut report).unwrap()
        );
    }
}
