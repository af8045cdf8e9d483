//! A lazy GTF parser yielding exon records, and collapsing them into gene models.

use std::{
    io::{BufRead, BufReader},
    path::PathBuf,
};

use indexmap::IndexMap;

use super::{GeneModel, Strand};
use crate::{error::MethPlotError, io::InputFile, ranges::Region, Position};

pub const PARSE_CAPACITY: usize = 512;

/// One `exon` line of a GTF file.
#[derive(Clone, Debug, PartialEq)]
pub struct GtfExon {
    pub seqname: String,
    pub start: Position,
    pub end: Position,
    pub strand: Strand,
    pub gene_id: String,
}

/// A lazy parser over the `exon` records of a GTF file. Other feature types
/// and `#` comment lines are skipped.
pub struct GtfExonIterator {
    reader: BufReader<Box<dyn std::io::Read>>,
    line_buffer: String,
}

impl std::fmt::Debug for GtfExonIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GtfExonIterator").finish_non_exhaustive()
    }
}

impl GtfExonIterator {
    pub fn new(filepath: impl Into<PathBuf>) -> Result<Self, MethPlotError> {
        let reader = InputFile::new(filepath).reader()?;
        let line_buffer = String::with_capacity(PARSE_CAPACITY);
        Ok(Self {
            reader,
            line_buffer,
        })
    }
}

impl Iterator for GtfExonIterator {
    type Item = Result<GtfExon, MethPlotError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buffer.clear();
            match self.reader.read_line(&mut self.line_buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    let line = self.line_buffer.trim_end();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    match parse_gtf_exon(line) {
                        Ok(Some(exon)) => return Some(Ok(exon)),
                        Ok(None) => continue,
                        Err(e) => return Some(Err(e)),
                    }
                }
                Err(e) => return Some(Err(MethPlotError::IOError(e))),
            }
        }
    }
}

/// Parse a GTF line, returning `None` for features other than `exon`.
pub fn parse_gtf_exon(line: &str) -> Result<Option<GtfExon>, MethPlotError> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() < 9 {
        return Err(MethPlotError::InvalidGtfLine(line.to_string()));
    }
    if columns[2] != "exon" {
        return Ok(None);
    }
    let start: Position = columns[3]
        .parse()
        .map_err(|_| MethPlotError::InvalidGtfLine(line.to_string()))?;
    let end: Position = columns[4]
        .parse()
        .map_err(|_| MethPlotError::InvalidGtfLine(line.to_string()))?;
    let strand = columns[6].parse()?;
    let gene_id = attribute(columns[8], "gene_id")
        .ok_or_else(|| MethPlotError::InvalidGtfLine(line.to_string()))?;
    Ok(Some(GtfExon {
        seqname: columns[0].to_string(),
        start,
        end,
        strand,
        gene_id: gene_id.to_string(),
    }))
}

/// Look up an attribute's value in a GTF attribute column, e.g.
/// `gene_id "ENSG00000176697"; transcript_id "ENST00000356737";`.
pub fn attribute<'a>(attributes: &'a str, key: &str) -> Option<&'a str> {
    attributes
        .split(';')
        .map(|field| field.trim())
        .filter_map(|field| field.split_once(' '))
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value.trim().trim_matches('"'))
}

/// Collapse exons into one model per gene: overlapping exons (from different
/// transcripts) are merged and the gene spans its outermost exons.
pub fn collapse_exons(
    exons: impl Iterator<Item = Result<GtfExon, MethPlotError>>,
) -> Result<Vec<GeneModel>, MethPlotError> {
    let mut genes: IndexMap<String, GeneModel> = IndexMap::new();
    for exon in exons {
        let exon = exon?;
        let region = Region::new(exon.start, exon.end)?;
        let model = genes
            .entry(exon.gene_id.clone())
            .or_insert_with(|| GeneModel {
                gene_id: exon.gene_id.clone(),
                chromosome: exon.seqname.clone(),
                strand: exon.strand,
                start: exon.start,
                end: exon.end,
                exons: Vec::new(),
            });
        model.start = model.start.min(region.start);
        model.end = model.end.max(region.end);
        model.exons.push(region);
    }

    let mut models: Vec<GeneModel> = genes.into_values().collect();
    for model in models.iter_mut() {
        model.exons = merge_regions(std::mem::take(&mut model.exons));
    }
    Ok(models)
}

/// Sort and merge overlapping or touching regions.
pub fn merge_regions(mut regions: Vec<Region>) -> Vec<Region> {
    regions.sort();
    let mut merged: Vec<Region> = Vec::with_capacity(regions.len());
    for region in regions {
        match merged.last_mut() {
            Some(last) if region.start <= last.end.saturating_add(1) => {
                last.end = last.end.max(region.end);
            }
            _ => merged.push(region),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "chr11\tHAVANA\texon\t27016000\t27016500\t.\t-\t.\tgene_id \"ENSG00000176697\"; transcript_id \"ENST00000356737\"; gene_name \"BDNF\";";

    #[test]
    fn test_attribute() {
        let attrs = "gene_id \"G1\"; transcript_id \"T1\"; gene_name \"ABC\";";
        assert_eq!(attribute(attrs, "gene_id"), Some("G1"));
        assert_eq!(attribute(attrs, "gene_name"), Some("ABC"));
        assert_eq!(attribute(attrs, "exon_number"), None);
    }

    #[test]
    fn test_parse_gtf_exon() {
        let exon = parse_gtf_exon(LINE).unwrap().unwrap();
        assert_eq!(exon.seqname, "chr11");
        assert_eq!(exon.start, 27016000);
        assert_eq!(exon.strand, Strand::Reverse);
        assert_eq!(exon.gene_id, "ENSG00000176697");

        let gene_line = LINE.replace("\texon\t", "\tgene\t");
        assert_eq!(parse_gtf_exon(&gene_line).unwrap(), None);
        assert!(parse_gtf_exon("chr11\tHAVANA\texon").is_err());
    }

    #[test]
    fn test_merge_regions() {
        let merged = merge_regions(vec![
            Region { start: 50, end: 60 },
            Region { start: 10, end: 20 },
            Region { start: 15, end: 30 },
            Region { start: 31, end: 35 },
        ]);
        assert_eq!(
            merged,
            vec![Region { start: 10, end: 35 }, Region { start: 50, end: 60 }]
        );
    }

    #[test]
    fn test_collapse_from_file() {
        let models = collapse_exons(GtfExonIterator::new("tests_data/genes_hg19.gtf").unwrap()).unwrap();
        assert_eq!(models.len(), 3);
        let bdnf = models.iter().find(|m| m.gene_id == "627").unwrap();
        assert_eq!(bdnf.chromosome, "chr11");
        assert_eq!(bdnf.strand, Strand::Reverse);
        assert_eq!(bdnf.exons.len(), 3);
    }
}
