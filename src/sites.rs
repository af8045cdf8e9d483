//! Per-CpG methylation values and sample grouping.

use std::path::PathBuf;

use indexmap::IndexMap;
use log::debug;

use crate::{
    error::MethPlotError,
    io::{build_tsv_reader, tsv::parse_optional_float},
    reporting::Report,
    traits::GenericRange,
    Position,
};

/// Column names recognized as the CpG position in a sites table.
pub const POSITION_COLUMNS: [&str; 3] = ["pos", "position", "start"];

/// Column names recognized as the sequence name in a sites table.
pub const SEQNAME_COLUMNS: [&str; 4] = ["chr", "chrom", "chromosome", "seqnames"];

/// One CpG site: its position and one (possibly missing) value per sample.
#[derive(Clone, Debug, PartialEq)]
pub struct CpgSite {
    pub position: Position,
    pub values: Vec<Option<f64>>,
}

/// An ordered collection of CpG sites sharing one list of samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MethylationSites {
    samples: Vec<String>,
    sites: Vec<CpgSite>,
}

impl MethylationSites {
    pub fn new(samples: Vec<String>) -> Self {
        Self {
            samples,
            sites: Vec::new(),
        }
    }

    /// Add a site; there must be exactly one value per sample.
    pub fn push_site(
        &mut self,
        position: Position,
        values: Vec<Option<f64>>,
    ) -> Result<(), MethPlotError> {
        if values.len() != self.samples.len() {
            return Err(MethPlotError::InvalidSitesTable(format!(
                "site at {} has {} values for {} samples",
                position,
                values.len(),
                self.samples.len()
            )));
        }
        if let Some(bad) = values.iter().flatten().find(|v| !v.is_finite()) {
            return Err(MethPlotError::InvalidSitesTable(format!(
                "site at {} has non-finite value {}",
                position, bad
            )));
        }
        self.sites.push(CpgSite { position, values });
        Ok(())
    }

    /// Read a tab-separated sites table with a header row.
    ///
    /// One column holds the position (`pos`, `position` or `start`), an
    /// optional column holds the sequence name, and every other column is a
    /// sample. Rows on sequences other than `chromosome` are dropped.
    pub fn from_path(
        filepath: impl Into<PathBuf>,
        chromosome: &str,
        report: &mut Report,
    ) -> Result<Self, MethPlotError> {
        let mut reader = build_tsv_reader(filepath, true)?;
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
        let position_col = lowered
            .iter()
            .position(|h| POSITION_COLUMNS.contains(&h.as_str()))
            .ok_or_else(|| {
                MethPlotError::InvalidSitesTable("no 'pos' or 'position' column".to_string())
            })?;
        let seqname_col = lowered
            .iter()
            .position(|h| SEQNAME_COLUMNS.contains(&h.as_str()));

        let sample_cols: Vec<usize> = (0..headers.len())
            .filter(|&i| i != position_col && Some(i) != seqname_col)
            .collect();
        if sample_cols.is_empty() {
            return Err(MethPlotError::InvalidSitesTable(
                "no sample columns".to_string(),
            ));
        }
        let samples = sample_cols.iter().map(|&i| headers[i].clone()).collect();
        let mut sites = Self::new(samples);

        let mut dropped = 0;
        for record in reader.records() {
            let record = record?;
            if record.len() != headers.len() {
                return Err(MethPlotError::InvalidSitesTable(format!(
                    "row has {} columns but the header has {}: '{}'",
                    record.len(),
                    headers.len(),
                    record.iter().collect::<Vec<_>>().join("\t")
                )));
            }
            if let Some(col) = seqname_col {
                if record.get(col) != Some(chromosome) {
                    dropped += 1;
                    continue;
                }
            }
            let position: Position = record
                .get(position_col)
                .unwrap_or("")
                .parse()
                .map_err(|_| {
                    MethPlotError::InvalidSitesTable(format!(
                        "invalid position '{}'",
                        record.get(position_col).unwrap_or("")
                    ))
                })?;
            let values = sample_cols
                .iter()
                .map(|&i| parse_optional_float(record.get(i).unwrap_or("")))
                .collect::<Result<Vec<_>, _>>()?;
            sites.push_site(position, values)?;
        }
        if dropped > 0 {
            report.add_issue(format!(
                "{} CpG site(s) not on {} were dropped",
                dropped, chromosome
            ));
        }
        debug!(
            "read {} CpG sites across {} samples",
            sites.len(),
            sites.num_samples()
        );
        Ok(sites)
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn sites(&self) -> &[CpgSite] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// The smallest and largest observed value, or `None` if every value is missing.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.sites
            .iter()
            .flat_map(|site| site.values.iter().flatten())
            .fold(None, |range, &v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }

    /// A copy keeping only the sites inside `range`.
    pub fn within<R: GenericRange>(&self, range: &R) -> Self {
        Self {
            samples: self.samples.clone(),
            sites: self
                .sites
                .iter()
                .filter(|site| range.contains(site.position))
                .cloned()
                .collect(),
        }
    }
}

/// An explicit sample → group label mapping.
///
/// Groups are kept keyed by sample id rather than by column position, so a
/// reordered sites table cannot silently pair samples with the wrong labels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupAssignment {
    labels: IndexMap<String, String>,
}

/// One display group: its label and the indices of its samples.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleGroup {
    pub label: String,
    pub sample_indices: Vec<usize>,
}

impl GroupAssignment {
    /// Pair labels with samples positionally. The lengths must match.
    pub fn from_labels(samples: &[String], labels: Vec<String>) -> Result<Self, MethPlotError> {
        if samples.len() != labels.len() {
            return Err(MethPlotError::GroupLengthMismatch(labels.len(), samples.len()));
        }
        Ok(Self {
            labels: samples.iter().cloned().zip(labels).collect(),
        })
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            labels: pairs.into_iter().collect(),
        }
    }

    /// Read a header-less, two-column `sample<TAB>group` file. A first row of
    /// literally `sample group` is skipped.
    pub fn from_path(filepath: impl Into<PathBuf>) -> Result<Self, MethPlotError> {
        let reader = build_tsv_reader(filepath, false)?;
        let mut labels = IndexMap::new();
        for (i, record) in reader.into_records().enumerate() {
            let record = record?;
            let (Some(sample), Some(group)) = (record.get(0), record.get(1)) else {
                return Err(MethPlotError::InvalidGroupFile(
                    record.iter().collect::<Vec<_>>().join("\t"),
                ));
            };
            if i == 0 && sample.eq_ignore_ascii_case("sample") && group.eq_ignore_ascii_case("group")
            {
                continue;
            }
            labels.insert(sample.to_string(), group.to_string());
        }
        Ok(Self { labels })
    }

    pub fn label(&self, sample: &str) -> Option<&str> {
        self.labels.get(sample).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Resolve the groups for `samples`, in order of first appearance.
    ///
    /// Every sample must have a label, and every labelled sample must be one
    /// of `samples`.
    pub fn groups_for(&self, samples: &[String]) -> Result<Vec<SampleGroup>, MethPlotError> {
        if let Some(unknown) = self.labels.keys().find(|s| !samples.contains(*s)) {
            return Err(MethPlotError::UnknownSample(unknown.clone()));
        }
        let mut groups: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for (index, sample) in samples.iter().enumerate() {
            let label = self
                .label(sample)
                .ok_or_else(|| MethPlotError::UnassignedSample(sample.clone()))?;
            groups.entry(label).or_default().push(index);
        }
        Ok(groups
            .into_iter()
            .map(|(label, sample_indices)| SampleGroup {
                label: label.to_string(),
                sample_indices,
            })
            .collect())
    }
}

/// One group per sample, used when no [`GroupAssignment`] is supplied.
pub fn individual_groups(samples: &[String]) -> Vec<SampleGroup> {
    samples
        .iter()
        .enumerate()
        .map(|(i, sample)| SampleGroup {
            label: sample.clone(),
            sample_indices: vec![i],
        })
        .collect()
}
