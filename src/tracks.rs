//! The plot's tracks, and their assembly into a fixed, ordered [`TrackList`].
//!
//! The stack is always, top to bottom:
//!
//! | track          | weight | present            |
//! |----------------|--------|--------------------|
//! | ideogram       | 2      | always             |
//! | genomic axis   | 2      | always             |
//! | gene models    | 5      | always             |
//! | enhancers      | 2      | if enhancers given |
//! | DMRs           | 2      | always             |
//! | heatmap        | 10     | always             |
//! | group averages | 5      | always             |
//!
//! Weights are relative heights, and each track carries its own.

use crate::{
    annotation::GeneModel,
    genome::{Genome, Species},
    ranges::Region,
    render::color::{ColorGradient, Rgb},
    sites::{MethylationSites, SampleGroup},
    Position,
};

pub const IDEOGRAM_WEIGHT: u32 = 2;
pub const AXIS_WEIGHT: u32 = 2;
pub const GENE_MODEL_WEIGHT: u32 = 5;
pub const ENHANCER_WEIGHT: u32 = 2;
pub const DMR_WEIGHT: u32 = 2;
pub const HEATMAP_WEIGHT: u32 = 10;
pub const LINE_PLOT_WEIGHT: u32 = 5;

/// Chromosome overview, with the plotted interval highlighted.
#[derive(Clone, Debug, PartialEq)]
pub struct IdeogramTrack {
    pub genome: Genome,
    pub chromosome: String,
    pub chrom_length: Position,
    pub highlight: Region,
}

/// Coordinate ruler.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisTrack {
    pub chromosome: String,
}

/// A gene model with the symbol it is drawn with.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelledGene {
    pub symbol: String,
    pub model: GeneModel,
}

/// Gene models overlapping the interval, bound to a genome's annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneModelTrack {
    pub genome: Genome,
    pub species: Species,
    pub genes: Vec<LabelledGene>,
}

/// Plain interval blocks, used for both enhancers and DMRs.
#[derive(Clone, Debug, PartialEq)]
pub struct IntervalTrack {
    pub name: String,
    pub regions: Vec<Region>,
    pub color: Rgb,
}

/// One row per sample, one cell per CpG site.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapTrack {
    pub samples: Vec<String>,
    pub positions: Vec<Position>,
    /// Per site, one value per sample.
    pub values: Vec<Vec<Option<f64>>>,
    /// Observed value range the gradient is stretched over.
    pub value_range: Option<(f64, f64)>,
    pub gradient: ColorGradient,
    pub label_font_size: u32,
}

impl HeatmapTrack {
    pub fn from_sites(sites: &MethylationSites, gradient: ColorGradient, label_font_size: u32) -> Self {
        Self {
            samples: sites.samples().to_vec(),
            positions: sites.sites().iter().map(|s| s.position).collect(),
            values: sites.sites().iter().map(|s| s.values.clone()).collect(),
            value_range: sites.value_range(),
            gradient,
            label_font_size,
        }
    }

    /// The color of sample `sample`'s cell at site `site`; `None` if missing.
    pub fn cell_color(&self, site: usize, sample: usize) -> Option<Rgb> {
        let value = (*self.values.get(site)?.get(sample)?)?;
        let range = self.value_range?;
        Some(self.gradient.map(value, range))
    }
}

/// The mean methylation of one group along the interval.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupSeries {
    pub label: String,
    pub points: Vec<(Position, f64)>,
}

/// One averaged line per display group.
#[derive(Clone, Debug, PartialEq)]
pub struct LinePlotTrack {
    pub groups: Vec<GroupSeries>,
}

impl LinePlotTrack {
    /// Average each group's samples at every site. Missing values are left
    /// out of the mean; a site where a group has no values gets no point.
    pub fn from_groups(sites: &MethylationSites, groups: &[SampleGroup]) -> Self {
        let groups = groups
            .iter()
            .map(|group| {
                let points = sites
                    .sites()
                    .iter()
                    .filter_map(|site| {
                        let observed: Vec<f64> = group
                            .sample_indices
                            .iter()
                            .filter_map(|&i| site.values.get(i).copied().flatten())
                            .collect();
                        if observed.is_empty() {
                            return None;
                        }
                        let mean = observed.iter().sum::<f64>() / observed.len() as f64;
                        Some((site.position, mean))
                    })
                    .collect();
                GroupSeries {
                    label: group.label.clone(),
                    points,
                }
            })
            .collect();
        Self { groups }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Track {
    Ideogram(IdeogramTrack),
    Axis(AxisTrack),
    GeneModel(GeneModelTrack),
    Enhancers(IntervalTrack),
    Dmrs(IntervalTrack),
    Heatmap(HeatmapTrack),
    GroupLines(LinePlotTrack),
}

impl Track {
    /// The track's fixed relative height.
    pub fn weight(&self) -> u32 {
        match self {
            Track::Ideogram(_) => IDEOGRAM_WEIGHT,
            Track::Axis(_) => AXIS_WEIGHT,
            Track::GeneModel(_) => GENE_MODEL_WEIGHT,
            Track::Enhancers(_) => ENHANCER_WEIGHT,
            Track::Dmrs(_) => DMR_WEIGHT,
            Track::Heatmap(_) => HEATMAP_WEIGHT,
            Track::GroupLines(_) => LINE_PLOT_WEIGHT,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Track::Ideogram(_) => "ideogram",
            Track::Axis(_) => "axis",
            Track::GeneModel(_) => "genes",
            Track::Enhancers(track) | Track::Dmrs(track) => &track.name,
            Track::Heatmap(_) => "methylation",
            Track::GroupLines(_) => "group means",
        }
    }
}

/// The ordered stack of tracks handed to a renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackList {
    tracks: Vec<Track>,
}

impl TrackList {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Relative heights, one per track.
    pub fn weights(&self) -> Vec<u32> {
        self.tracks.iter().map(|t| t.weight()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.name()).collect()
    }
}

/// Everything the fixed track stack is built from.
pub struct TrackInputs<'a> {
    pub ideogram: IdeogramTrack,
    pub genes: GeneModelTrack,
    pub enhancers: Option<IntervalTrack>,
    pub dmrs: IntervalTrack,
    pub sites: &'a MethylationSites,
    pub groups: &'a [SampleGroup],
    pub gradient: ColorGradient,
    pub sample_font_size: u32,
}

/// Build the track stack in its fixed order. The enhancer track is included
/// only when enhancers were supplied.
pub fn assemble_tracks(inputs: TrackInputs<'_>) -> TrackList {
    let axis = AxisTrack {
        chromosome: inputs.ideogram.chromosome.clone(),
    };
    let mut tracks = vec![
        Track::Ideogram(inputs.ideogram),
        Track::Axis(axis),
        Track::GeneModel(inputs.genes),
    ];
    if let Some(enhancers) = inputs.enhancers {
        tracks.push(Track::Enhancers(enhancers));
    }
    tracks.push(Track::Dmrs(inputs.dmrs));
    tracks.push(Track::Heatmap(HeatmapTrack::from_sites(
        inputs.sites,
        inputs.gradient,
        inputs.sample_font_size,
    )));
    tracks.push(Track::GroupLines(LinePlotTrack::from_groups(
        inputs.sites,
        inputs.groups,
    )));
    TrackList { tracks }
}
