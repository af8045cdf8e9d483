//! Test cases and test utility functions.
//!

use std::{
    cell::{Cell, RefCell},
    io::Write,
    sync::Arc,
};

use rand::{thread_rng, Rng};
use tempfile::NamedTempFile;

use crate::{
    annotation::{AnnotationSource, GeneModel, GeneModels, InMemoryAnnotation, Strand, SymbolTable},
    error::MethPlotError,
    genome::{Genome, GenomicInterval, Species},
    plot::{MethylationPlot, PlotRequest},
    ranges::Region,
    regions::{RegionSet, RegionTable},
    reporting::Report,
    sites::{GroupAssignment, MethylationSites},
    traits::TrackRenderer,
    Position,
};

// The BDNF promoter interval used throughout the tests.
pub const EXAMPLE_CHROM: &str = "chr11";
pub const EXAMPLE_START: Position = 27015473;
pub const EXAMPLE_END: Position = 27015991;

// Stochastic test sites defaults
pub const MAX_SITE_GAP: Position = 50;
pub const MISSING_RATE: f64 = 0.05;

/// The example interval, `chr11:27015473-27015991`.
pub fn example_interval() -> GenomicInterval {
    GenomicInterval {
        chromosome: EXAMPLE_CHROM.to_string(),
        start: EXAMPLE_START,
        end: EXAMPLE_END,
    }
}

/// Five CpG sites by six samples from `tests_data/sites.tsv`.
pub fn example_sites() -> MethylationSites {
    MethylationSites::from_path("tests_data/sites.tsv", EXAMPLE_CHROM, &mut Report::new())
        .expect("could not read tests_data/sites.tsv")
}

/// The three-group assignment from `tests_data/groups.tsv`.
pub fn example_groups() -> GroupAssignment {
    GroupAssignment::from_path("tests_data/groups.tsv").expect("could not read tests_data/groups.tsv")
}

/// The single example DMR, as a region table.
pub fn example_dmrs() -> RegionSet {
    RegionTable::from_coordinates(&[(27015500, 27015700)]).into()
}

/// The request for the example plot: hg19, grouped, no enhancers.
pub fn example_request() -> PlotRequest {
    let sites = example_sites();
    let groups = example_groups();
    let dmrs = example_dmrs();
    let (request, _) = MethylationPlot::new("hg19", example_interval(), &sites, &dmrs)
        .with_groups(&groups)
        .build_request(&test_annotation())
        .expect("could not build the example request");
    request
}

/// Build random methylation sites starting at the example interval.
pub fn random_sites(num_samples: usize, num_sites: usize) -> MethylationSites {
    let mut rng = thread_rng();
    let samples = (1..=num_samples).map(|i| format!("sample_{}", i)).collect();
    let mut sites = MethylationSites::new(samples);
    let mut position = EXAMPLE_START;
    for _ in 0..num_sites {
        let values = (0..num_samples)
            .map(|_| {
                if rng.gen_bool(MISSING_RATE) {
                    None
                } else {
                    Some(rng.gen_range(0.0..1.0))
                }
            })
            .collect();
        sites.push_site(position, values).unwrap();
        position += rng.gen_range(1..=MAX_SITE_GAP);
    }
    sites
}

/// Random group labels for `samples`, drawn from `num_groups` groups.
pub fn random_groups(samples: &[String], num_groups: usize) -> GroupAssignment {
    let mut rng = thread_rng();
    let labels = samples
        .iter()
        .map(|_| format!("group_{}", rng.gen_range(1..=num_groups)))
        .collect();
    GroupAssignment::from_labels(samples, labels).unwrap()
}

fn gene(gene_id: &str, strand: Strand, exons: &[(Position, Position)]) -> GeneModel {
    let exons: Vec<Region> = exons
        .iter()
        .map(|&(start, end)| Region { start, end })
        .collect();
    GeneModel {
        gene_id: gene_id.to_string(),
        chromosome: EXAMPLE_CHROM.to_string(),
        strand,
        start: exons.first().map_or(0, |e| e.start),
        end: exons.last().map_or(0, |e| e.end),
        exons,
    }
}

fn human_models() -> GeneModels {
    GeneModels::from_models(vec![
        gene(
            "627",
            Strand::Reverse,
            &[(27014000, 27014500), (27015400, 27015800), (27016500, 27017000)],
        ),
        gene(
            "999999",
            Strand::Forward,
            &[(27099000, 27099500), (27100400, 27101000)],
        ),
    ])
    .unwrap()
}

/// In-memory annotation for all three genomes. Gene `627` (BDNF, mouse
/// `12064`) overlaps the example interval; gene `999999` has no symbol.
pub fn test_annotation() -> InMemoryAnnotation {
    let mouse_models = GeneModels::from_models(vec![gene(
        "12064",
        Strand::Reverse,
        &[(27014800, 27015300), (27015600, 27016200)],
    )])
    .unwrap();
    InMemoryAnnotation::new()
        .with_gene_models(Genome::Hg19, human_models())
        .with_gene_models(Genome::Hg38, human_models())
        .with_gene_models(Genome::Mm39, mouse_models)
        .with_symbols(SymbolTable::from_pairs(
            Species::Human,
            vec![("627".to_string(), "BDNF".to_string())],
        ))
        .with_symbols(SymbolTable::from_pairs(
            Species::Mouse,
            vec![("12064".to_string(), "Bdnf".to_string())],
        ))
}

/// An [`AnnotationSource`] that counts how often it is asked for anything.
pub struct CountingAnnotation<S> {
    inner: S,
    calls: Cell<usize>,
}

impl<S: AnnotationSource> CountingAnnotation<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<S: AnnotationSource> AnnotationSource for CountingAnnotation<S> {
    fn gene_models(&self, genome: Genome) -> Result<Arc<GeneModels>, MethPlotError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.gene_models(genome)
    }

    fn symbols(&self, species: Species) -> Result<Arc<SymbolTable>, MethPlotError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.symbols(species)
    }
}

/// A [`TrackRenderer`] that keeps every request it is given.
#[derive(Default)]
pub struct RecordingRenderer {
    requests: RefCell<Vec<PlotRequest>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<PlotRequest> {
        self.requests.borrow().clone()
    }
}

impl TrackRenderer for RecordingRenderer {
    fn render(&self, request: &PlotRequest) -> Result<(), MethPlotError> {
        self.requests.borrow_mut().push(request.clone());
        Ok(())
    }
}

/// A [`TrackRenderer`] that always fails.
pub struct FailingRenderer;

impl TrackRenderer for FailingRenderer {
    fn render(&self, _request: &PlotRequest) -> Result<(), MethPlotError> {
        Err(MethPlotError::Render("device unavailable".to_string()))
    }
}

/// Write `contents` to a temporary file with the given suffix, e.g. `.tsv`.
pub fn temp_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("could not create a temporary file");
    file.write_all(contents.as_bytes())
        .expect("could not write the temporary file");
    file
}
