//! Gene models, gene symbol tables, and where they come from.
//!
//! Plotting never reads annotation files directly; it asks an
//! [`AnnotationSource`] for the gene models of a [`Genome`] and the symbol
//! table of a [`Species`]. [`FileAnnotationSource`] loads GTF files and
//! two-column symbol tables, caching each loaded file for the life of the
//! process. [`InMemoryAnnotation`] holds pre-built handles.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Arc, Mutex},
};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use log::{debug, info};

use crate::{
    error::MethPlotError,
    genome::{Genome, GenomicInterval, Species},
    io::build_tsv_reader,
    ranges::{coitrees::COITrees, Region},
    reporting::Report,
    tracks::{GeneModelTrack, LabelledGene},
    traits::GenericRange,
    Position,
};

pub mod gtf;

use gtf::{collapse_exons, GtfExonIterator};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
    Unknown,
}

impl FromStr for Strand {
    type Err = MethPlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." => Ok(Strand::Unknown),
            other => Err(MethPlotError::InvalidGtfLine(format!(
                "invalid strand '{}': must be either '+', '-', or '.'",
                other
            ))),
        }
    }
}

/// A gene collapsed to a single model: its span and merged exons.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneModel {
    /// The identifier symbols are looked up by.
    pub gene_id: String,
    pub chromosome: String,
    pub strand: Strand,
    pub start: Position,
    pub end: Position,
    pub exons: Vec<Region>,
}

impl GenericRange for GeneModel {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

/// All gene models of one genome, indexed per chromosome for overlap queries.
#[derive(Debug)]
pub struct GeneModels {
    chromosomes: IndexMap<String, (Vec<GeneModel>, COITrees)>,
}

impl GeneModels {
    pub fn from_models(models: Vec<GeneModel>) -> Result<Self, MethPlotError> {
        let mut grouped: IndexMap<String, Vec<GeneModel>> = IndexMap::new();
        for model in models {
            grouped.entry(model.chromosome.clone()).or_default().push(model);
        }
        let mut chromosomes = IndexMap::new();
        for (seqname, mut models) in grouped {
            models.sort_by_key(|m| (m.start, m.end));
            let index = COITrees::from_ranges(&models)?;
            chromosomes.insert(seqname, (models, index));
        }
        Ok(Self { chromosomes })
    }

    /// Load and collapse the exons of a GTF file.
    pub fn from_gtf(filepath: impl Into<PathBuf>) -> Result<Self, MethPlotError> {
        let models = collapse_exons(GtfExonIterator::new(filepath)?)?;
        Self::from_models(models)
    }

    /// Total number of gene models.
    pub fn len(&self) -> usize {
        self.chromosomes.values().map(|(models, _)| models.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gene models on `seqname` overlapping `[start, end]`, ordered by start.
    pub fn overlapping(
        &self,
        seqname: &str,
        start: Position,
        end: Position,
    ) -> Result<Vec<&GeneModel>, MethPlotError> {
        let Some((models, index)) = self.chromosomes.get(seqname) else {
            return Ok(Vec::new());
        };
        Ok(index
            .query_indices(start, end)?
            .into_iter()
            .map(|i| &models[i])
            .collect())
    }
}

/// Gene id → gene symbol for one species.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolTable {
    pub species: Species,
    symbols: HashMap<String, String>,
}

impl SymbolTable {
    pub fn from_pairs(
        species: Species,
        pairs: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            species,
            symbols: pairs.into_iter().collect(),
        }
    }

    /// Read a header-less `gene_id<TAB>symbol` file.
    pub fn from_path(species: Species, filepath: impl Into<PathBuf>) -> Result<Self, MethPlotError> {
        let reader = build_tsv_reader(filepath, false)?;
        let mut symbols = HashMap::new();
        for record in reader.into_records() {
            let record = record?;
            if let (Some(id), Some(symbol)) = (record.get(0), record.get(1)) {
                symbols.insert(id.to_string(), symbol.to_string());
            }
        }
        Ok(Self { species, symbols })
    }

    pub fn get(&self, gene_id: &str) -> Option<&str> {
        self.symbols.get(gene_id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Provides the annotation handles the gene-model track is built from.
pub trait AnnotationSource {
    fn gene_models(&self, genome: Genome) -> Result<Arc<GeneModels>, MethPlotError>;
    fn symbols(&self, species: Species) -> Result<Arc<SymbolTable>, MethPlotError>;
}

lazy_static! {
    static ref GENE_MODEL_CACHE: Mutex<HashMap<PathBuf, Arc<GeneModels>>> =
        Mutex::new(HashMap::new());
    static ref SYMBOL_CACHE: Mutex<HashMap<(Species, PathBuf), Arc<SymbolTable>>> =
        Mutex::new(HashMap::new());
}

fn lock_poisoned<T>(_: T) -> MethPlotError {
    MethPlotError::IOError(std::io::Error::new(
        std::io::ErrorKind::Other,
        "annotation cache lock poisoned",
    ))
}

fn cached_gene_models(path: &Path) -> Result<Arc<GeneModels>, MethPlotError> {
    let mut cache = GENE_MODEL_CACHE.lock().map_err(lock_poisoned)?;
    if let Some(models) = cache.get(path) {
        debug!("using cached gene models from {}", path.display());
        return Ok(Arc::clone(models));
    }
    info!("loading gene models from {}", path.display());
    let models = Arc::new(GeneModels::from_gtf(path)?);
    cache.insert(path.to_path_buf(), Arc::clone(&models));
    Ok(models)
}

fn cached_symbols(species: Species, path: &Path) -> Result<Arc<SymbolTable>, MethPlotError> {
    let mut cache = SYMBOL_CACHE.lock().map_err(lock_poisoned)?;
    let key = (species, path.to_path_buf());
    if let Some(symbols) = cache.get(&key) {
        return Ok(Arc::clone(symbols));
    }
    info!("loading {} gene symbols from {}", species, path.display());
    let symbols = Arc::new(SymbolTable::from_path(species, path)?);
    cache.insert(key, Arc::clone(&symbols));
    Ok(symbols)
}

/// An [`AnnotationSource`] backed by GTF and symbol files, one per genome
/// and species. Each file is read once per process.
#[derive(Clone, Debug, Default)]
pub struct FileAnnotationSource {
    gene_models: IndexMap<Genome, PathBuf>,
    symbols: IndexMap<Species, PathBuf>,
}

impl FileAnnotationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gene_models(mut self, genome: Genome, filepath: impl Into<PathBuf>) -> Self {
        self.gene_models.insert(genome, filepath.into());
        self
    }

    pub fn with_symbols(mut self, species: Species, filepath: impl Into<PathBuf>) -> Self {
        self.symbols.insert(species, filepath.into());
        self
    }
}

impl AnnotationSource for FileAnnotationSource {
    fn gene_models(&self, genome: Genome) -> Result<Arc<GeneModels>, MethPlotError> {
        let path = self
            .gene_models
            .get(&genome)
            .ok_or_else(|| MethPlotError::MissingAnnotation("gene model", genome.to_string()))?;
        cached_gene_models(path)
    }

    fn symbols(&self, species: Species) -> Result<Arc<SymbolTable>, MethPlotError> {
        let path = self
            .symbols
            .get(&species)
            .ok_or_else(|| MethPlotError::MissingAnnotation("symbol", species.to_string()))?;
        cached_symbols(species, path)
    }
}

/// An [`AnnotationSource`] over handles that are already in memory.
#[derive(Clone, Default)]
pub struct InMemoryAnnotation {
    gene_models: IndexMap<Genome, Arc<GeneModels>>,
    symbols: IndexMap<Species, Arc<SymbolTable>>,
}

impl InMemoryAnnotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gene_models(mut self, genome: Genome, models: GeneModels) -> Self {
        self.gene_models.insert(genome, Arc::new(models));
        self
    }

    pub fn with_symbols(mut self, symbols: SymbolTable) -> Self {
        self.symbols.insert(symbols.species, Arc::new(symbols));
        self
    }
}

impl AnnotationSource for InMemoryAnnotation {
    fn gene_models(&self, genome: Genome) -> Result<Arc<GeneModels>, MethPlotError> {
        self.gene_models
            .get(&genome)
            .cloned()
            .ok_or_else(|| MethPlotError::MissingAnnotation("gene model", genome.to_string()))
    }

    fn symbols(&self, species: Species) -> Result<Arc<SymbolTable>, MethPlotError> {
        self.symbols
            .get(&species)
            .cloned()
            .ok_or_else(|| MethPlotError::MissingAnnotation("symbol", species.to_string()))
    }
}

/// Resolve a genome name to the gene-model track for `interval`.
///
/// The genome name is checked first, so an unsupported genome fails without
/// touching `source`. Genes are labelled with their symbol from the genome's
/// species table; genes without one keep their id and are noted in `report`.
pub fn resolve_gene_track(
    genome: &str,
    interval: &GenomicInterval,
    source: &dyn AnnotationSource,
    report: &mut Report,
) -> Result<GeneModelTrack, MethPlotError> {
    let genome: Genome = genome.parse()?;
    let species = genome.species();
    let models = source.gene_models(genome)?;
    let symbols = source.symbols(species)?;

    let mut genes = Vec::new();
    let mut unlabelled = 0;
    for model in models.overlapping(&interval.chromosome, interval.start, interval.end)? {
        let symbol = match symbols.get(&model.gene_id) {
            Some(symbol) => symbol.to_string(),
            None => {
                unlabelled += 1;
                model.gene_id.clone()
            }
        };
        genes.push(LabelledGene {
            symbol,
            model: model.clone(),
        });
    }
    if unlabelled > 0 {
        report.add_issue(format!(
            "{} gene(s) have no {} symbol and are labelled by id",
            unlabelled, species
        ));
    }
    debug!(
        "{} gene model(s) from {} overlap {}:{}-{}",
        genes.len(),
        genome,
        interval.chromosome,
        interval.start,
        interval.end
    );
    Ok(GeneModelTrack {
        genome,
        species,
        genes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::{test_annotation, CountingAnnotation};

    #[test]
    fn test_strand_from_str() {
        assert_eq!("+".parse::<Strand>().unwrap(), Strand::Forward);
        assert_eq!("-".parse::<Strand>().unwrap(), Strand::Reverse);
        assert!("x".parse::<Strand>().is_err());
    }

    #[test]
    fn test_overlapping() {
        let models = GeneModels::from_gtf("tests_data/genes_hg19.gtf").unwrap();
        assert_eq!(models.len(), 3);
        let hits = models.overlapping("chr11", 27015473, 27015991).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].gene_id, "627");
        assert!(models.overlapping("chr2", 1, 100).unwrap().is_empty());
    }

    #[test]
    fn test_resolver_selects_species() {
        let source = test_annotation();
        let interval = GenomicInterval::new("chr11", 27015473, 27015991).unwrap();
        for (name, species) in [
            ("hg19", Species::Human),
            ("hg38", Species::Human),
            ("mm39", Species::Mouse),
        ] {
            let track = resolve_gene_track(name, &interval, &source, &mut Report::new()).unwrap();
            assert_eq!(track.species, species);
            assert_eq!(track.genome.name(), name);
        }
    }

    #[test]
    fn test_resolver_labels_with_symbols() {
        let source = test_annotation();
        let interval = GenomicInterval::new("chr11", 27015473, 27015991).unwrap();
        let mut report = Report::new();
        let human = resolve_gene_track("hg19", &interval, &source, &mut report).unwrap();
        assert_eq!(human.genes[0].symbol, "BDNF");
        let mouse = resolve_gene_track("mm39", &interval, &source, &mut report).unwrap();
        assert_eq!(mouse.genes[0].symbol, "Bdnf");
        assert!(report.is_empty());
    }

    #[test]
    fn test_resolver_falls_back_to_gene_id() {
        let source = test_annotation();
        let interval = GenomicInterval::new("chr11", 27100000, 27100500).unwrap();
        let mut report = Report::new();
        let track = resolve_gene_track("hg19", &interval, &source, &mut report).unwrap();
        assert_eq!(track.genes.len(), 1);
        assert_eq!(track.genes[0].symbol, "999999");
        assert_eq!(report.issues().len(), 1);
    }

    #[test]
    fn test_unsupported_genome_never_reaches_source() {
        let source = CountingAnnotation::new(test_annotation());
        let interval = GenomicInterval::new("chr11", 1, 100).unwrap();
        let result = resolve_gene_track("hg18", &interval, &source, &mut Report::new());
        assert!(matches!(result, Err(MethPlotError::UnsupportedGenome(g)) if g == "hg18"));
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn test_file_source_missing_configuration() {
        let source = FileAnnotationSource::new()
            .with_gene_models(Genome::Hg19, "tests_data/genes_hg19.gtf");
        assert!(source.gene_models(Genome::Hg19).is_ok());
        assert!(matches!(
            source.gene_models(Genome::Mm39),
            Err(MethPlotError::MissingAnnotation("gene model", g)) if g == "mm39"
        ));
        assert!(matches!(
            source.symbols(Species::Human),
            Err(MethPlotError::MissingAnnotation("symbol", _))
        ));
    }

    #[test]
    fn test_file_source_caches() {
        let source = FileAnnotationSource::new()
            .with_symbols(Species::Human, "tests_data/symbols_human.tsv");
        let first = source.symbols(Species::Human).unwrap();
        let second = source.symbols(Species::Human).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.get("627"), Some("BDNF"));
    }
}
