//! Supported reference genomes, their species, and chromosome sizes.
//!
//! A [`Genome`] is resolved by exact name match, and anything outside
//! `hg19`, `hg38` and `mm39` is rejected with
//! [`MethPlotError::UnsupportedGenome`] before any annotation is touched.

use std::{fmt, path::PathBuf, str::FromStr};

use genomap::GenomeMap;
use log::debug;

use crate::{error::MethPlotError, io::file::read_seqlens, traits::GenericRange, Position};

/// The reference genomes gene models can be drawn for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Genome {
    /// Human, GRCh37.
    Hg19,
    /// Human, GRCh38.
    Hg38,
    /// Mouse, GRCm39.
    Mm39,
}

/// The species a genome belongs to; gene symbols are looked up per species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    Human,
    Mouse,
}

impl Genome {
    pub const ALL: [Genome; 3] = [Genome::Hg19, Genome::Hg38, Genome::Mm39];

    pub fn name(&self) -> &'static str {
        match self {
            Genome::Hg19 => "hg19",
            Genome::Hg38 => "hg38",
            Genome::Mm39 => "mm39",
        }
    }

    /// The assembly the gene models are built on.
    pub fn assembly(&self) -> &'static str {
        match self {
            Genome::Hg19 => "GRCh37",
            Genome::Hg38 => "GRCh38",
            Genome::Mm39 => "GRCm39",
        }
    }

    pub fn species(&self) -> Species {
        match self {
            Genome::Hg19 | Genome::Hg38 => Species::Human,
            Genome::Mm39 => Species::Mouse,
        }
    }

    /// The built-in chromosome sizes of this genome's primary assembly.
    pub fn chrom_sizes(&self) -> Result<ChromSizes, MethPlotError> {
        let table = match self {
            Genome::Hg19 => HG19_SIZES,
            Genome::Hg38 => HG38_SIZES,
            Genome::Mm39 => MM39_SIZES,
        };
        ChromSizes::from_pairs(table.iter().copied())
    }
}

impl FromStr for Genome {
    type Err = MethPlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hg19" => Ok(Genome::Hg19),
            "hg38" => Ok(Genome::Hg38),
            "mm39" => Ok(Genome::Mm39),
            other => Err(MethPlotError::UnsupportedGenome(other.to_string())),
        }
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Species {
    pub fn name(&self) -> &'static str {
        match self {
            Species::Human => "human",
            Species::Mouse => "mouse",
        }
    }
}

impl FromStr for Species {
    type Err = MethPlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Species::Human),
            "mouse" => Ok(Species::Mouse),
            other => Err(MethPlotError::UnsupportedSpecies(other.to_string())),
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Sequence lengths keyed by sequence name, kept in file order.
#[derive(Clone, Debug)]
pub struct ChromSizes {
    sizes: GenomeMap<Position>,
}

impl ChromSizes {
    pub fn from_pairs<'a>(
        pairs: impl Iterator<Item = (&'a str, Position)>,
    ) -> Result<Self, MethPlotError> {
        let mut sizes = GenomeMap::new();
        for (seqname, length) in pairs {
            sizes.insert(seqname, length)?;
        }
        Ok(Self { sizes })
    }

    /// Read a tab-delimited genome file of sequence names and lengths.
    pub fn from_file(filepath: impl Into<PathBuf>) -> Result<Self, MethPlotError> {
        let seqlens = read_seqlens(filepath)?;
        Self::from_pairs(seqlens.iter().map(|(name, len)| (name.as_str(), *len)))
    }

    pub fn get(&self, seqname: &str) -> Option<Position> {
        self.sizes.get(seqname).copied()
    }

    pub fn seqnames(&self) -> Vec<String> {
        self.sizes.names()
    }

    pub fn len(&self) -> usize {
        self.seqnames().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A closed interval on one chromosome, the region a plot is requested for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenomicInterval {
    pub chromosome: String,
    pub start: Position,
    pub end: Position,
}

impl GenomicInterval {
    pub fn new(
        chromosome: impl Into<String>,
        start: Position,
        end: Position,
    ) -> Result<Self, MethPlotError> {
        if start > end {
            return Err(MethPlotError::InvalidGenomicRange(start, end));
        }
        Ok(Self {
            chromosome: chromosome.into(),
            start,
            end,
        })
    }

    /// Widen the interval by `fraction` of its span on both sides, clamped to
    /// `[1, length]` when the chromosome length is known.
    pub fn widen(&self, fraction: f64, length: Option<Position>) -> (Position, Position) {
        let span = (self.end - self.start) as f64;
        let margin = (span * fraction).round() as Position;
        let from = self.start.saturating_sub(margin).max(1);
        let mut to = self.end.saturating_add(margin);
        if let Some(length) = length {
            to = to.min(length);
        }
        debug!(
            "widened {}:{}-{} by {} bp to {}-{}",
            self.chromosome, self.start, self.end, margin, from, to
        );
        (from, to)
    }
}

impl GenericRange for GenomicInterval {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

const HG19_SIZES: &[(&str, Position)] = &[
    ("chr1", 249_250_621),
    ("chr2", 243_199_373),
    ("chr3", 198_022_430),
    ("chr4", 191_154_276),
    ("chr5", 180_915_260),
    ("chr6", 171_115_067),
    ("chr7", 159_138_663),
    ("chr8", 146_364_022),
    ("chr9", 141_213_431),
    ("chr10", 135_534_747),
    ("chr11", 135_006_516),
    ("chr12", 133_851_895),
    ("chr13", 115_169_878),
    ("chr14", 107_349_540),
    ("chr15", 102_531_392),
    ("chr16", 90_354_753),
    ("chr17", 81_195_210),
    ("chr18", 78_077_248),
    ("chr19", 59_128_983),
    ("chr20", 63_025_520),
    ("chr21", 48_129_895),
    ("chr22", 51_304_566),
    ("chrX", 155_270_560),
    ("chrY", 59_373_566),
    ("chrM", 16_571),
];

const HG38_SIZES: &[(&str, Position)] = &[
    ("chr1", 248_956_422),
    ("chr2", 242_193_529),
    ("chr3", 198_295_559),
    ("chr4", 190_214_555),
    ("chr5", 181_538_259),
    ("chr6", 170_805_979),
    ("chr7", 159_345_973),
    ("chr8", 145_138_636),
    ("chr9", 138_394_717),
    ("chr10", 133_797_422),
    ("chr11", 135_086_622),
    ("chr12", 133_275_309),
    ("chr13", 114_364_328),
    ("chr14", 107_043_718),
    ("chr15", 101_991_189),
    ("chr16", 90_338_345),
    ("chr17", 83_257_441),
    ("chr18", 80_373_285),
    ("chr19", 58_617_616),
    ("chr20", 64_444_167),
    ("chr21", 46_709_983),
    ("chr22", 50_818_468),
    ("chrX", 156_040_895),
    ("chrY", 57_227_415),
    ("chrM", 16_569),
];

const MM39_SIZES: &[(&str, Position)] = &[
    ("chr1", 195_154_279),
    ("chr2", 181_755_017),
    ("chr3", 159_745_316),
    ("chr4", 156_860_686),
    ("chr5", 151_758_149),
    ("chr6", 149_588_044),
    ("chr7", 144_995_196),
    ("chr8", 130_127_694),
    ("chr9", 124_359_700),
    ("chr10", 130_530_862),
    ("chr11", 121_973_369),
    ("chr12", 120_092_757),
    ("chr13", 120_883_175),
    ("chr14", 125_139_656),
    ("chr15", 104_073_951),
    ("chr16", 98_008_968),
    ("chr17", 95_294_699),
    ("chr18", 90_720_763),
    ("chr19", 61_420_004),
    ("chrX", 169_476_592),
    ("chrY", 91_455_967),
    ("chrM", 16_299),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genome_from_str() {
        assert_eq!("hg19".parse::<Genome>().unwrap(), Genome::Hg19);
        assert_eq!("hg38".parse::<Genome>().unwrap(), Genome::Hg38);
        assert_eq!("mm39".parse::<Genome>().unwrap(), Genome::Mm39);
        for bad in ["hg18", "HG19", "mm10", "", " hg19"] {
            assert!(matches!(
                bad.parse::<Genome>(),
                Err(MethPlotError::UnsupportedGenome(name)) if name == bad
            ));
        }
    }

    #[test]
    fn test_genome_species() {
        assert_eq!(Genome::Hg19.species(), Species::Human);
        assert_eq!(Genome::Hg38.species(), Species::Human);
        assert_eq!(Genome::Mm39.species(), Species::Mouse);
    }

    #[test]
    fn test_chrom_sizes() {
        let sizes = Genome::Hg19.chrom_sizes().unwrap();
        assert_eq!(sizes.get("chr11"), Some(135_006_516));
        assert_eq!(sizes.get("chr23"), None);
        assert_eq!(sizes.len(), 25);
        assert_eq!(Genome::Mm39.chrom_sizes().unwrap().len(), 22);
    }

    #[test]
    fn test_interval_widen() {
        let interval = GenomicInterval::new("chr11", 1000, 2000).unwrap();
        assert_eq!(interval.widen(0.1, None), (900, 2100));
        assert_eq!(interval.widen(0.1, Some(2050)), (900, 2050));

        let near_start = GenomicInterval::new("chr1", 10, 110).unwrap();
        assert_eq!(near_start.widen(0.1, None), (1, 120));
    }

    #[test]
    fn test_invalid_interval() {
        assert!(matches!(
            GenomicInterval::new("chr1", 10, 5),
            Err(MethPlotError::InvalidGenomicRange(10, 5))
        ));
    }
}
