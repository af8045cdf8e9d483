//! # methtracks
//!
//! Multi-track plots of DNA methylation around differentially methylated
//! regions (DMRs): a chromosome ideogram, a genomic axis, gene models, optional
//! enhancers, the DMRs themselves, a per-sample methylation heatmap, and the
//! average methylation of each sample group.
//!
//! ```no_run
//! use methtracks::prelude::*;
//! use methtracks::annotation::FileAnnotationSource;
//! use methtracks::genome::Genome;
//! use methtracks::render::PlottersRenderer;
//!
//! let mut report = Report::new();
//! let sites = MethylationSites::from_path("sites.tsv", "chr11", &mut report)?;
//! let dmrs = RegionSet::from_path("dmrs.bed")?;
//! let source = FileAnnotationSource::new()
//!     .with_gene_models(Genome::Hg19, "hg19.gtf.gz")
//!     .with_symbols(Genome::Hg19.species(), "human_symbols.tsv");
//! let renderer = PlottersRenderer::new("bdnf.svg")?;
//!
//! let issues = render_methylation_plot(
//!     "hg19", "chr11", 27015473, 27015991, &sites, &dmrs, None, None, &source, &renderer,
//! )?;
//! issues.log_issues();
//! # Ok::<(), MethPlotError>(())
//! ```

pub mod annotation;
pub mod commands;
pub mod error;
pub mod genome;
pub mod io;
pub mod plot;
pub mod ranges;
pub mod regions;
pub mod render;
pub mod reporting;
pub mod sites;
pub mod style;
pub mod test_utilities;
pub mod traits;
pub mod tracks;

pub type Position = u32;

pub mod prelude {
    pub use crate::error::MethPlotError;
    pub use crate::genome::{GenomicInterval, Genome, Species};
    pub use crate::plot::{render_methylation_plot, MethylationPlot, PlotRequest};
    pub use crate::regions::{GenomicRanges, RegionSet, RegionTable};
    pub use crate::reporting::Report;
    pub use crate::sites::{GroupAssignment, MethylationSites};
    pub use crate::style::PlotStyle;
    pub use crate::traits::{GenericRange, TrackRenderer};
}
