use std::{io::Write, path::PathBuf};

use log::info;

use crate::{
    annotation::FileAnnotationSource,
    genome::{ChromSizes, Genome, GenomicInterval},
    io::OutputFile,
    plot::MethylationPlot,
    prelude::*,
    ranges::RangeRecord,
    render::PlottersRenderer,
    reporting::{CommandOutput, Report},
    traits::TsvSerialize,
};

/// The input files of one plot. Only the sites and regions are required.
#[derive(Clone, Debug, Default)]
pub struct PlotInputs {
    pub sites: PathBuf,
    pub regions: PathBuf,
    pub enhancers: Option<PathBuf>,
    pub groups: Option<PathBuf>,
    pub genes: Option<PathBuf>,
    pub symbols: Option<PathBuf>,
    pub style: Option<PathBuf>,
    pub seqlens: Option<PathBuf>,
}

/// Plot methylation over an interval and write the image to `output`.
pub fn methtracks_plot(
    genome: &str,
    interval: GenomicInterval,
    inputs: &PlotInputs,
    output: &PathBuf,
) -> Result<CommandOutput<()>, MethPlotError> {
    let genome: Genome = genome.parse()?;

    let mut source = FileAnnotationSource::new();
    if let Some(genes) = &inputs.genes {
        source = source.with_gene_models(genome, genes);
    }
    if let Some(symbols) = &inputs.symbols {
        source = source.with_symbols(genome.species(), symbols);
    }

    // For reporting stuff to the user.
    let mut report = Report::new();

    let sites = MethylationSites::from_path(&inputs.sites, &interval.chromosome, &mut report)?;
    let regions = RegionSet::from_path(&inputs.regions)?;
    let enhancers = inputs
        .enhancers
        .as_ref()
        .map(RegionTable::from_path)
        .transpose()?;
    let groups = inputs
        .groups
        .as_ref()
        .map(GroupAssignment::from_path)
        .transpose()?;
    let style = match &inputs.style {
        Some(path) => PlotStyle::from_path(path)?,
        None => PlotStyle::default(),
    };

    let mut plot = MethylationPlot::new(genome.name(), interval, &sites, &regions).with_style(style);
    if let Some(enhancers) = &enhancers {
        plot = plot.with_enhancers(enhancers);
    }
    if let Some(groups) = &groups {
        plot = plot.with_groups(groups);
    }
    if let Some(seqlens) = &inputs.seqlens {
        plot = plot.with_chrom_sizes(ChromSizes::from_file(seqlens)?);
    }

    let renderer = PlottersRenderer::new(output)?;
    report.merge(plot.render(&source, &renderer)?);
    info!("wrote {}", output.display());
    Ok(CommandOutput::new((), report))
}

/// List the supported genomes as TSV.
pub fn methtracks_genomes(output: Option<&PathBuf>) -> Result<CommandOutput<()>, MethPlotError> {
    let header = Some(vec!["genome\tspecies\tassembly\tchromosomes".to_string()]);
    let output_stream = output.map_or(OutputFile::new_stdout(header.clone()), |file| {
        OutputFile::new(file, header)
    });
    let mut writer = output_stream.writer()?;
    for genome in Genome::ALL {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            genome,
            genome.species(),
            genome.assembly(),
            genome.chrom_sizes()?.len()
        )?;
    }
    writer.flush()?;
    Ok(CommandOutput::new((), Report::new()))
}

/// Normalize a region file to 1-based inclusive ranges on `chromosome` and
/// write them as TSV.
pub fn methtracks_regions(
    regions: &PathBuf,
    chromosome: &str,
    output: Option<&PathBuf>,
) -> Result<CommandOutput<()>, MethPlotError> {
    let output_stream = output.map_or(OutputFile::new_stdout(None), |file| {
        OutputFile::new(file, None)
    });
    let mut writer = output_stream.writer()?;

    let mut report = Report::new();
    let regions = RegionSet::from_path(regions)?.normalize(chromosome, &mut report)?;
    for region in regions {
        let record = RangeRecord::new(chromosome.to_string(), region.start, region.end, ());
        writeln!(writer, "{}", record.to_tsv())?;
    }
    writer.flush()?;
    Ok(CommandOutput::new((), report))
}
