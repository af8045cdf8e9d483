use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use methtracks::{
    commands::{methtracks_genomes, methtracks_plot, methtracks_regions, PlotInputs},
    prelude::{GenomicInterval, MethPlotError},
    Position,
};

const INFO: &str = "\
methtracks: multi-track methylation plots around differentially methylated regions
usage: methtracks [--help] <subcommand>

Subcommands:

  plot: draw the ideogram, axis, gene, DMR, heatmap and group-average tracks.
  genomes: list the supported genomes.
  regions: print a region file normalized to 1-based ranges on a chromosome.

";

#[derive(Parser)]
#[clap(name = "methtracks")]
#[clap(about = INFO)]
struct Cli {
    /// increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    debug: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct PlotArgs {
    /// the genome the gene models are drawn from: hg19, hg38 or mm39
    #[arg(long, required = true)]
    genome: String,

    /// the chromosome of the plotted interval
    #[arg(long, required = true)]
    chrom: String,

    /// 1-based start of the plotted interval
    #[arg(long, required = true)]
    start: Position,

    /// 1-based, inclusive end of the plotted interval
    #[arg(long, required = true)]
    end: Position,

    /// a TSV of CpG positions with one methylation column per sample
    #[arg(long, required = true)]
    sites: PathBuf,

    /// the DMRs, as a TSV with start and end columns or a BED-like file
    #[arg(long, required = true)]
    regions: PathBuf,

    /// an optional TSV of enhancers with start and end columns
    #[arg(long)]
    enhancers: Option<PathBuf>,

    /// an optional two-column TSV assigning samples to groups
    #[arg(long)]
    groups: Option<PathBuf>,

    /// a GTF of gene models for the genome
    #[arg(long)]
    genes: Option<PathBuf>,

    /// a two-column TSV of gene ids and symbols for the genome's species
    #[arg(long)]
    symbols: Option<PathBuf>,

    /// an optional single-row TSV of plot style settings
    #[arg(long)]
    style: Option<PathBuf>,

    /// a TSV genome file of chromosome names and their lengths, replacing
    /// the genome's built-in sizes
    #[arg(long)]
    seqlens: Option<PathBuf>,

    /// the output image (.svg or .png)
    #[arg(long, required = true)]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    Plot(PlotArgs),
    Genomes {
        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Regions {
        /// a region TSV with start and end columns, or a BED-like file
        #[arg(required = true)]
        regions: PathBuf,

        /// the chromosome to keep
        #[arg(long, required = true)]
        chrom: String,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(debug: u8) {
    let mut builder = pretty_env_logger::formatted_builder();
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    } else {
        let level = match debug {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        builder.filter_level(level);
    }
    builder.init();
}

fn run() -> Result<(), MethPlotError> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let result = match &cli.command {
        Some(Commands::Plot(args)) => {
            let interval = GenomicInterval::new(&args.chrom, args.start, args.end)?;
            let inputs = PlotInputs {
                sites: args.sites.clone(),
                regions: args.regions.clone(),
                enhancers: args.enhancers.clone(),
                groups: args.groups.clone(),
                genes: args.genes.clone(),
                symbols: args.symbols.clone(),
                style: args.style.clone(),
                seqlens: args.seqlens.clone(),
            };
            methtracks_plot(&args.genome, interval, &inputs, &args.output)
        }
        Some(Commands::Genomes { output }) => methtracks_genomes(output.as_ref()),
        Some(Commands::Regions {
            regions,
            chrom,
            output,
        }) => methtracks_regions(regions, chrom, output.as_ref()),
        None => {
            println!("{}\n", INFO);
            std::process::exit(1);
        }
    };
    let output = result?;
    output.report().log_issues();
    Ok(())
}

fn main() {
    match run() {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
