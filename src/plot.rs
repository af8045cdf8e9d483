//! Assembling a methylation plot and handing it to a renderer.
//!
//! [`MethylationPlot`] collects the inputs of one plot and turns them into a
//! [`PlotRequest`]: the ordered tracks, their weights, and the display window.
//! [`render_methylation_plot`] is the single-call form of the same pipeline.
//!
//! The order of work is fixed: the genome name is resolved first (so an
//! unsupported genome fails before anything is read), then the gene-model
//! track is built from the annotation source, then the remaining tracks, and
//! finally the renderer is called exactly once.

use log::{debug, info};

use crate::{
    annotation::{resolve_gene_track, AnnotationSource},
    error::MethPlotError,
    genome::{ChromSizes, Genome, GenomicInterval},
    ranges::{validate_range, Region},
    regions::{RegionSet, RegionTable},
    reporting::Report,
    sites::{individual_groups, GroupAssignment, MethylationSites},
    style::PlotStyle,
    tracks::{assemble_tracks, IdeogramTrack, IntervalTrack, TrackInputs, TrackList},
    traits::{GenericRange, TrackRenderer},
    Position,
};

/// The displayed coordinate range, wider than the requested interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub from: Position,
    pub to: Position,
}

impl GenericRange for Window {
    fn start(&self) -> Position {
        self.from
    }
    fn end(&self) -> Position {
        self.to
    }
}

/// Everything a [`TrackRenderer`] needs to draw one plot.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotRequest {
    pub chromosome: String,
    pub interval: Region,
    pub window: Window,
    pub tracks: TrackList,
    pub style: PlotStyle,
}

impl PlotRequest {
    /// Relative track heights, in track order.
    pub fn weights(&self) -> Vec<u32> {
        self.tracks.weights()
    }
}

/// The inputs of one methylation plot.
#[derive(Clone, Debug)]
pub struct MethylationPlot<'a> {
    genome: String,
    interval: GenomicInterval,
    sites: &'a MethylationSites,
    regions: &'a RegionSet,
    enhancers: Option<&'a RegionTable>,
    groups: Option<&'a GroupAssignment>,
    style: PlotStyle,
    chrom_sizes: Option<ChromSizes>,
}

impl<'a> MethylationPlot<'a> {
    pub fn new(
        genome: impl Into<String>,
        interval: GenomicInterval,
        sites: &'a MethylationSites,
        regions: &'a RegionSet,
    ) -> Self {
        Self {
            genome: genome.into(),
            interval,
            sites,
            regions,
            enhancers: None,
            groups: None,
            style: PlotStyle::default(),
            chrom_sizes: None,
        }
    }

    pub fn with_enhancers(mut self, enhancers: &'a RegionTable) -> Self {
        self.enhancers = Some(enhancers);
        self
    }

    pub fn with_groups(mut self, groups: &'a GroupAssignment) -> Self {
        self.groups = Some(groups);
        self
    }

    pub fn with_style(mut self, style: PlotStyle) -> Self {
        self.style = style;
        self
    }

    /// Use these chromosome sizes instead of the genome's built-in table.
    pub fn with_chrom_sizes(mut self, chrom_sizes: ChromSizes) -> Self {
        self.chrom_sizes = Some(chrom_sizes);
        self
    }

    /// Build the [`PlotRequest`] without rendering it, along with the
    /// non-fatal issues met on the way.
    pub fn build_request(
        &self,
        source: &dyn AnnotationSource,
    ) -> Result<(PlotRequest, Report), MethPlotError> {
        let genome: Genome = self.genome.parse()?;
        self.style.validate()?;
        let interval = &self.interval;
        let mut report = Report::new();

        let chrom_length = match &self.chrom_sizes {
            Some(sizes) => sizes.get(&interval.chromosome),
            None => genome.chrom_sizes()?.get(&interval.chromosome),
        }
        .ok_or_else(|| {
            MethPlotError::UnknownChromosome(interval.chromosome.clone(), genome.to_string())
        })?;
        validate_range(interval.start, interval.end, chrom_length)?;

        let genes = resolve_gene_track(genome.name(), interval, source, &mut report)?;

        let dmrs = IntervalTrack {
            name: "DMRs".to_string(),
            regions: self.regions.normalize(&interval.chromosome, &mut report)?,
            color: self.style.dmr_rgb()?,
        };
        let enhancers = match self.enhancers {
            Some(table) => Some(IntervalTrack {
                name: "enhancers".to_string(),
                regions: table.normalize(&interval.chromosome, &mut report)?,
                color: self.style.enhancer_rgb()?,
            }),
            None => None,
        };

        let groups = match self.groups {
            Some(assignment) => assignment.groups_for(self.sites.samples())?,
            None => individual_groups(self.sites.samples()),
        };

        let (from, to) = interval.widen(self.style.window_margin, Some(chrom_length));
        let window = Window { from, to };
        let sites = self.sites.within(&window);
        let outside = self.sites.len() - sites.len();
        if outside > 0 {
            report.add_issue(format!(
                "{} CpG site(s) outside {}:{}-{} were not plotted",
                outside, interval.chromosome, from, to
            ));
        }

        let highlight = Region::new(interval.start, interval.end)?;
        let tracks = assemble_tracks(TrackInputs {
            ideogram: IdeogramTrack {
                genome,
                chromosome: interval.chromosome.clone(),
                chrom_length,
                highlight,
            },
            genes,
            enhancers,
            dmrs,
            sites: &sites,
            groups: &groups,
            gradient: self.style.gradient()?,
            sample_font_size: self.style.sample_font_size,
        });
        debug!(
            "assembled {} tracks with weights {:?}",
            tracks.len(),
            tracks.weights()
        );

        let request = PlotRequest {
            chromosome: interval.chromosome.clone(),
            interval: highlight,
            window,
            tracks,
            style: self.style.clone(),
        };
        Ok((request, report))
    }

    /// Build the request and render it with `renderer`.
    pub fn render(
        &self,
        source: &dyn AnnotationSource,
        renderer: &dyn TrackRenderer,
    ) -> Result<Report, MethPlotError> {
        let (request, report) = self.build_request(source)?;
        info!(
            "rendering {} tracks over {}:{}-{}",
            request.tracks.len(),
            request.chromosome,
            request.window.from,
            request.window.to
        );
        renderer.render(&request)?;
        Ok(report)
    }
}

/// Plot methylation over `chromosome:start-end` in a single call.
///
/// Builds the gene-model, region, heatmap and group-average tracks, calls
/// `renderer` once, and returns the non-fatal issues collected on the way.
#[allow(clippy::too_many_arguments)]
pub fn render_methylation_plot(
    genome: &str,
    chromosome: &str,
    start: Position,
    end: Position,
    sites: &MethylationSites,
    regions: &RegionSet,
    enhancers: Option<&RegionTable>,
    groups: Option<&GroupAssignment>,
    source: &dyn AnnotationSource,
    renderer: &dyn TrackRenderer,
) -> Result<Report, MethPlotError> {
    // resolve before validating anything else
    let _: Genome = genome.parse()?;
    let interval = GenomicInterval::new(chromosome, start, end)?;
    let mut plot = MethylationPlot::new(genome, interval, sites, regions);
    if let Some(enhancers) = enhancers {
        plot = plot.with_enhancers(enhancers);
    }
    if let Some(groups) = groups {
        plot = plot.with_groups(groups);
    }
    plot.render(source, renderer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::{
        example_groups, example_sites, test_annotation, CountingAnnotation, FailingRenderer,
        RecordingRenderer,
    };
    use crate::tracks::Track;

    fn dmrs() -> RegionSet {
        RegionTable::from_coordinates(&[(27015500, 27015700)]).into()
    }

    #[test]
    fn test_scenario_without_enhancers() {
        let sites = example_sites();
        let groups = example_groups();
        let regions = dmrs();
        let renderer = RecordingRenderer::new();
        let report = render_methylation_plot(
            "hg19",
            "chr11",
            27015473,
            27015991,
            &sites,
            &regions,
            None,
            Some(&groups),
            &test_annotation(),
            &renderer,
        )
        .unwrap();
        assert!(report.is_empty());

        let requests = renderer.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.tracks.len(), 6);
        assert_eq!(request.weights(), vec![2, 2, 5, 2, 10, 5]);
        assert_eq!(request.window, Window { from: 27015421, to: 27016043 });

        let Some(Track::GroupLines(lines)) = request.tracks.get(5) else {
            panic!("last track is not the group line plot");
        };
        assert_eq!(lines.groups.len(), 3);
        let Some(Track::Dmrs(dmrs)) = request.tracks.get(3) else {
            panic!("fourth track is not the DMR track");
        };
        assert_eq!(dmrs.regions, vec![Region { start: 27015500, end: 27015700 }]);
    }

    #[test]
    fn test_enhancers_add_a_track() {
        let sites = example_sites();
        let regions = dmrs();
        let enhancers = RegionTable::from_coordinates(&[(27015800, 27015900)]);
        let interval = GenomicInterval::new("chr11", 27015473, 27015991).unwrap();
        let (request, _) = MethylationPlot::new("hg19", interval, &sites, &regions)
            .with_enhancers(&enhancers)
            .build_request(&test_annotation())
            .unwrap();
        assert_eq!(request.weights(), vec![2, 2, 5, 2, 2, 10, 5]);
        assert!(matches!(request.tracks.get(3), Some(Track::Enhancers(_))));
    }

    #[test]
    fn test_ungrouped_lines_per_sample() {
        let sites = example_sites();
        let regions = dmrs();
        let interval = GenomicInterval::new("chr11", 27015473, 27015991).unwrap();
        let (request, _) = MethylationPlot::new("hg38", interval, &sites, &regions)
            .build_request(&test_annotation())
            .unwrap();
        let Some(Track::GroupLines(lines)) = request.tracks.get(5) else {
            panic!("last track is not the group line plot");
        };
        assert_eq!(lines.groups.len(), 6);
    }

    #[test]
    fn test_unsupported_genome_renders_nothing() {
        let sites = example_sites();
        let regions = dmrs();
        let source = CountingAnnotation::new(test_annotation());
        let renderer = RecordingRenderer::new();
        let result = render_methylation_plot(
            "hg18", "chr11", 27015473, 27015991, &sites, &regions, None, None, &source, &renderer,
        );
        assert!(matches!(result, Err(MethPlotError::UnsupportedGenome(_))));
        assert_eq!(source.calls(), 0);
        assert!(renderer.requests().is_empty());
    }

    #[test]
    fn test_unknown_chromosome() {
        let sites = example_sites();
        let regions = dmrs();
        let interval = GenomicInterval::new("chrUn", 1, 100).unwrap();
        let result = MethylationPlot::new("mm39", interval, &sites, &regions)
            .build_request(&test_annotation());
        assert!(matches!(
            result,
            Err(MethPlotError::UnknownChromosome(c, g)) if c == "chrUn" && g == "mm39"
        ));
    }

    #[test]
    fn test_window_clamped_to_chromosome() {
        let sites = example_sites();
        let regions = dmrs();
        let sizes = ChromSizes::from_pairs(vec![("chr11", 27016000)].into_iter()).unwrap();
        let interval = GenomicInterval::new("chr11", 27015473, 27015991).unwrap();
        let (request, _) = MethylationPlot::new("hg19", interval, &sites, &regions)
            .with_chrom_sizes(sizes)
            .build_request(&test_annotation())
            .unwrap();
        assert_eq!(request.window, Window { from: 27015421, to: 27016000 });
    }

    #[test]
    fn test_interval_past_chromosome_end() {
        let sites = example_sites();
        let regions = dmrs();
        let sizes = ChromSizes::from_pairs(vec![("chr11", 27015900)].into_iter()).unwrap();
        let interval = GenomicInterval::new("chr11", 27015473, 27015991).unwrap();
        let result = MethylationPlot::new("hg19", interval, &sites, &regions)
            .with_chrom_sizes(sizes)
            .build_request(&test_annotation());
        assert!(matches!(result, Err(MethPlotError::InvalidGenomicRange(_, _))));
    }

    #[test]
    fn test_sites_outside_window_reported() {
        let mut sites = example_sites();
        let far = vec![Some(0.5); sites.num_samples()];
        sites.push_site(27_100_000, far).unwrap();
        let regions = dmrs();
        let interval = GenomicInterval::new("chr11", 27015473, 27015991).unwrap();
        let (request, report) = MethylationPlot::new("hg19", interval, &sites, &regions)
            .build_request(&test_annotation())
            .unwrap();
        let Some(Track::Heatmap(heatmap)) = request.tracks.get(4) else {
            panic!("fifth track is not the heatmap");
        };
        assert_eq!(heatmap.positions.len(), 5);
        assert_eq!(report.issues().len(), 1);
    }

    #[test]
    fn test_renderer_error_propagates() {
        let sites = example_sites();
        let regions = dmrs();
        let result = render_methylation_plot(
            "hg19",
            "chr11",
            27015473,
            27015991,
            &sites,
            &regions,
            None,
            None,
            &test_annotation(),
            &FailingRenderer,
        );
        assert!(matches!(result, Err(MethPlotError::Render(msg)) if msg == "device unavailable"));
    }

    #[test]
    fn test_mismatched_groups_fail() {
        let sites = example_sites();
        let regions = dmrs();
        let groups = GroupAssignment::from_pairs(vec![("ctrl_1".to_string(), "a".to_string())]);
        let interval = GenomicInterval::new("chr11", 27015473, 27015991).unwrap();
        let result = MethylationPlot::new("hg19", interval, &sites, &regions)
            .with_groups(&groups)
            .build_request(&test_annotation());
        assert!(matches!(result, Err(MethPlotError::UnassignedSample(s)) if s == "ctrl_2"));
    }
}
