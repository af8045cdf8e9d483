//! End-to-end plotting from the files in `tests_data/`.

use methtracks::{
    annotation::FileAnnotationSource,
    prelude::*,
    render::PlottersRenderer,
    test_utilities::{test_annotation, RecordingRenderer},
    tracks::Track,
};

fn file_source() -> FileAnnotationSource {
    FileAnnotationSource::new()
        .with_gene_models(Genome::Hg19, "tests_data/genes_hg19.gtf")
        .with_symbols(Species::Human, "tests_data/symbols_human.tsv")
}

#[test]
fn test_bdnf_promoter_scenario() {
    let mut report = Report::new();
    let sites = MethylationSites::from_path("tests_data/sites.tsv", "chr11", &mut report).unwrap();
    let dmrs = RegionSet::from_path("tests_data/dmrs.tsv").unwrap();
    let groups = GroupAssignment::from_path("tests_data/groups.tsv").unwrap();
    let renderer = RecordingRenderer::new();

    let issues = render_methylation_plot(
        "hg19",
        "chr11",
        27015473,
        27015991,
        &sites,
        &dmrs,
        None,
        Some(&groups),
        &file_source(),
        &renderer,
    )
    .unwrap();
    assert!(issues.is_empty());

    let requests = renderer.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.tracks.len(), 6);
    assert_eq!(request.weights(), vec![2, 2, 5, 2, 10, 5]);
    assert_eq!((request.window.from, request.window.to), (27015421, 27016043));

    let Some(Track::GeneModel(genes)) = request.tracks.get(2) else {
        panic!("third track is not the gene model track");
    };
    assert_eq!(genes.genes.len(), 1);
    assert_eq!(genes.genes[0].symbol, "BDNF");
    assert_eq!(genes.genes[0].model.exons.len(), 3);

    let Some(Track::GroupLines(lines)) = request.tracks.get(5) else {
        panic!("last track is not the group line plot");
    };
    let labels: Vec<&str> = lines.groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["control", "case", "mixed"]);
}

#[test]
fn test_table_and_bed_regions_plot_the_same() {
    let sites = MethylationSites::from_path("tests_data/sites.tsv", "chr11", &mut Report::new())
        .unwrap();
    let interval = GenomicInterval::new("chr11", 27015473, 27015991).unwrap();
    let source = test_annotation();

    let table = RegionSet::from_path("tests_data/dmrs.tsv").unwrap();
    let bed = RegionSet::from_path("tests_data/dmrs.bed").unwrap();
    let (from_table, _) = MethylationPlot::new("hg19", interval.clone(), &sites, &table)
        .build_request(&source)
        .unwrap();
    let (from_bed, _) = MethylationPlot::new("hg19", interval, &sites, &bed)
        .build_request(&source)
        .unwrap();
    assert_eq!(from_table, from_bed);
}

#[test]
fn test_enhancers_and_style_to_svg() {
    let sites = MethylationSites::from_path("tests_data/sites.tsv", "chr11", &mut Report::new())
        .unwrap();
    let dmrs = RegionSet::from_path("tests_data/dmrs.bed").unwrap();
    let enhancers = RegionTable::from_path("tests_data/enhancers.tsv").unwrap();
    let style = PlotStyle::from_path("tests_data/style.tsv").unwrap();
    let interval = GenomicInterval::new("chr11", 27015473, 27015991).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("bdnf.svg");
    let renderer = PlottersRenderer::new(&output).unwrap();
    MethylationPlot::new("hg19", interval, &sites, &dmrs)
        .with_enhancers(&enhancers)
        .with_style(style)
        .render(&file_source(), &renderer)
        .unwrap();

    let svg = std::fs::read_to_string(&output).unwrap();
    assert!(svg.contains("width=\"1600\""));
    assert!(svg.contains("enhancers"));
    assert!(svg.contains("BDNF"));
}
