//! Runs of the `methtracks` binary.

use std::process::Command;

fn methtracks() -> Command {
    Command::new(env!("CARGO_BIN_EXE_methtracks"))
}

#[test]
fn test_plot_command() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("plot.svg");
    let result = methtracks()
        .args(["plot", "--genome", "hg19", "--chrom", "chr11"])
        .args(["--start", "27015473", "--end", "27015991"])
        .args(["--sites", "tests_data/sites.tsv"])
        .args(["--regions", "tests_data/dmrs.bed"])
        .args(["--enhancers", "tests_data/enhancers.tsv"])
        .args(["--groups", "tests_data/groups.tsv"])
        .args(["--genes", "tests_data/genes_hg19.gtf"])
        .args(["--symbols", "tests_data/symbols_human.tsv"])
        .arg("--output")
        .arg(&output)
        .output()
        .expect("methtracks plot failed to run");
    assert!(result.status.success(), "{:?}", result);
    assert!(output.exists());
}

#[test]
fn test_plot_mouse_with_seqlens() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("plot.png");
    // the mouse gene models have nothing on chr11 near here, so the gene track is empty
    let result = methtracks()
        .args(["plot", "--genome", "mm39", "--chrom", "chr11"])
        .args(["--start", "27015473", "--end", "27015991"])
        .args(["--sites", "tests_data/sites.tsv"])
        .args(["--regions", "tests_data/dmrs.tsv"])
        .args(["--genes", "tests_data/genes_mm39.gtf"])
        .args(["--symbols", "tests_data/symbols_mouse.tsv"])
        .args(["--seqlens", "tests_data/hg19_seqlens.tsv"])
        .arg("--output")
        .arg(&output)
        .output()
        .expect("methtracks plot failed to run");
    assert!(result.status.success(), "{:?}", result);
    assert!(output.exists());
}

#[test]
fn test_unsupported_genome_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("plot.svg");
    let result = methtracks()
        .args(["plot", "--genome", "hg18", "--chrom", "chr11"])
        .args(["--start", "27015473", "--end", "27015991"])
        .args(["--sites", "tests_data/sites.tsv"])
        .args(["--regions", "tests_data/dmrs.bed"])
        .arg("--output")
        .arg(&output)
        .output()
        .expect("methtracks plot failed to run");
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Unsupported genome 'hg18'"), "{}", stderr);
    assert!(!output.exists());
}

#[test]
fn test_regions_command() {
    let result = methtracks()
        .args(["regions", "tests_data/dmrs.tsv", "--chrom", "chr11"])
        .output()
        .expect("methtracks regions failed to run");
    assert!(result.status.success(), "{:?}", result);
    assert_eq!(
        String::from_utf8_lossy(&result.stdout),
        "chr11\t27015500\t27015700\n"
    );
}

#[test]
fn test_genomes_command() {
    let result = methtracks()
        .arg("genomes")
        .output()
        .expect("methtracks genomes failed to run");
    assert!(result.status.success(), "{:?}", result);
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("hg38\thuman\tGRCh38"));
    assert!(stdout.contains("mm39\tmouse\tGRCm39"));
}
