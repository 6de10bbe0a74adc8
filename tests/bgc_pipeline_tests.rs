mod common;

use anyhow::Result;
use binscope::core::{BgcAnalysis, BgcInputs, TaxonomyInputs};
use binscope::report::{self, BIN_BGC_TSV, CLASS_PRODUCT_TSV, DUPLICATES_TSV, PRODUCT_CHART};
use binscope::Config;
use pretty_assertions::assert_eq;

use common::*;

fn inputs(scenario: &BgcScenario, with_archaea: bool) -> BgcInputs {
    BgcInputs {
        antismash_results: scenario.antismash.clone(),
        bin_directory: scenario.bins.clone(),
        taxonomy: TaxonomyInputs {
            bacteria: scenario.bacteria.clone(),
            archaea: with_archaea.then(|| scenario.archaea.clone()),
        },
    }
}

#[test]
fn test_bgc_summary_totals() -> Result<()> {
    let scenario = BgcScenario::new()?;
    let analysis = BgcAnalysis::run(&inputs(&scenario, true), &Config::default())?;
    let summary = analysis.summary();

    assert_eq!(summary.records, 3);
    assert_eq!(summary.regions, 3);
    assert_eq!(summary.candidate_clusters, 3);
    assert_eq!(summary.non_other_clusters, 2);
    assert_eq!(summary.clusters_not_on_contig_edge, 2);
    assert_eq!(summary.total_cluster_length_bp, 25000);
    assert_eq!(summary.bins, 3);
    assert_eq!(summary.binned_contigs, 5);
    assert_eq!(summary.unique_binned_contigs, 4);
    assert_eq!(summary.merged_rows, 5);
    assert_eq!(summary.merged_bins, 3);
    assert_eq!(summary.merged_unique_contigs, 4);
    assert_eq!(summary.contigs_in_more_than_one_bin, 1);
    assert_eq!(summary.taxonomy_rows, 3);
    Ok(())
}

#[test]
fn test_clusters_outside_bins_are_dropped() -> Result<()> {
    let scenario = BgcScenario::new()?;
    let analysis = BgcAnalysis::run(&inputs(&scenario, true), &Config::default())?;

    assert!(analysis
        .merged
        .iter()
        .all(|r| r.row.contig != "NODE_7_length_30000_cov_1.5"));
    let products: Vec<_> = analysis
        .merged
        .iter()
        .filter_map(|r| r.row.cluster.as_ref().map(|c| c.product.as_str()))
        .collect();
    assert_eq!(products, vec!["NRPS", "terpene"]);
    Ok(())
}

#[test]
fn test_bgc_artifacts() -> Result<()> {
    let scenario = BgcScenario::new()?;
    let analysis = BgcAnalysis::run(&inputs(&scenario, true), &Config::default())?;
    let out = scenario.env.output_dir();
    std::fs::create_dir_all(&out)?;

    let written = report::write_bgc_artifacts(&analysis, &out, &Config::default().charts)?;
    assert_eq!(written.len(), 6);
    assert!(written.iter().all(|p| p.exists()));

    let merged = read_tsv(&out.join(BIN_BGC_TSV))?;
    assert_eq!(merged.len(), 6);
    assert_eq!(merged[0].last().map(String::as_str), Some("class"));
    assert_eq!(
        merged[1],
        vec![
            "bin.1",
            "NODE_1_length_48000_cov_3.2",
            "48000",
            "20000",
            "False",
            "1",
            "single",
            "NRPS",
            STREPTOMYCES,
            "c__Actinomycetia",
        ]
    );
    assert_eq!(merged[2][2..8].to_vec(), vec![""; 6]);

    let duplicates = read_tsv(&out.join(DUPLICATES_TSV))?;
    assert_eq!(duplicates.len(), 3);
    assert_eq!(duplicates[1][..2].to_vec(), vec!["bin.1", "NODE_3_length_500_cov_2.0"]);
    assert_eq!(duplicates[2][..2].to_vec(), vec!["bin.2", "NODE_3_length_500_cov_2.0"]);

    let per_class = read_tsv(&out.join(CLASS_PRODUCT_TSV))?;
    assert_eq!(
        per_class,
        vec![
            vec!["class", "product", "bgc_count"],
            vec!["c__Actinomycetia", "NRPS", "1"],
            vec!["c__Bacilli", "terpene", "1"],
        ]
    );

    let chart = std::fs::read_to_string(out.join(PRODUCT_CHART))?;
    assert!(chart.contains(">terpene</text>"));
    Ok(())
}

#[test]
fn test_without_archaeal_table() -> Result<()> {
    let scenario = BgcScenario::new()?;
    let analysis = BgcAnalysis::run(&inputs(&scenario, false), &Config::default())?;

    assert_eq!(analysis.summary().taxonomy_rows, 2);
    assert_eq!(analysis.merged.len(), 5);
    let bin3 = analysis
        .merged
        .iter()
        .find(|r| r.row.bin == "bin.3")
        .expect("bin.3 is kept");
    assert_eq!(bin3.taxonomy, None);
    Ok(())
}

#[test]
fn test_no_candidate_clusters() -> Result<()> {
    let env = TestEnvironment::new()?;
    let antismash = env.create_input_file(
        "gene_clusters.gbk",
        &antismash_record("NODE_1_length_48000_cov_3.2", &[]),
    )?;
    let bins = env.create_bins(&[("bin.1", &[("NODE_1_length_48000_cov_3.2", "ACGT")])])?;
    let bacteria =
        env.create_input_file("bac.tsv", &gtdb_table(&[("bin.1", STREPTOMYCES)]))?;

    let analysis = BgcAnalysis::run(
        &BgcInputs {
            antismash_results: antismash,
            bin_directory: bins,
            taxonomy: TaxonomyInputs {
                bacteria,
                archaea: None,
            },
        },
        &Config::default(),
    )?;
    assert_eq!(analysis.summary().candidate_clusters, 0);
    assert_eq!(analysis.merged.len(), 1);
    assert!(analysis.class_product_counts.is_empty());

    let out = env.output_dir();
    std::fs::create_dir_all(&out)?;
    report::write_bgc_artifacts(&analysis, &out, &Config::default().charts)?;
    let chart = std::fs::read_to_string(out.join(PRODUCT_CHART))?;
    assert!(chart.contains("No data"));
    Ok(())
}

#[test]
fn test_gzipped_genbank() -> Result<()> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let scenario = BgcScenario::new()?;
    let text = std::fs::read(&scenario.antismash)?;
    let gz_path = scenario.env.path("gene_clusters.gbk.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&gz_path)?, Compression::default());
    encoder.write_all(&text)?;
    encoder.finish()?;

    let mut gz_inputs = inputs(&scenario, true);
    gz_inputs.antismash_results = gz_path;
    let analysis = BgcAnalysis::run(&gz_inputs, &Config::default())?;
    assert_eq!(analysis.summary().candidate_clusters, 3);
    Ok(())
}
