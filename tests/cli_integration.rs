mod common;

use anyhow::Result;
use predicates::prelude::*;

use common::*;

#[test]
fn test_cli_help_command() {
    binscope_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bgc"))
        .stdout(predicate::str::contains("blobplot"));
}

#[test]
fn test_cli_version_command() {
    binscope_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("binscope"));
}

#[test]
fn test_bgc_end_to_end() -> Result<()> {
    let scenario = BgcScenario::new()?;
    let out = scenario.env.path("nested/results");

    binscope_cmd()
        .arg("bgc")
        .arg("-r")
        .arg(&scenario.antismash)
        .arg("-b")
        .arg(&scenario.bins)
        .arg("-t")
        .arg(&scenario.bacteria)
        .arg("-a")
        .arg(&scenario.archaea)
        .arg("-o")
        .arg(&out)
        .env_remove("BINSCOPE_CONFIG")
        .assert()
        .success()
        .stdout(predicate::str::contains("BGC to Bin Mapping"))
        .stdout(predicate::str::contains("terpene"));

    for name in [
        "contigs_in_more_than_one_bin.tsv",
        "final_bin_bgc_df.tsv",
        "bgc_summary.tsv",
        "bgcs_per_class_per_product.tsv",
        "BGCs_per_sec_met_class.svg",
        "BGCs_per_sec_met_class_per_tax_class.svg",
    ] {
        assert!(out.join(name).exists(), "{} should be written", name);
    }

    let summary = read_tsv(&out.join("bgc_summary.tsv"))?;
    assert!(summary.contains(&vec![
        "total_cluster_length_bp".to_string(),
        "25000".to_string()
    ]));
    Ok(())
}

#[test]
fn test_bgc_json_summary() -> Result<()> {
    let scenario = BgcScenario::new()?;
    let out = scenario.env.output_dir();

    let output = binscope_cmd()
        .arg("bgc")
        .arg("--antismash-results")
        .arg(&scenario.antismash)
        .arg("--bin-directory")
        .arg(&scenario.bins)
        .arg("--taxonomy-file-bac")
        .arg(&scenario.bacteria)
        .arg("--output-dir")
        .arg(&out)
        .arg("--format")
        .arg("json")
        .env_remove("BINSCOPE_CONFIG")
        .output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["summary"]["candidate_clusters"], 3);
    assert_eq!(report["summary"]["contigs_in_more_than_one_bin"], 1);
    assert_eq!(report["summary"]["taxonomy_rows"], 2);
    assert_eq!(report["product_counts"][0]["product"], "NRPS");
    assert_eq!(report["outputs"].as_array().map(Vec::len), Some(6));
    Ok(())
}

#[test]
fn test_blobplot_end_to_end() -> Result<()> {
    let scenario = BgcScenario::new()?;
    let out = scenario.env.output_dir();

    binscope_cmd()
        .arg("blobplot")
        .arg("-b")
        .arg(&scenario.bins)
        .arg("-t")
        .arg(&scenario.bacteria)
        .arg("-o")
        .arg(&out)
        .env_remove("BINSCOPE_CONFIG")
        .assert()
        .success()
        .stdout(predicate::str::contains("Blobplot Data"))
        .stderr(predicate::str::contains("No archaeal taxonomy file provided"));

    assert!(out.join("blob_df_final.tsv").exists());
    assert!(out.join("dereplicated_genomes_gtdbtk_lowest_ID.svg").exists());
    assert!(out.join("dereplicated_genomes_gtdbtk_class.svg").exists());
    Ok(())
}

#[test]
fn test_missing_genbank_file_is_io_error() -> Result<()> {
    let scenario = BgcScenario::new()?;

    binscope_cmd()
        .arg("bgc")
        .arg("-r")
        .arg(scenario.env.path("missing.gbk"))
        .arg("-b")
        .arg(&scenario.bins)
        .arg("-t")
        .arg(&scenario.bacteria)
        .arg("-o")
        .arg(scenario.env.output_dir())
        .env_remove("BINSCOPE_CONFIG")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("missing.gbk"));
    Ok(())
}

#[test]
fn test_undecodable_header_is_parse_error() -> Result<()> {
    let env = TestEnvironment::new()?;
    let bins = env.create_bins(&[("bin.1", &[("contig_17", "ACGT")])])?;
    let bacteria = env.create_input_file("bac.tsv", &gtdb_table(&[("bin.1", BACILLUS)]))?;

    binscope_cmd()
        .arg("blobplot")
        .arg("-b")
        .arg(&bins)
        .arg("-t")
        .arg(&bacteria)
        .arg("-o")
        .arg(env.output_dir())
        .env_remove("BINSCOPE_CONFIG")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("contig_17"));
    Ok(())
}

#[test]
fn test_invalid_config_exit_code() -> Result<()> {
    let scenario = BgcScenario::new()?;
    let config = scenario
        .env
        .create_input_file("binscope.toml", "[charts]\nfacet_columns = 0\n")?;

    binscope_cmd()
        .arg("--config")
        .arg(&config)
        .arg("blobplot")
        .arg("-b")
        .arg(&scenario.bins)
        .arg("-t")
        .arg(&scenario.bacteria)
        .arg("-o")
        .arg(scenario.env.output_dir())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("facet_columns"));
    Ok(())
}

#[test]
fn test_config_from_environment() -> Result<()> {
    let env = TestEnvironment::new()?;
    let bins = env.create_bins(&[("bin.1", &[("contig_17", "ACGT")])])?;
    let bacteria = env.create_input_file("bac.tsv", &gtdb_table(&[("bin.1", BACILLUS)]))?;
    let config = env.create_input_file("binscope.toml", "[headers]\nstrict = false\n")?;

    binscope_cmd()
        .arg("blobplot")
        .arg("-b")
        .arg(&bins)
        .arg("-t")
        .arg(&bacteria)
        .arg("-o")
        .arg(env.output_dir())
        .env("BINSCOPE_CONFIG", &config)
        .assert()
        .success();

    let table = read_tsv(&env.output_dir().join("blob_df_final.tsv"))?;
    assert_eq!(table[1][..4].to_vec(), vec!["bin.1", "contig_17", "", ""]);
    Ok(())
}
