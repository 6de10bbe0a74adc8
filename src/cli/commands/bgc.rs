use crate::cli::output::*;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::pipeline::{BgcAnalysis, BgcInputs, BgcSummary, TaxonomyInputs};
use crate::report;
use anyhow::Context;
use clap::Args;
use comfy_table::Cell;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct BgcArgs {
    /// antiSMASH GenBank file with all regions (e.g. gene_clusters.gbk)
    #[arg(short = 'r', long, value_name = "FILE")]
    pub antismash_results: PathBuf,

    /// Directory of bin FASTA files
    #[arg(short = 'b', long, value_name = "DIR")]
    pub bin_directory: PathBuf,

    /// GTDB-tk bacterial summary table
    #[arg(short = 't', long, value_name = "FILE")]
    pub taxonomy_file_bac: PathBuf,

    /// GTDB-tk archaeal summary table
    #[arg(short = 'a', long, value_name = "FILE")]
    pub taxonomy_file_arc: Option<PathBuf>,

    /// Directory for tables and charts
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Summary format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct BgcReport<'a> {
    summary: BgcSummary,
    product_counts: Vec<ProductCount>,
    outputs: &'a [PathBuf],
}

#[derive(Serialize)]
struct ProductCount {
    product: String,
    count: usize,
}

impl From<&BgcArgs> for BgcInputs {
    fn from(args: &BgcArgs) -> Self {
        Self {
            antismash_results: args.antismash_results.clone(),
            bin_directory: args.bin_directory.clone(),
            taxonomy: TaxonomyInputs {
                bacteria: args.taxonomy_file_bac.clone(),
                archaea: args.taxonomy_file_arc.clone(),
            },
        }
    }
}

pub fn run(args: BgcArgs, config: &Config) -> anyhow::Result<()> {
    super::ensure_output_dir(&args.output_dir)?;

    let pb = super::spinner(format!(
        "Mapping {} onto bins in {}...",
        args.antismash_results.display(),
        args.bin_directory.display()
    ));
    let analysis = BgcAnalysis::run(&BgcInputs::from(&args), config);
    pb.finish_and_clear();
    let analysis = analysis.with_context(|| {
        format!(
            "Failed to map {} onto bins in {}",
            args.antismash_results.display(),
            args.bin_directory.display()
        )
    })?;

    let outputs = report::write_bgc_artifacts(&analysis, &args.output_dir, &config.charts)
        .with_context(|| format!("Failed to write results to {}", args.output_dir.display()))?;
    info!("Wrote {} files to {}", outputs.len(), args.output_dir.display());

    match args.format {
        OutputFormat::Json => {
            let report = BgcReport {
                summary: analysis.summary(),
                product_counts: analysis
                    .annotation
                    .product_counts()
                    .into_iter()
                    .map(|(product, count)| ProductCount { product, count })
                    .collect(),
                outputs: &outputs,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print_text_summary(&analysis, &outputs),
    }

    Ok(())
}

fn print_text_summary(analysis: &BgcAnalysis, outputs: &[PathBuf]) {
    let summary = analysis.summary();

    section_header_with_line("BGC to Bin Mapping");

    subsection_header("antiSMASH Results");
    tree_items(&[
        ("Records", format_number(summary.records)),
        ("Regions", format_number(summary.regions)),
        ("Candidate clusters", format_number(summary.candidate_clusters)),
        ("Non-'other' clusters", format_number(summary.non_other_clusters)),
        (
            "Not on a contig edge",
            format_number(summary.clusters_not_on_contig_edge),
        ),
        (
            "Total cluster length",
            format!("{} bp", format_number(summary.total_cluster_length_bp)),
        ),
    ]);

    subsection_header("Bins");
    tree_items(&[
        ("Bins/MAGs", format_number(summary.bins)),
        ("Binned contigs", format_number(summary.binned_contigs)),
        ("Unique binned contigs", format_number(summary.unique_binned_contigs)),
    ]);

    subsection_header("Merged Table");
    tree_items(&[
        ("Rows", format_number(summary.merged_rows)),
        ("Bins", format_number(summary.merged_bins)),
        ("Unique contigs", format_number(summary.merged_unique_contigs)),
        ("Taxonomy rows", format_number(summary.taxonomy_rows)),
    ]);

    if summary.contigs_in_more_than_one_bin > 0 {
        warning(&format!(
            "{} contigs are assigned to more than one bin",
            format_number(summary.contigs_in_more_than_one_bin)
        ));
    }

    let products = analysis.annotation.product_counts();
    subsection_header("Candidate Clusters per Product");
    if products.is_empty() {
        empty("No candidate clusters found");
    } else {
        let mut table = create_standard_table();
        table.set_header(vec![header_cell("Product"), header_cell("BGCs")]);
        for (product, count) in &products {
            table.add_row(vec![Cell::new(product), number_cell(count)]);
        }
        println!("{}", table);
    }

    println!();
    for path in outputs {
        success(&format!("Wrote {}", path.display()));
    }
}
