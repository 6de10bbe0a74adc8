use crate::cli::output::*;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::pipeline::{BlobAnalysis, BlobInputs, BlobSummary, TaxonomyInputs};
use crate::report;
use anyhow::Context;
use clap::Args;
use comfy_table::Cell;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct BlobplotArgs {
    /// Directory of bin FASTA files (dereplicated genomes)
    #[arg(short = 'b', long, value_name = "DIR")]
    pub bin_directory: PathBuf,

    /// GTDB-tk bacterial summary table
    #[arg(short = 't', long, value_name = "FILE")]
    pub taxonomy_file_bac: PathBuf,

    /// GTDB-tk archaeal summary table
    #[arg(short = 'a', long, value_name = "FILE")]
    pub taxonomy_file_arc: Option<PathBuf>,

    /// Directory for the table and plots
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Summary format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct BlobReport<'a> {
    summary: BlobSummary,
    contigs_per_class: IndexMap<String, usize>,
    outputs: &'a [PathBuf],
}

impl From<&BlobplotArgs> for BlobInputs {
    fn from(args: &BlobplotArgs) -> Self {
        Self {
            bin_directory: args.bin_directory.clone(),
            taxonomy: TaxonomyInputs {
                bacteria: args.taxonomy_file_bac.clone(),
                archaea: args.taxonomy_file_arc.clone(),
            },
        }
    }
}

pub fn run(args: BlobplotArgs, config: &Config) -> anyhow::Result<()> {
    super::ensure_output_dir(&args.output_dir)?;

    let pb = super::spinner(format!(
        "Reading contigs from {}...",
        args.bin_directory.display()
    ));
    let analysis = BlobAnalysis::run(&BlobInputs::from(&args), config);
    pb.finish_and_clear();
    let analysis = analysis
        .with_context(|| format!("Failed to build blobplot data from {}", args.bin_directory.display()))?;

    let outputs = report::write_blob_artifacts(&analysis, &args.output_dir, &config.charts)
        .with_context(|| format!("Failed to write results to {}", args.output_dir.display()))?;
    info!("Wrote {} files to {}", outputs.len(), args.output_dir.display());

    match args.format {
        OutputFormat::Json => {
            let report = BlobReport {
                summary: analysis.summary(),
                contigs_per_class: contigs_per_class(&analysis),
                outputs: &outputs,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print_text_summary(&analysis, &outputs),
    }

    Ok(())
}

/// Contig counts per taxonomic class, largest first; unclassified contigs are
/// counted under an empty key
fn contigs_per_class(analysis: &BlobAnalysis) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for row in &analysis.merged {
        *counts
            .entry(row.class().unwrap_or_default().to_string())
            .or_insert(0) += 1;
    }
    counts.sort_by(|ka, va, kb, vb| vb.cmp(va).then_with(|| ka.cmp(kb)));
    counts
}

fn print_text_summary(analysis: &BlobAnalysis, outputs: &[PathBuf]) {
    let summary = analysis.summary();

    section_header_with_line("Blobplot Data");
    tree_items(&[
        ("Bins/MAGs", format_number(summary.bins)),
        ("Contigs in bins", format_number(summary.binned_contigs)),
        ("Taxonomy rows", format_number(summary.taxonomy_rows)),
        ("Bins with taxonomy", format_number(summary.bins_with_taxonomy)),
        (
            "Contigs with taxonomy",
            format!(
                "{} of {}",
                format_number(summary.contigs_with_taxonomy),
                format_number(summary.merged_rows)
            ),
        ),
    ]);

    let per_class = contigs_per_class(analysis);
    subsection_header("Contigs per Class");
    if per_class.is_empty() {
        empty("No contigs found");
    } else {
        let mut table = create_standard_table();
        table.set_header(vec![header_cell("Class"), header_cell("Contigs")]);
        for (class, count) in &per_class {
            let label = if class.is_empty() { "unclassified" } else { class };
            table.add_row(vec![Cell::new(label), number_cell(count)]);
        }
        println!("{}", table);
    }

    println!();
    for path in outputs {
        success(&format!("Wrote {}", path.display()));
    }
}
