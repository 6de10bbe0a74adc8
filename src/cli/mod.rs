pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "binscope",
    version,
    about = "Link antiSMASH BGCs to metagenomic bins and build blobplot tables",
    long_about = "binscope maps antiSMASH candidate clusters onto the bins (MAGs) holding their \
                  contigs, attaches GTDB-tk taxonomy, and writes GC/coverage blobplot data for \
                  dereplicated genomes."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE", global = true, env = crate::core::config::CONFIG_ENV)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map antiSMASH candidate clusters to bins and taxonomy
    Bgc(commands::bgc::BgcArgs),

    /// Build GC/coverage tables and scatter plots for binned contigs
    Blobplot(commands::blobplot::BlobplotArgs),
}

/// How the run summary is printed to stdout
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
