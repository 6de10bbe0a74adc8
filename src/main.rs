use binscope::cli::{Cli, Commands};
use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins, then BINSCOPE_LOG, then the -v count
    let log_level = std::env::var("BINSCOPE_LOG").unwrap_or_else(|_| {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
        .to_string()
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<binscope::BinscopeError>() {
            Some(binscope::BinscopeError::Config(_)) => 2,
            Some(binscope::BinscopeError::Io(_)) => 3,
            Some(binscope::BinscopeError::Parse(_))
            | Some(binscope::BinscopeError::MissingField(_))
            | Some(binscope::BinscopeError::Csv(_)) => 4,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = binscope::core::config::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Bgc(args) => binscope::cli::commands::bgc::run(args, &config),
        Commands::Blobplot(args) => binscope::cli::commands::blobplot::run(args, &config),
    }
}
