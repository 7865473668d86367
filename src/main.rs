//! anka-cache - Buildkite build-cache manager for Anka VM agents
//!
//! CLI entry point that dispatches to the restore or save flow.

use anka_cache::cli::{commands, CacheCommand, Cli};
use anka_cache::config;
use anka_cache::error::CacheResult;
use anka_cache::staging::Staging;
use anka_cache::storage::S3CliStore;
use anka_cache::template::KeyEvaluator;
use anka_cache::vm::AnkaVm;
use clap::error::ErrorKind;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Argument errors exit 1 like every other failure; help and version
    // are the only parse outcomes that exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CacheResult<()> {
    // Initialize logging: 0 = warn (progress lines only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("anka_cache=warn"),
        1 => EnvFilter::new("anka_cache=info"),
        _ => EnvFilter::new("anka_cache=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Config shape problems are fatal before any cache operation begins
    let entries = config::load(&cli.config_file).await?;

    let evaluator = KeyEvaluator::from_env();
    let store = S3CliStore::new(&cli.s3_bucket, &cli.s3_prefix);
    let vm = AnkaVm::new(&cli.anka_command);
    let staging = Staging::current_dir();

    match cli.command {
        CacheCommand::RestoreCaches => {
            commands::restore(&entries, &evaluator, &store, &vm, &staging).await
        }
        CacheCommand::SaveCaches => {
            commands::save(&entries, &evaluator, &store, &vm, &staging).await
        }
    }
}
