//! task-tracker
//!
//! Command-line front end for the JSON-backed task store.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::process::ExitCode;
use task_tracker::cli::{self, Cli};
use task_tracker::config::ConfigLoader;
use task_tracker::service::TaskService;
use task_tracker::store::RecordStore;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log, cli.verbose) {
        eprintln!("task-tracker: error: failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            warn!(error = %format!("{:#}", e), "Command failed");
            eprintln!("task-tracker: error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging based on the --log option.
///
/// `RUST_LOG` takes precedence over the level implied by --verbose.
fn init_logging(target: &str, verbose: bool) -> Result<()> {
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }))
    };

    match target {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)
                .with_context(|| format!("Failed to open log file {}", filename))?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut loader = match &cli.config {
        Some(path) => ConfigLoader::load_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(path) = loader.config_path() {
        debug!(config = %path.display(), "Using config file");
    }

    // CLI flags win over every config tier
    if let Some(store_path) = &cli.store {
        loader.config_mut().store.path = store_path.clone();
    }
    let config = loader.into_config();

    let store = RecordStore::open_with(config.store_path(), config.store.options())
        .with_context(|| format!("Failed to open task store {}", config.store_path().display()))?;
    let service = TaskService::new(store);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::run(&service, cli.command, config.display.format, &mut out)
}
