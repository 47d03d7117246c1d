use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod config;
mod models;
mod parsers;
mod pipeline;
mod scrapers;
mod utils;

use crate::config::Config;
use crate::pipeline::{run_file, run_jobs, FileJob};

/// Scrape Amazon product pages listed in CSV files into Shopify import CSVs.
#[derive(Debug, Parser)]
#[command(name = "amazon-import", version, about)]
struct Cli {
    /// Input CSV with a "Variant SKU" column, optionally as INPUT=TEMPLATE
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Template CSV for inputs given without their own
    #[arg(short, long, env = "AMAZON_IMPORT_TEMPLATE")]
    template: Option<PathBuf>,

    /// Number of files processed concurrently
    #[arg(short, long)]
    workers: Option<usize>,

    /// Configuration file (defaults to ./amazon_import.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("amazon_import=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting Amazon import at {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    // Load configuration
    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }

    let jobs = cli
        .inputs
        .iter()
        .map(|spec| FileJob::parse(spec, cli.template.as_deref()))
        .collect::<Result<Vec<_>>>()?;

    // Failures are logged inside each file's run span
    if let [job] = jobs.as_slice() {
        if let Ok(output) = run_file(&config, job, 0).await {
            info!("Done, results saved to {}", output.display());
        }
        return Ok(());
    }

    let workers = config.workers;
    let outcomes = run_jobs(Arc::new(config), jobs, workers).await;
    for outcome in &outcomes {
        if let Ok(output) = &outcome.result {
            info!("{} -> {}", outcome.job.input.display(), output.display());
        }
    }

    Ok(())
}
