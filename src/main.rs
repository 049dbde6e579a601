use anyhow::{Context, Result};
use clap::Parser;
use mimalloc::MiMalloc;
use nmdquant::cli::Args;
use nmdquant::{Config, pipeline};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from(args);
    let summary = pipeline::run(&config)
        .with_context(|| format!("quantifying introns from {}", config.gtf.display()))?;

    tracing::info!(
        introns = summary.introns,
        samples = summary.samples.len(),
        rows = summary.rows_written,
        "nmdquant: processing complete"
    );
    Ok(())
}
