//! CLI entry point for elyse

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "elyse")]
#[command(version)]
#[command(about = "A simple static website generator", long_about = None)]
struct Cli {
    /// Source directory
    #[arg(default_value = ".")]
    source: PathBuf,

    /// Destination directory (emptied before generating)
    #[arg(default_value = "build")]
    destination: PathBuf,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "elyse=debug,info"
    } else {
        "elyse=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let elyse = elyse::Elyse::new(&cli.source, &cli.destination)?;
    tracing::info!(
        "Generating {:?} into {:?}",
        elyse.source_dir,
        elyse.dest_dir
    );

    let summary = elyse.generate()?;
    println!(
        "Generated {} posts, {} pages and {} tag pages ({} skipped)",
        summary.posts, summary.pages, summary.tags, summary.skipped
    );

    Ok(())
}
