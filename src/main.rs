//! pollbox - create polls and forms, vote, respond and tally results
//!
//! State is kept in JSON snapshots under the platform data directory.

use anyhow::{Context, Result};
use clap::Parser;
use pollbox::app::{App, Cli};
use pollbox::config::AppConfig;
use pollbox::persistence::FileBlobStore;
use pollbox::state::Workspace;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;

    // Initialize logging
    let default_filter = config
        .log_filter
        .clone()
        .unwrap_or_else(|| "pollbox=info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let data_dir = config.resolve_data_dir()?;
    tracing::debug!(data_dir = %data_dir.display(), "opening workspace");
    let workspace = Workspace::open(FileBlobStore::new(&data_dir), config.prefers_dark_mode())
        .with_context(|| format!("failed to load saved state from {}", data_dir.display()))?;

    let mut app = App::new(workspace);
    app.workspace
        .subscribe(|event| tracing::debug!(?event, "state changed"));

    let output = app.run(cli.command)?;
    print!("{output}");

    app.workspace.flush().context("failed to save state")?;
    Ok(())
}
