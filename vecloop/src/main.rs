//! # vecloop
//!
//! Command line entry point: `vecloop extract` regenerates the loop feature
//! file, `vecloop explore` runs random episodes against an environment.

mod app;
mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = cli::Cli::parse();
    app::run(cli)
}
