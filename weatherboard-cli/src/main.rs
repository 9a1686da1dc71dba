//! Binary crate for the `weatherboard` terminal dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and the dashboard loop
//! - Rendering view models as terminal text

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod render;

const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the rendered dashboard on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
