//! meshdump: mesh radio packets dumper.
//!
//! Replays transport events recorded as JSON lines, normalizes every packet
//! and exports one record per line to stdout or a rotated file.

use anyhow::Result;
use clap::Parser;
use meshdump_core::logging;
use tracing::info;

mod capture;
mod cli;
mod listener;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    logging::init_with(config.logging.format);

    info!(version = env!("CARGO_PKG_VERSION"), "meshdump starting");
    listener::run(config).await
}
