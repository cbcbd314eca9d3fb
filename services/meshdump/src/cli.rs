//! Command-line arguments and their layering over the configuration file.

use anyhow::{Context, Result};
use clap::Parser;
use meshdump_core::{Config, FormatterKind, LogFormat};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "meshdump")]
#[command(author, version, about = "Mesh radio packets dumper", long_about = None)]
pub struct Cli {
    /// Transport capture to replay (JSON lines), or - for stdin
    #[arg(short = 'c', long)]
    pub capture: Option<PathBuf>,

    /// Include packets sent by the local node
    #[arg(short = 'l', long)]
    pub include_local: bool,

    /// Record formatter: raw or csv
    #[arg(short = 'f', long)]
    pub formatter: Option<FormatterKind>,

    /// Write records to this file instead of stdout
    #[arg(short = 'o', long)]
    pub output_file: Option<PathBuf>,

    /// Local node id used to filter own packets, e.g. !a1b2c3d4
    #[arg(long)]
    pub local_id: Option<String>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Diagnostic log format: text or json
    #[arg(long)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Configuration file (or defaults) with command-line values applied on
    /// top.
    pub fn load_config(&self) -> Result<Config> {
        let base = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Config::default_config(),
        };
        let config = self.apply(base);
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    fn apply(&self, mut config: Config) -> Config {
        if let Some(capture) = &self.capture {
            config.listener.capture = Some(capture.clone());
        }
        config.listener.include_local |= self.include_local;
        if let Some(local_id) = &self.local_id {
            config.listener.local_id = Some(local_id.clone());
        }
        if let Some(formatter) = self.formatter {
            config.output.formatter = formatter;
        }
        if let Some(output_file) = &self.output_file {
            config.output.output_file = Some(output_file.clone());
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        config
    }
}
