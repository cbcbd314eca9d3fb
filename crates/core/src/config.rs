//! Configuration management for meshdump.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Maximum size of an exported file before it is rotated.
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Number of rotated files kept next to the active export file.
pub const ROTATED_FILE_COUNT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listener: ListenerConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Capture file to replay, `-` for stdin.
    pub capture: Option<PathBuf>,
    /// Emit packets originating from the local node.
    pub include_local: bool,
    /// Local node identifier, overriding the one announced by the capture.
    pub local_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub formatter: FormatterKind,
    /// Write records to this file instead of stdout.
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

/// Record rendering selected for the export pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    /// ` | `-separated text line
    #[default]
    Raw,
    /// Comma-separated values with a header row
    Csv,
}

impl FromStr for FormatterKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "csv" => Ok(Self::Csv),
            other => Err(CoreError::Config(format!(
                "unknown formatter `{other}`, expected raw or csv"
            ))),
        }
    }
}

impl fmt::Display for FormatterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => f.write_str("raw"),
            Self::Csv => f.write_str("csv"),
        }
    }
}

/// Diagnostic log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CoreError::Config(format!(
                "unknown log format `{other}`, expected text or json"
            ))),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            listener: ListenerConfig {
                capture: None,
                include_local: false,
                local_id: None,
            },
            output: OutputConfig {
                formatter: FormatterKind::Raw,
                output_file: None,
            },
            logging: LoggingConfig {
                format: LogFormat::Text,
            },
        }
    }

    /// Reject values the listener cannot act on.
    pub fn validate(&self) -> Result<()> {
        if let Some(id) = &self.listener.local_id {
            if id.trim().is_empty() {
                return Err(CoreError::Config("listener.local_id is empty".into()));
            }
        }
        if let Some(path) = &self.output.output_file {
            if path.as_os_str().is_empty() {
                return Err(CoreError::Config("output.output_file is empty".into()));
            }
        }
        Ok(())
    }
}
