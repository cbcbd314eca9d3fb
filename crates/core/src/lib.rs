//! Core functionality shared across the meshdump workspace.
//!
//! This crate provides the configuration model, the error type and the
//! logging bootstrap used by the decoder, exporter and service crates.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, FormatterKind, LogFormat, MAX_FILE_BYTES, ROTATED_FILE_COUNT};
pub use error::{CoreError, Result};
