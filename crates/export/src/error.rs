//! Export error types

use thiserror::Error;

/// Errors raised while writing formatted records.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Output file or stream could not be written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown formatter or exporter name
    #[error("Invalid kind: {0}")]
    InvalidKind(String),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
