//! Error types for payload decoding.
//!
//! None of these errors escape normalization: the normalizer logs them and
//! leaves the packet's decoded payload empty.

use thiserror::Error;

/// Errors that can occur while decoding a single payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload bytes do not match the port's protobuf schema
    #[error("Protobuf decode error: {0}")]
    Protobuf(String),

    /// Text payload is not valid UTF-8
    #[error("Invalid text payload: {0}")]
    InvalidText(#[from] std::str::Utf8Error),

    /// A field the decoder needs was not supplied by the transport
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// No decoder exists for the packet's port
    #[error("Unsupported port: {0}")]
    UnsupportedPort(String),
}

impl DecodeError {
    /// Whether the error reflects bad input bytes rather than a port this
    /// build simply does not decode.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::UnsupportedPort(_))
    }
}

/// Result type for payload decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;
