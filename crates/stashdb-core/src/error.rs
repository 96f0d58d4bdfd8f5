//! Error types for the core crate.

use thiserror::Error;

/// Errors raised by a serialization delegate.
///
/// A failed encode never reaches storage and a failed decode leaves the
/// stored record untouched.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// The entry could not be encoded.
    #[error("failed to encode entry: {0}")]
    Encode(String),

    /// The payload could not be decoded.
    #[error("failed to decode entry: {0}")]
    Decode(String),

    /// The payload was written with a format version this build cannot read.
    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u8),

    /// The payload was empty.
    #[error("empty payload")]
    Empty,

    /// A stored key is not a valid UTF-8 identifier.
    #[error("invalid entry id: {0}")]
    InvalidId(String),
}

impl SerializationError {
    /// Creates an encode error.
    #[must_use]
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Result type alias for serialization operations.
pub type SerializationResult<T> = Result<T, SerializationError>;
