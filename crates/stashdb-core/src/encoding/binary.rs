//! Compact binary delegate built on bincode.

use crate::error::{SerializationError, SerializationResult};
use crate::types::Entry;

use super::traits::{Serializer, FORMAT_VERSION};

/// Binary serialization delegate.
///
/// Layout: one format-version byte followed by the bincode (standard config)
/// encoding of the entry's identifier and payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeSerializer;

impl BincodeSerializer {
    /// Create a new bincode delegate.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Serializer for BincodeSerializer {
    fn serialize(&self, entry: &Entry) -> SerializationResult<Vec<u8>> {
        let body = bincode::serde::encode_to_vec(entry, bincode::config::standard())
            .map_err(|e| SerializationError::encode(e.to_string()))?;

        let mut bytes = Vec::with_capacity(1 + body.len());
        bytes.push(FORMAT_VERSION);
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    fn deserialize(&self, bytes: &[u8]) -> SerializationResult<Entry> {
        let (&version, body) = bytes.split_first().ok_or(SerializationError::Empty)?;
        if version != FORMAT_VERSION {
            return Err(SerializationError::UnsupportedVersion(version));
        }

        let (entry, read): (Entry, usize) =
            bincode::serde::decode_from_slice(body, bincode::config::standard())
                .map_err(|e| SerializationError::decode(e.to_string()))?;

        if read != body.len() {
            return Err(SerializationError::decode(format!(
                "{} trailing bytes after entry",
                body.len() - read
            )));
        }

        Ok(entry)
    }
}
