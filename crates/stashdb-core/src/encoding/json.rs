//! Human-readable delegate built on `serde_json`.

use crate::error::{SerializationError, SerializationResult};
use crate::types::Entry;

use super::traits::Serializer;

/// JSON serialization delegate.
///
/// Larger than [`BincodeSerializer`](super::BincodeSerializer) but readable
/// with ordinary tools, which helps when inspecting a store by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    /// Create a new JSON delegate.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, entry: &Entry) -> SerializationResult<Vec<u8>> {
        serde_json::to_vec(entry).map_err(|e| SerializationError::encode(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> SerializationResult<Entry> {
        if bytes.is_empty() {
            return Err(SerializationError::Empty);
        }
        serde_json::from_slice(bytes).map_err(|e| SerializationError::decode(e.to_string()))
    }
}
