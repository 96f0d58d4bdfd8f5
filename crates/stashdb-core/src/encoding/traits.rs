//! The serialization delegate interface.

use crate::error::SerializationResult;
use crate::types::Entry;

/// Turns entries into opaque payload bytes and back.
///
/// The storage backend calls into a `Serializer` on every write and on every
/// decoded read; it never inspects the bytes itself. Implementations must be
/// deterministic enough that `deserialize(serialize(e))` yields an entry equal
/// to `e` (ignoring the caller-supplied `has_prev` flag).
pub trait Serializer: Send + Sync {
    /// Encode an entry to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::Encode`](crate::SerializationError::Encode)
    /// if the entry cannot be represented.
    fn serialize(&self, entry: &Entry) -> SerializationResult<Vec<u8>>;

    /// Decode an entry from bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`SerializationError`](crate::SerializationError) if the bytes
    /// are malformed, truncated or written with an unknown format version.
    fn deserialize(&self, bytes: &[u8]) -> SerializationResult<Entry>;
}

impl<S: Serializer + ?Sized> Serializer for std::sync::Arc<S> {
    fn serialize(&self, entry: &Entry) -> SerializationResult<Vec<u8>> {
        (**self).serialize(entry)
    }

    fn deserialize(&self, bytes: &[u8]) -> SerializationResult<Entry> {
        (**self).deserialize(bytes)
    }
}

/// Format version for payloads written by [`BincodeSerializer`](super::BincodeSerializer).
///
/// The version byte leads every payload so that the layout can evolve without
/// misreading older records.
pub const FORMAT_VERSION: u8 = 1;
