//! The unit of storage: an identifier and an opaque payload.
//!
//! # Example
//!
//! ```
//! use stashdb_core::types::Entry;
//!
//! let entry = Entry::new("doc:1", b"first draft".to_vec());
//! assert!(!entry.has_prev());
//!
//! // An update of an already stored entry may overwrite it.
//! let update = entry.revise(b"second draft".to_vec());
//! assert!(update.has_prev());
//! assert_eq!(update.id().as_str(), "doc:1");
//! ```

use serde::{Deserialize, Serialize};

use super::EntryId;

/// An identifier/payload pair.
///
/// The payload is never interpreted by the storage layer. `has_prev` tells
/// the backend whether this entry replaces a previously stored version
/// (overwrite allowed) or is a new object (must not overwrite). It is
/// supplied by the caller on every insert and is not part of the serialized
/// form, so decoded entries always report `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    id: EntryId,
    data: Vec<u8>,
    #[serde(skip)]
    has_prev: bool,
}

impl Entry {
    /// Create a new entry that has no prior version.
    #[must_use]
    pub fn new(id: impl Into<EntryId>, data: impl Into<Vec<u8>>) -> Self {
        Self { id: id.into(), data: data.into(), has_prev: false }
    }

    /// Create the next version of this entry with a new payload.
    ///
    /// The returned entry has `has_prev` set, so inserting it overwrites the
    /// stored version.
    #[must_use]
    pub fn revise(&self, data: impl Into<Vec<u8>>) -> Self {
        Self { id: self.id.clone(), data: data.into(), has_prev: true }
    }

    /// Set whether this entry replaces a previously stored version.
    #[must_use]
    pub const fn with_prev(mut self, has_prev: bool) -> Self {
        self.has_prev = has_prev;
        self
    }

    /// The entry identifier.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> &EntryId {
        &self.id
    }

    /// The opaque payload.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether this entry is an update of a stored version.
    #[inline]
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.has_prev
    }
}
