//! Redb table definitions and error classification.
//!
//! Every logical table is a real redb table mapping raw byte keys to raw
//! byte values. Redb errors are classified here so that each engine failure
//! surfaces as a specific [`StorageError`] variant.

use redb::TableDefinition;

use crate::engine::StorageError;

/// Key and value type of every table: raw bytes.
pub type Bytes = &'static [u8];

/// Build the definition for a named table.
#[must_use]
pub fn table_definition(name: &str) -> TableDefinition<'_, Bytes, Bytes> {
    TableDefinition::new(name)
}

/// Classify a redb storage error.
pub(crate) fn classify_storage(err: redb::StorageError) -> StorageError {
    match err {
        redb::StorageError::Io(e) => StorageError::Io(e),
        other => StorageError::Internal(other.to_string()),
    }
}

/// Classify a redb table error.
pub(crate) fn classify_table(err: redb::TableError) -> StorageError {
    match err {
        redb::TableError::TableDoesNotExist(name) => StorageError::TableNotFound(name),
        redb::TableError::Storage(e) => classify_storage(e),
        other => StorageError::Internal(other.to_string()),
    }
}
