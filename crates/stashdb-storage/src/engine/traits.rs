//! Core storage engine traits.
//!
//! This module defines the fundamental traits for storage backends:
//!
//! - [`StorageEngine`] - The main entry point for storage operations
//! - [`Transaction`] - ACID transaction support with read/write operations
//!
//! Transactions are owned values rather than borrows of the engine, so a
//! caller can keep one open across calls (for example, as the outermost
//! level of a nested transaction stack).

use std::sync::Arc;

use super::StorageError;

/// A row returned by [`Transaction::scan`]: the key, and the value when requested.
pub type ScanEntry = (Vec<u8>, Option<Vec<u8>>);

/// A storage engine that provides transactional key-value operations.
///
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use stashdb_storage::{StorageEngine, Transaction};
///
/// fn example<E: StorageEngine>(engine: &E) -> Result<(), StorageError> {
///     // Write transaction
///     let mut tx = engine.begin_write()?;
///     tx.put("objects", b"key", b"value")?;
///     tx.commit()?;
///
///     // Read transaction
///     let tx = engine.begin_read()?;
///     let value = tx.get("objects", b"key")?;
///     Ok(())
/// }
/// ```
pub trait StorageEngine: Send + Sync {
    /// The transaction type for this engine.
    type Transaction: Transaction + Send;

    /// Begin a read-only transaction.
    ///
    /// Read transactions provide a consistent snapshot of the database.
    /// Multiple read transactions can run concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the transaction cannot be started.
    fn begin_read(&self) -> Result<Self::Transaction, StorageError>;

    /// Begin a read-write transaction.
    ///
    /// Write transactions are serialized: a second call blocks until the
    /// first write transaction is committed or rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the transaction cannot be started.
    fn begin_write(&self) -> Result<Self::Transaction, StorageError>;

    /// Flush any buffered data to durable storage.
    ///
    /// The default implementation does nothing, as most backends handle
    /// durability on commit.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the flush fails.
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// A transaction that provides ACID key-value operations over named tables.
///
/// Write transactions must be explicitly committed; dropping one without
/// committing rolls its changes back. Reading a table that was never created
/// behaves like reading an empty table.
pub trait Transaction {
    /// Get a value by key from a table.
    ///
    /// Returns `Ok(Some(value))` if the key exists, `Ok(None)` if it doesn't.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to read.
    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Check whether a key exists in a table without copying its value.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to read.
    fn contains(&self, table: &str, key: &[u8]) -> Result<bool, StorageError> {
        Ok(self.get(table, key)?.is_some())
    }

    /// Put a key-value pair into a table, replacing any existing value.
    ///
    /// Returns the previous value, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or if this is a read-only transaction.
    fn put(
        &mut self,
        table: &str,
        key: &[u8],
        value: &[u8],
    ) -> Result<Option<Vec<u8>>, StorageError>;

    /// Put a key-value pair only if the key is absent.
    ///
    /// Returns `Ok(true)` if the pair was written and `Ok(false)` if the key
    /// already existed, in which case the table is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or if this is a read-only transaction.
    fn put_new(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<bool, StorageError>;

    /// Delete a key from a table.
    ///
    /// Returns the removed value, or `None` if the key didn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails or if this is a read-only transaction.
    fn delete(&mut self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Remove every row of a table, returning the number of rows removed.
    ///
    /// The table itself stays available for further writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails or if this is a read-only transaction.
    fn clear(&mut self, table: &str) -> Result<u64, StorageError>;

    /// Fetch up to `limit` rows in key order, starting strictly after `after`
    /// (or at the first key when `after` is `None`).
    ///
    /// Values are only copied when `with_values` is set. A batch shorter than
    /// `limit` means the table has no further rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to read.
    fn scan(
        &self,
        table: &str,
        after: Option<&[u8]>,
        limit: usize,
        with_values: bool,
    ) -> Result<Vec<ScanEntry>, StorageError>;

    /// Create a table if it does not already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails or if this is a read-only transaction.
    fn create_table(&mut self, table: &str) -> Result<(), StorageError>;

    /// Check whether a table exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to read its table catalog.
    fn has_table(&self, table: &str) -> Result<bool, StorageError>;

    /// Commit the transaction, making all changes durable.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the commit fails.
    fn commit(self) -> Result<(), StorageError>;

    /// Rollback the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the rollback fails.
    fn rollback(self) -> Result<(), StorageError>;

    /// Check if this is a read-only transaction.
    fn is_read_only(&self) -> bool;
}

/// Implement `StorageEngine` for `Arc<E>` to allow shared ownership of engines.
impl<E: StorageEngine> StorageEngine for Arc<E> {
    type Transaction = E::Transaction;

    fn begin_read(&self) -> Result<Self::Transaction, StorageError> {
        (**self).begin_read()
    }

    fn begin_write(&self) -> Result<Self::Transaction, StorageError> {
        (**self).begin_write()
    }

    fn flush(&self) -> Result<(), StorageError> {
        (**self).flush()
    }
}
