//! Redb transaction implementation.
//!
//! This module provides the `RedbTransaction` type which implements the
//! `Transaction` trait for both read-only and read-write transactions.
//!
//! # Batched Scans
//!
//! [`Transaction::scan`] never materializes a whole table. It returns at most
//! `limit` rows starting strictly after a given key, so a caller streams a
//! table by repeatedly asking for the batch after the last key it has seen.

use redb::{ReadTransaction, ReadableTable, ReadableTableMetadata, TableHandle, WriteTransaction};

use crate::engine::{ScanEntry, StorageError, Transaction};

use super::tables::{classify_storage, classify_table, table_definition, Bytes};

/// A transaction for the Redb storage engine.
///
/// This type wraps both read-only and read-write Redb transactions,
/// providing a unified interface through the `Transaction` trait.
#[allow(clippy::large_enum_variant)]
pub enum RedbTransaction {
    /// A read-only transaction.
    Read(ReadTransaction),
    /// A read-write transaction.
    Write(WriteTransaction),
}

impl RedbTransaction {
    /// Create a new read-only transaction.
    pub const fn new_read(tx: ReadTransaction) -> Self {
        Self::Read(tx)
    }

    /// Create a new read-write transaction.
    pub const fn new_write(tx: WriteTransaction) -> Self {
        Self::Write(tx)
    }

    fn writer(&mut self) -> Result<&mut WriteTransaction, StorageError> {
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write(tx) => Ok(tx),
        }
    }
}

impl Transaction for RedbTransaction {
    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let def = table_definition(table);

        match self {
            Self::Read(tx) => match tx.open_table(def) {
                Ok(t) => read_value(&t, key),
                // No table means no data, which is not an error
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
                Err(e) => Err(classify_table(e)),
            },
            Self::Write(tx) => {
                let t = tx.open_table(def).map_err(classify_table)?;
                read_value(&t, key)
            }
        }
    }

    fn put(
        &mut self,
        table: &str,
        key: &[u8],
        value: &[u8],
    ) -> Result<Option<Vec<u8>>, StorageError> {
        let tx = self.writer()?;
        let mut t = tx.open_table(table_definition(table)).map_err(classify_table)?;
        let previous = t.insert(key, value).map_err(classify_storage)?.map(|v| v.value().to_vec());
        Ok(previous)
    }

    fn put_new(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<bool, StorageError> {
        let tx = self.writer()?;
        let mut t = tx.open_table(table_definition(table)).map_err(classify_table)?;

        let exists = t.get(key).map_err(classify_storage)?.is_some();
        if exists {
            return Ok(false);
        }

        t.insert(key, value).map_err(classify_storage)?;
        Ok(true)
    }

    fn delete(&mut self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let tx = self.writer()?;
        let mut t = tx.open_table(table_definition(table)).map_err(classify_table)?;
        let removed = t.remove(key).map_err(classify_storage)?.map(|v| v.value().to_vec());
        Ok(removed)
    }

    fn clear(&mut self, table: &str) -> Result<u64, StorageError> {
        let tx = self.writer()?;
        let def = table_definition(table);

        let count = {
            let t = tx.open_table(def).map_err(classify_table)?;
            t.len().map_err(classify_storage)?
        };

        // Dropping and recreating the table is cheaper than removing row by row.
        tx.delete_table(def).map_err(classify_table)?;
        tx.open_table(def).map_err(classify_table)?;

        Ok(count)
    }

    fn scan(
        &self,
        table: &str,
        after: Option<&[u8]>,
        limit: usize,
        with_values: bool,
    ) -> Result<Vec<ScanEntry>, StorageError> {
        let def = table_definition(table);

        match self {
            Self::Read(tx) => match tx.open_table(def) {
                Ok(t) => scan_batch(&t, after, limit, with_values),
                // Table doesn't exist yet, return empty result (not an error)
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(Vec::new()),
                Err(e) => Err(classify_table(e)),
            },
            Self::Write(tx) => {
                let t = tx.open_table(def).map_err(classify_table)?;
                scan_batch(&t, after, limit, with_values)
            }
        }
    }

    fn create_table(&mut self, table: &str) -> Result<(), StorageError> {
        let tx = self.writer()?;
        tx.open_table(table_definition(table)).map_err(classify_table)?;
        Ok(())
    }

    fn has_table(&self, table: &str) -> Result<bool, StorageError> {
        match self {
            Self::Read(tx) => match tx.open_table(table_definition(table)) {
                Ok(_) => Ok(true),
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(false),
                Err(e) => Err(classify_table(e)),
            },
            Self::Write(tx) => {
                // Opening a table in a write transaction creates it, so consult
                // the catalog instead.
                let mut tables = tx.list_tables().map_err(classify_storage)?;
                Ok(tables.any(|handle| handle.name() == table))
            }
        }
    }

    fn commit(self) -> Result<(), StorageError> {
        match self {
            // Read transactions don't need explicit commit
            Self::Read(_) => Ok(()),
            Self::Write(tx) => tx.commit().map_err(|e| StorageError::Transaction(e.to_string())),
        }
    }

    fn rollback(self) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Ok(()),
            Self::Write(tx) => tx.abort().map_err(|e| StorageError::Transaction(e.to_string())),
        }
    }

    fn is_read_only(&self) -> bool {
        matches!(self, Self::Read(_))
    }
}

fn read_value<T>(table: &T, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>
where
    T: ReadableTable<Bytes, Bytes>,
{
    Ok(table.get(key).map_err(classify_storage)?.map(|v| v.value().to_vec()))
}

/// Fetch up to `limit` rows strictly after `after`.
///
/// The range starts at `after` inclusive, so the row equal to it is skipped.
fn scan_batch<T>(
    table: &T,
    after: Option<&[u8]>,
    limit: usize,
    with_values: bool,
) -> Result<Vec<ScanEntry>, StorageError>
where
    T: ReadableTable<Bytes, Bytes>,
{
    let range = match after {
        Some(start) => table.range(start..),
        None => table.iter(),
    }
    .map_err(classify_storage)?;

    let mut rows = Vec::with_capacity(limit.min(1024));
    for item in range {
        if rows.len() >= limit {
            break;
        }

        let (k, v) = item.map_err(classify_storage)?;
        let key = k.value();
        if after == Some(key) {
            continue;
        }

        rows.push((key.to_vec(), with_values.then(|| v.value().to_vec())));
    }

    Ok(rows)
}
