//! An in-memory engine whose writes can be made to fail.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use stashdb_storage::{ScanEntry, StorageEngine, StorageResult, Transaction};

#[derive(Debug, Default)]
struct Flags {
    failing: AtomicBool,
    aborted: AtomicUsize,
}

/// Engine handing out independent in-memory transactions that share failure flags.
#[derive(Debug, Default)]
pub(crate) struct FlakyEngine {
    flags: Arc<Flags>,
}

impl FlakyEngine {
    /// Make every later write fail with an I/O error.
    pub(crate) fn fail_writes(&self) {
        self.flags.failing.store(true, Ordering::SeqCst);
    }

    /// Number of write transactions rolled back so far.
    pub(crate) fn aborted(&self) -> usize {
        self.flags.aborted.load(Ordering::SeqCst)
    }

    fn begin(&self) -> FlakyTxn {
        FlakyTxn { rows: BTreeMap::new(), flags: Arc::clone(&self.flags) }
    }
}

impl StorageEngine for FlakyEngine {
    type Transaction = FlakyTxn;

    fn begin_read(&self) -> StorageResult<FlakyTxn> {
        Ok(self.begin())
    }

    fn begin_write(&self) -> StorageResult<FlakyTxn> {
        Ok(self.begin())
    }
}

pub(crate) struct FlakyTxn {
    rows: BTreeMap<(String, Vec<u8>), Vec<u8>>,
    flags: Arc<Flags>,
}

impl FlakyTxn {
    fn check(&self) -> StorageResult<()> {
        if self.flags.failing.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("write refused").into());
        }
        Ok(())
    }

    fn row(table: &str, key: &[u8]) -> (String, Vec<u8>) {
        (table.to_owned(), key.to_vec())
    }
}

impl Transaction for FlakyTxn {
    fn get(&self, table: &str, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.rows.get(&Self::row(table, key)).cloned())
    }

    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.check()?;
        Ok(self.rows.insert(Self::row(table, key), value.to_vec()))
    }

    fn put_new(&mut self, table: &str, key: &[u8], value: &[u8]) -> StorageResult<bool> {
        self.check()?;
        let row = Self::row(table, key);
        if self.rows.contains_key(&row) {
            return Ok(false);
        }
        self.rows.insert(row, value.to_vec());
        Ok(true)
    }

    fn delete(&mut self, table: &str, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.check()?;
        Ok(self.rows.remove(&Self::row(table, key)))
    }

    fn clear(&mut self, table: &str) -> StorageResult<u64> {
        self.check()?;
        let before = self.rows.len();
        self.rows.retain(|(t, _), _| t != table);
        Ok((before - self.rows.len()) as u64)
    }

    fn scan(
        &self,
        table: &str,
        after: Option<&[u8]>,
        limit: usize,
        with_values: bool,
    ) -> StorageResult<Vec<ScanEntry>> {
        Ok(self
            .rows
            .iter()
            .filter(|(row, _)| row.0 == table && after.map_or(true, |a| row.1.as_slice() > a))
            .take(limit)
            .map(|((_, key), value)| (key.clone(), with_values.then(|| value.clone())))
            .collect())
    }

    fn create_table(&mut self, _table: &str) -> StorageResult<()> {
        Ok(())
    }

    fn has_table(&self, _table: &str) -> StorageResult<bool> {
        Ok(true)
    }

    fn commit(self) -> StorageResult<()> {
        Ok(())
    }

    fn rollback(self) -> StorageResult<()> {
        self.flags.aborted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_read_only(&self) -> bool {
        false
    }
}
