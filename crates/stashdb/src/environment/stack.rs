//! The nested transaction stack.
//!
//! Only the outermost level owns an engine write transaction. Each nested
//! level is a savepoint: it records, for every row it changes, the value the
//! row had before. Committing a level hands its journal to the parent;
//! rolling it back writes the recorded values back in reverse order.
//!
//! The outermost level needs no journal since the engine can abort it, so
//! writes are only journaled while at least one savepoint is open.
//!
//! A savepoint whose undo fails part way is left half restored. The stack
//! is then abandoned: the engine transaction is aborted and every level is
//! dropped, so none of it can be committed.

use stashdb_storage::{StorageResult, Transaction};
use tracing::warn;

/// The prior state of one row touched inside a savepoint.
#[derive(Debug)]
struct Undo {
    table: String,
    key: Vec<u8>,
    previous: Option<Vec<u8>>,
}

/// One level of the stack.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) id: u64,
    journal: Vec<Undo>,
}

/// The active transactions of one thread, outermost first.
pub(crate) struct TxnStack<T> {
    root: Option<T>,
    frames: Vec<Frame>,
}

impl<T> Default for TxnStack<T> {
    fn default() -> Self {
        Self { root: None, frames: Vec::new() }
    }
}

impl<T: Transaction> TxnStack<T> {
    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Position of a transaction in the stack, if it is active.
    pub(crate) fn position(&self, id: u64) -> Option<usize> {
        self.frames.iter().position(|frame| frame.id == id)
    }

    pub(crate) fn innermost(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub(crate) fn root_id(&self) -> Option<u64> {
        self.frames.first().map(|frame| frame.id)
    }

    /// The engine transaction, provided the outermost level is still `root_id`.
    pub(crate) fn root_txn(&self, root_id: u64) -> Option<&T> {
        match self.root_id() {
            Some(id) if id == root_id => self.root.as_ref(),
            _ => None,
        }
    }

    /// The engine transaction of the active stack.
    pub(crate) fn active_txn(&self) -> Option<&T> {
        self.root.as_ref()
    }

    pub(crate) fn push_root(&mut self, id: u64, txn: T) {
        self.root = Some(txn);
        self.frames.push(Frame { id, journal: Vec::new() });
    }

    pub(crate) fn push_savepoint(&mut self, id: u64) {
        self.frames.push(Frame { id, journal: Vec::new() });
    }

    /// Pop the outermost level, returning its engine transaction.
    pub(crate) fn pop_root(&mut self) -> Option<T> {
        self.frames.pop();
        self.root.take()
    }

    /// Pop a savepoint and merge its journal into the parent.
    pub(crate) fn release_savepoint(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        // The outermost level is undone by the engine, so it keeps no journal.
        if self.frames.len() > 1 {
            if let Some(parent) = self.frames.last_mut() {
                parent.journal.extend(frame.journal);
            }
        }
    }

    /// Pop a savepoint and undo every write it made.
    pub(crate) fn rollback_savepoint(&mut self) -> StorageResult<usize> {
        let Some(frame) = self.frames.pop() else {
            return Ok(0);
        };
        let Some(txn) = self.root.as_mut() else {
            return Ok(0);
        };

        let undone = frame.journal.len();
        if let Err(e) = replay(txn, frame.journal) {
            self.abandon();
            return Err(e);
        }
        Ok(undone)
    }

    /// Abort the engine transaction and drop every level.
    fn abandon(&mut self) {
        self.frames.clear();
        if let Some(txn) = self.root.take() {
            if let Err(e) = txn.rollback() {
                warn!(error = %e, "failed to abort abandoned transaction");
            }
        }
    }

    /// A writer over the active engine transaction, journaling into the innermost savepoint.
    pub(crate) fn writer(&mut self) -> Option<Writer<'_, T>> {
        let journaled = self.frames.len() > 1;
        let txn = self.root.as_mut()?;
        let journal = if journaled { self.frames.last_mut().map(|f| &mut f.journal) } else { None };
        Some(Writer { txn, journal })
    }
}

/// Write the recorded values back, newest first.
fn replay<T: Transaction>(txn: &mut T, journal: Vec<Undo>) -> StorageResult<()> {
    for undo in journal.into_iter().rev() {
        match undo.previous {
            Some(value) => {
                txn.put(&undo.table, &undo.key, &value)?;
            }
            None => {
                txn.delete(&undo.table, &undo.key)?;
            }
        }
    }
    Ok(())
}

/// Write access to an engine transaction that records prior row values.
pub(crate) struct Writer<'a, T> {
    txn: &'a mut T,
    journal: Option<&'a mut Vec<Undo>>,
}

impl<'a, T: Transaction> Writer<'a, T> {
    /// A writer without a journal, for autocommit transactions.
    pub(crate) fn unjournaled(txn: &'a mut T) -> Self {
        Self { txn, journal: None }
    }

    fn record(&mut self, table: &str, key: &[u8], previous: Option<Vec<u8>>) {
        if let Some(journal) = self.journal.as_deref_mut() {
            journal.push(Undo { table: table.to_owned(), key: key.to_vec(), previous });
        }
    }

    pub(crate) fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let previous = self.txn.put(table, key, value)?;
        self.record(table, key, previous);
        Ok(())
    }

    /// Write only when `key` is absent. Returns `false` if it was present.
    pub(crate) fn put_new(&mut self, table: &str, key: &[u8], value: &[u8]) -> StorageResult<bool> {
        let written = self.txn.put_new(table, key, value)?;
        if written {
            self.record(table, key, None);
        }
        Ok(written)
    }

    pub(crate) fn delete(&mut self, table: &str, key: &[u8]) -> StorageResult<bool> {
        let removed = self.txn.delete(table, key)?;
        let existed = removed.is_some();
        if existed {
            self.record(table, key, removed);
        }
        Ok(existed)
    }

    /// Remove every row of `table`, returning the count removed.
    pub(crate) fn clear(&mut self, table: &str) -> StorageResult<u64> {
        if self.journal.is_none() {
            return self.txn.clear(table);
        }

        // Inside a savepoint every removed row has to be journaled.
        let mut removed = 0;
        loop {
            let rows = self.txn.scan(table, None, CLEAR_BATCH, true)?;
            if rows.is_empty() {
                return Ok(removed);
            }
            for (key, _) in rows {
                if self.delete(table, &key)? {
                    removed += 1;
                }
            }
        }
    }

    pub(crate) fn create_table(&mut self, table: &str) -> StorageResult<()> {
        self.txn.create_table(table)
    }
}

const CLEAR_BATCH: usize = 1000;
