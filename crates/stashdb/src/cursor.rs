//! Lazy, batched enumeration of a database.
//!
//! A [`CursorStream`] walks a table in the engine's key order without
//! loading it whole: it holds at most one batch of rows and fetches the next
//! batch strictly after the last key it yielded.
//!
//! # Example
//!
//! ```ignore
//! let db = env.open_database("objects", DatabaseKind::BTree)?;
//! for record in env.cursor(&db, true, false)? {
//!     let key = record?.key;
//! }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use stashdb_core::TransactionError;
use stashdb_storage::{ScanEntry, Transaction};
use tracing::trace;

use crate::environment::stack::TxnStack;
use crate::error::{Error, Result};

/// Which parts of each row a cursor yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Keys only.
    Keys,
    /// Values only.
    Values,
    /// Keys and values.
    Both,
}

impl Projection {
    /// Build a projection from the two wanted flags. Wanting neither means keys.
    #[must_use]
    pub const fn from_flags(want_keys: bool, want_values: bool) -> Self {
        match (want_keys, want_values) {
            (true, true) => Self::Both,
            (false, true) => Self::Values,
            _ => Self::Keys,
        }
    }

    /// Whether keys are yielded.
    #[must_use]
    pub const fn wants_keys(self) -> bool {
        matches!(self, Self::Keys | Self::Both)
    }

    /// Whether values are yielded.
    #[must_use]
    pub const fn wants_values(self) -> bool {
        matches!(self, Self::Values | Self::Both)
    }
}

/// One row yielded by a cursor, projected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The key, when keys were requested.
    pub key: Option<Vec<u8>>,
    /// The value, when values were requested.
    pub value: Option<Vec<u8>>,
}

/// Where a cursor reads its batches from.
pub(crate) enum Source<T> {
    /// A read snapshot owned by the cursor.
    Snapshot(T),
    /// The opening thread's transaction stack, as long as its outermost level is `root`.
    Active { stack: Arc<Mutex<TxnStack<T>>>, root: u64 },
    /// Exhausted, failed or dropped.
    Released,
}

/// A single-pass stream of [`Record`]s over one database.
///
/// The stream is fused: after it is exhausted or has yielded an error it
/// yields `None` and its engine resources are released. Dropping the stream
/// early releases them too.
pub struct CursorStream<T: Transaction> {
    source: Source<T>,
    table: String,
    projection: Projection,
    batch_size: usize,
    buffer: VecDeque<ScanEntry>,
    last_key: Option<Vec<u8>>,
    /// The last fetched batch was short, so nothing follows the buffer.
    drained: bool,
}

impl<T: Transaction> CursorStream<T> {
    pub(crate) fn new(
        source: Source<T>,
        table: &str,
        projection: Projection,
        batch_size: usize,
    ) -> Self {
        Self {
            source,
            table: table.to_owned(),
            projection,
            batch_size: batch_size.max(1),
            buffer: VecDeque::new(),
            last_key: None,
            drained: false,
        }
    }

    /// The projection this cursor yields.
    #[must_use]
    pub const fn projection(&self) -> Projection {
        self.projection
    }

    /// Whether the cursor has released its engine resources.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        matches!(self.source, Source::Released)
    }

    fn fetch(&mut self) -> Result<()> {
        let after = self.last_key.as_deref();
        let with_values = self.projection.wants_values();

        let rows = match &self.source {
            Source::Snapshot(txn) => txn.scan(&self.table, after, self.batch_size, with_values)?,
            Source::Active { stack, root } => {
                let stack = stack.lock().map_err(|_| Error::lock_poisoned("transaction stack"))?;
                let txn = stack.root_txn(*root).ok_or(TransactionError::CursorInvalidated)?;
                txn.scan(&self.table, after, self.batch_size, with_values)?
            }
            Source::Released => Vec::new(),
        };

        trace!(table = %self.table, rows = rows.len(), "fetched cursor batch");
        self.drained = rows.len() < self.batch_size;
        self.buffer.extend(rows);
        Ok(())
    }

    fn release(&mut self) {
        if !self.is_released() {
            self.source = Source::Released;
            self.buffer.clear();
            trace!(table = %self.table, "released cursor");
        }
    }
}

impl<T: Transaction> Iterator for CursorStream<T> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_released() {
            return None;
        }

        if self.buffer.is_empty() && !self.drained {
            if let Err(e) = self.fetch() {
                self.release();
                return Some(Err(e));
            }
        }

        let Some((key, value)) = self.buffer.pop_front() else {
            self.release();
            return None;
        };

        let record = Record {
            key: self.projection.wants_keys().then(|| key.clone()),
            value: if self.projection.wants_values() { value } else { None },
        };
        self.last_key = Some(key);
        Some(Ok(record))
    }
}

impl<T: Transaction> std::iter::FusedIterator for CursorStream<T> {}

impl<T: Transaction> Drop for CursorStream<T> {
    fn drop(&mut self) {
        self.release();
    }
}
