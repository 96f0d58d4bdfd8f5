//! Database and transaction handles.

use std::fmt;
use std::sync::Arc;

/// The layout of a named database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum DatabaseKind {
    /// An ordered map from key bytes to value bytes.
    #[default]
    BTree,
}

/// A named logical table inside an [`Environment`](super::Environment).
///
/// Handles are cheap to clone and do not own the table; the environment
/// that issued them keeps the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseHandle {
    name: Arc<str>,
    kind: DatabaseKind,
}

impl DatabaseHandle {
    pub(crate) fn new(name: &str, kind: DatabaseKind) -> Self {
        Self { name: Arc::from(name), kind }
    }

    /// The table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The table layout.
    #[must_use]
    pub const fn kind(&self) -> DatabaseKind {
        self.kind
    }
}

/// A token naming one active transaction.
///
/// The token is only meaningful to the environment that issued it. Once the
/// transaction is committed or rolled back, finalizing the same token again
/// fails with [`TransactionError::UnknownTransaction`](stashdb_core::TransactionError::UnknownTransaction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxnHandle {
    id: u64,
    depth: usize,
}

impl TxnHandle {
    pub(crate) const fn new(id: u64, depth: usize) -> Self {
        Self { id, depth }
    }

    /// Unique transaction ID for debugging and logging.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Nesting depth; the outermost transaction is at depth 1.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Whether this is the outermost transaction.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.depth == 1
    }
}

impl fmt::Display for TxnHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn#{}@{}", self.id, self.depth)
    }
}
