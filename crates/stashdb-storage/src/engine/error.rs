//! Storage error types.

use thiserror::Error;

/// Errors that can occur in storage operations.
///
/// Every failure reported by a backend is classified into one of these
/// variants before it leaves the storage crate.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database could not be opened or created.
    #[error("failed to open database: {0}")]
    Open(String),

    /// A table does not exist.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The engine refused to begin, commit or abort a transaction.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Attempted a write through a read-only transaction.
    #[error("cannot write in read-only transaction")]
    ReadOnly,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine reported an internal failure (corruption, exhaustion, ...).
    #[error("internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Returns `true` if the failure happened while opening the database.
    #[must_use]
    pub const fn is_open_error(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    /// Returns `true` if the engine refused a transaction lifecycle call.
    #[must_use]
    pub const fn is_transaction_error(&self) -> bool {
        matches!(self, Self::Transaction(_))
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(StorageError::ReadOnly.to_string(), "cannot write in read-only transaction");
        assert_eq!(
            StorageError::TableNotFound("objects".into()).to_string(),
            "table not found: objects"
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: StorageError = std::io::Error::other("disk gone").into();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
