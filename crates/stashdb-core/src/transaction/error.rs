//! Transaction error types.

use thiserror::Error;

/// Errors that can occur while beginning or finalizing transactions.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The environment was opened with transactions disabled.
    #[error("transactions are disabled for this environment")]
    Disabled,

    /// A commit or rollback was requested with no transaction active.
    #[error("no active transaction")]
    NoActiveTransaction,

    /// A top-level transaction was requested while one is already active.
    ///
    /// New transactions must be nested under the innermost active one.
    #[error("a transaction is already active; nest under the innermost transaction")]
    AlreadyActive,

    /// The transaction handle does not name an active transaction.
    ///
    /// This happens when a handle is finalized twice.
    #[error("unknown transaction: {0}")]
    UnknownTransaction(u64),

    /// The transaction still has nested children that must be finalized first.
    #[error("transaction {id} at depth {depth} has active children")]
    ActiveChildren {
        /// The transaction that was targeted.
        id: u64,
        /// Its depth in the nesting stack (the outermost is depth 1).
        depth: usize,
    },

    /// A child was requested under a parent that is not the innermost transaction.
    #[error("transaction {id} is not the innermost active transaction")]
    NotInnermost {
        /// The requested parent.
        id: u64,
    },

    /// The transaction a cursor was reading through has been finalized.
    #[error("cursor invalidated: its transaction was finalized")]
    CursorInvalidated,

    /// The storage engine refused to begin, commit or roll back.
    #[error("engine refused transaction operation: {0}")]
    Engine(String),
}

impl TransactionError {
    /// Returns `true` if this error reports misuse of the nesting protocol
    /// rather than an engine failure.
    #[must_use]
    pub const fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::NoActiveTransaction
                | Self::AlreadyActive
                | Self::UnknownTransaction(_)
                | Self::ActiveChildren { .. }
                | Self::NotInnermost { .. }
        )
    }
}

/// Result type alias for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors() {
        assert!(TransactionError::NoActiveTransaction.is_protocol_error());
        assert!(TransactionError::ActiveChildren { id: 1, depth: 1 }.is_protocol_error());
        assert!(!TransactionError::Engine("disk full".into()).is_protocol_error());
        assert!(!TransactionError::Disabled.is_protocol_error());
    }

    #[test]
    fn error_display() {
        let err = TransactionError::ActiveChildren { id: 7, depth: 2 };
        assert_eq!(err.to_string(), "transaction 7 at depth 2 has active children");
    }
}
