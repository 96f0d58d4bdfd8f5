//! Error types for `StashDB`.
//!
//! This module provides the [`enum@Error`] type that every backend and
//! environment operation reports. Lower layers keep their own error types
//! ([`StorageError`], [`TransactionError`], [`SerializationError`]) and are
//! wrapped here without losing their classification.

use stashdb_core::{EntryId, SerializationError, TransactionError};
use stashdb_storage::StorageError;
use thiserror::Error;

/// Errors that can occur when using `StashDB`.
///
/// A missing entry is never an error; lookups report it as `None`.
#[derive(Debug, Error)]
pub enum Error {
    /// A new entry was inserted under an identifier that is already stored.
    ///
    /// The stored version is left untouched.
    #[error("duplicate key: {0}")]
    DuplicateKey(EntryId),

    /// The storage engine failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A transaction could not be begun or finalized.
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// The serialization delegate failed to encode or decode an entry.
    #[error("serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// The environment or one of its databases could not be opened.
    #[error("environment error: {0}")]
    Environment(String),

    /// An internal lock was poisoned (a thread panicked while holding it).
    #[error("internal lock poisoned: {0}")]
    LockPoisoned(String),
}

impl Error {
    /// Returns `true` if this error is recoverable.
    ///
    /// A recoverable error left the store unchanged and the caller may carry
    /// on using the backend.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::DuplicateKey(_))
    }

    /// Returns `true` if this is a duplicate key error.
    #[must_use]
    pub const fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey(_))
    }

    /// Returns `true` if this is a transaction error.
    #[must_use]
    pub const fn is_transaction_error(&self) -> bool {
        matches!(self, Self::Transaction(_))
    }

    /// Returns `true` if this is a storage error.
    #[must_use]
    pub const fn is_storage_error(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Create an environment error.
    #[must_use]
    pub fn environment(msg: impl Into<String>) -> Self {
        Self::Environment(msg.into())
    }

    /// Create a lock poisoned error.
    #[must_use]
    pub fn lock_poisoned(msg: impl Into<String>) -> Self {
        Self::LockPoisoned(msg.into())
    }
}

/// A specialized `Result` type for `StashDB` operations.
pub type Result<T> = std::result::Result<T, Error>;
