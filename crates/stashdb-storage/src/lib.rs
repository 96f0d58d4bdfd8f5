//! `StashDB` Storage
//!
//! This crate provides the storage engine abstraction and backend implementations
//! for `StashDB`.
//!
//! # Overview
//!
//! The storage layer provides a transactional key-value interface over named
//! tables. Higher layers (environment, backend) are written against the
//! [`StorageEngine`] and [`Transaction`] traits, so a backend only has to
//! provide ACID transactions, point operations and batched ordered scans.
//!
//! # Core Traits
//!
//! - [`StorageEngine`] - The main entry point for storage operations
//! - [`Transaction`] - ACID transaction support with read/write operations
//!
//! # Error Handling
//!
//! All storage operations return [`StorageResult<T>`], which is an alias for
//! `Result<T, StorageError>`. The [`StorageError`] enum covers all possible
//! failure modes from database-level issues to I/O errors.
//!
//! # Example
//!
//! ```ignore
//! use stashdb_storage::{StorageEngine, Transaction};
//! use stashdb_storage::backends::RedbEngine;
//!
//! // Open or create a database
//! let engine = RedbEngine::open("stash.redb")?;
//!
//! // Write some data
//! let mut tx = engine.begin_write()?;
//! tx.put("objects", b"user:1", b"Alice")?;
//! tx.put("objects", b"user:2", b"Bob")?;
//! tx.commit()?;
//!
//! // Read it back
//! let tx = engine.begin_read()?;
//! let alice = tx.get("objects", b"user:1")?;
//! assert_eq!(alice, Some(b"Alice".to_vec()));
//! ```
//!
//! # Modules
//!
//! - [`engine`] - Storage engine traits and abstractions
//! - [`backends`] - Concrete storage backend implementations

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod backends;
pub mod engine;

pub use engine::{ScanEntry, StorageEngine, StorageError, StorageResult, Transaction};
