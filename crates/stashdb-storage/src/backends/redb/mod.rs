//! Redb storage backend.
//!
//! This module provides a storage backend implementation using Redb,
//! a pure-Rust embedded database. Redb provides ACID transactions with a
//! single serialized writer and any number of snapshot readers.
//!
//! # Example
//!
//! ```ignore
//! use stashdb_storage::backends::RedbEngine;
//! use stashdb_storage::{StorageEngine, Transaction};
//!
//! // Open a database (creates if it doesn't exist)
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
//! # In-Memory Databases
//!
//! For testing, you can create an in-memory database that doesn't persist:
//!
//! ```ignore
//! let engine = RedbEngine::in_memory()?;
//! ```
//!
//! # Configuration
//!
//! ```ignore
//! use stashdb_storage::backends::{RedbConfig, RedbEngine};
//!
//! let config = RedbConfig::new()
//!     .cache_size(100 * 1024 * 1024) // 100 MB cache
//!     .create_if_missing(false);
//!
//! let engine = RedbEngine::open_with_config("stash.redb", config)?;
//! ```

mod engine;
pub mod tables;
mod transaction;

pub use engine::{RedbConfig, RedbEngine};
pub use transaction::RedbTransaction;
