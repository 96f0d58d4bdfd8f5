//! `StashDB` - A Transactional Blob Store
//!
//! StashDB persists opaque byte payloads keyed by string identifier in an
//! embedded transactional key-value engine ([redb](https://docs.rs/redb)).
//!
//! # Features
//!
//! - **CRUD by identifier**: insert with duplicate detection, batch get,
//!   exists, delete and clear
//! - **Nested transactions**: savepoints that roll back on their own
//! - **Streaming enumeration**: every entry or identifier, fetched in
//!   bounded batches
//! - **Pluggable serialization**: any [`Serializer`] turns entries into
//!   payload bytes
//!
//! # Quick Start
//!
//! ```ignore
//! use stashdb::{BincodeSerializer, Config, CrudBackend, Entry, StashBackend};
//!
//! let backend = StashBackend::open(Config::new("/var/lib/stash"), BincodeSerializer)?;
//!
//! backend.insert(&[Entry::new("1", b"first".to_vec())])?;
//! assert_eq!(backend.exists(&["1", "2"])?, vec![true, false]);
//!
//! // `get` is all-or-nothing: one missing id yields `None`.
//! assert!(backend.get(&["1", "2"])?.is_none());
//! ```
//!
//! ## Transactions
//!
//! ```ignore
//! use stashdb::TransactionalBackend;
//!
//! backend.txn_do(|b| -> stashdb::Result<()> {
//!     b.insert(&[Entry::new("a", vec![1])])?;
//!     b.insert(&[Entry::new("b", vec![2])])?;
//!     Ok(())
//! })?;
//! ```
//!
//! # Modules
//!
//! - [`backend`] - Capability traits and [`StashBackend`]
//! - [`environment`] - [`Environment`], database and transaction handles
//! - [`cursor`] - [`CursorStream`]
//! - [`config`] - [`Config`]
//! - [`error`] - [`enum@Error`] and [`Result`]

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod config;
pub mod cursor;
pub mod environment;
pub mod error;

pub use backend::{
    AsEntryId, CrudBackend, EntryIdStream, EntryStream, LinearQueryBackend, Matches,
    ScannableBackend, StashBackend, TransactionalBackend, OBJECTS,
};
pub use config::Config;
pub use cursor::{CursorStream, Projection, Record};
pub use environment::{DatabaseHandle, DatabaseKind, Environment, TxnHandle};
pub use error::{Error, Result};

pub use stashdb_core::{
    BincodeSerializer, Entry, EntryId, JsonSerializer, SerializationError, Serializer,
    TransactionError,
};
pub use stashdb_storage::backends::RedbEngine;
pub use stashdb_storage::{StorageEngine, StorageError};
