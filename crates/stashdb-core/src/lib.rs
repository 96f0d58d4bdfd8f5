//! `StashDB` Core
//!
//! This crate provides the types shared by the `StashDB` storage layers.
//!
//! # Overview
//!
//! - **Identifiers**: [`EntryId`], the string key of a stored entry
//! - **Entries**: [`Entry`], an identifier with an opaque payload
//! - **Serialization delegates**: the [`Serializer`] trait and the stock
//!   [`BincodeSerializer`] and [`JsonSerializer`]
//! - **Errors**: [`SerializationError`] and [`TransactionError`]
//!
//! # Example
//!
//! ```
//! use stashdb_core::{BincodeSerializer, Entry, Serializer};
//!
//! let entry = Entry::new("user:1", b"Alice".to_vec());
//! let bytes = BincodeSerializer.serialize(&entry).unwrap();
//! assert_eq!(BincodeSerializer.deserialize(&bytes).unwrap(), entry);
//! ```
//!
//! # Modules
//!
//! - [`types`] - [`Entry`] and [`EntryId`]
//! - [`encoding`] - Serialization delegates
//! - [`error`] - Error types ([`SerializationError`])
//! - [`transaction`] - Transaction error types ([`TransactionError`])

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod encoding;
pub mod error;
pub mod transaction;
pub mod types;

pub use encoding::{BincodeSerializer, JsonSerializer, Serializer};
pub use error::{SerializationError, SerializationResult};
pub use transaction::{TransactionError, TransactionResult};
pub use types::{Entry, EntryId};
