//! Serialization delegates.
//!
//! The storage backend treats payloads as opaque bytes and delegates the
//! conversion between [`Entry`](crate::types::Entry) values and bytes to a
//! [`Serializer`]. Two stock delegates are provided:
//!
//! - [`BincodeSerializer`] - compact binary layout with a leading format version
//! - [`JsonSerializer`] - human-readable JSON
//!
//! # Example
//!
//! ```
//! use stashdb_core::encoding::{BincodeSerializer, Serializer};
//! use stashdb_core::types::Entry;
//!
//! let entry = Entry::new("doc:1", b"hello".to_vec());
//! let bytes = BincodeSerializer.serialize(&entry).unwrap();
//! let decoded = BincodeSerializer.deserialize(&bytes).unwrap();
//! assert_eq!(decoded, entry);
//! ```

mod binary;
mod json;
mod traits;


pub use binary::BincodeSerializer;
pub use json::JsonSerializer;
pub use traits::{Serializer, FORMAT_VERSION};
