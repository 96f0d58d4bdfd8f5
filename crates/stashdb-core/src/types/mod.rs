//! Core data types for `StashDB`.
//!
//! This module defines the identifier and entry types shared by the storage
//! and backend layers.

mod entry;
mod id;

pub use entry::Entry;
pub use id::EntryId;
