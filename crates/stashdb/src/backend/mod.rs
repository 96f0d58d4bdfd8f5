//! Backend capability traits.
//!
//! A storage adapter advertises what it can do by implementing one trait
//! per capability:
//!
//! - [`CrudBackend`] - insert, get, exists, delete and clear by identifier
//! - [`TransactionalBackend`] - begin, commit and roll back nested transactions
//! - [`ScannableBackend`] - lazy enumeration of every entry or identifier
//! - [`LinearQueryBackend`] - predicate search by linear scan
//!
//! [`StashBackend`] implements all four.

mod stash;

pub use stash::{EntryIdStream, EntryStream, StashBackend, OBJECTS};

use stashdb_core::{Entry, EntryId};

use crate::error::{Error, Result};

/// Anything that names an entry.
///
/// Lets [`CrudBackend`] accept raw identifiers and materialized entries alike.
pub trait AsEntryId {
    /// The identifier of the named entry.
    fn entry_id(&self) -> &str;
}

impl AsEntryId for str {
    fn entry_id(&self) -> &str {
        self
    }
}

impl AsEntryId for String {
    fn entry_id(&self) -> &str {
        self
    }
}

impl AsEntryId for EntryId {
    fn entry_id(&self) -> &str {
        self.as_str()
    }
}

impl AsEntryId for Entry {
    fn entry_id(&self) -> &str {
        self.id().as_str()
    }
}

impl<T: AsEntryId + ?Sized> AsEntryId for &T {
    fn entry_id(&self) -> &str {
        (**self).entry_id()
    }
}

/// Create, read and delete entries by identifier.
pub trait CrudBackend {
    /// Store entries in order.
    ///
    /// An entry with `has_prev` set overwrites any stored version. An entry
    /// without it must be new: if its identifier is already stored the call
    /// stops with [`Error::DuplicateKey`], leaving that identifier untouched.
    /// Entries before the duplicate stay written unless the call runs inside
    /// a transaction that is rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`], or [`Error::Serialization`] /
    /// [`Error::Storage`] if encoding or the engine fails.
    fn insert(&self, entries: &[Entry]) -> Result<()>;

    /// Load entries in the order of `ids`.
    ///
    /// Returns `None` if any identifier is missing; a partial result is
    /// never returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if a payload cannot be decoded, or
    /// [`Error::Storage`] if the engine fails.
    fn get<I: AsEntryId>(&self, ids: &[I]) -> Result<Option<Vec<Entry>>>;

    /// Report, for each identifier, whether it is stored. Payloads are not decoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the engine fails.
    fn exists<I: AsEntryId>(&self, ids: &[I]) -> Result<Vec<bool>>;

    /// Delete entries by identifier. Missing identifiers are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the engine fails.
    fn delete<I: AsEntryId>(&self, items: &[I]) -> Result<()>;

    /// Delete every entry, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the engine fails.
    fn clear(&self) -> Result<u64>;
}

/// Group operations into nested transactions.
pub trait TransactionalBackend {
    /// Begin a transaction, nested under the active one if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transaction`] if the engine refuses.
    fn txn_begin(&self) -> Result<()>;

    /// Commit the innermost transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transaction`] if no transaction is active or the
    /// engine refuses.
    fn txn_commit(&self) -> Result<()>;

    /// Roll back the innermost transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transaction`] if no transaction is active or the
    /// engine refuses.
    fn txn_rollback(&self) -> Result<()>;

    /// Run `body` in a transaction, committing on `Ok` and rolling back on
    /// `Err` or panic.
    ///
    /// # Errors
    ///
    /// Returns the error of `body`, or the [`enum@Error`] raised while beginning or
    /// committing.
    fn txn_do<T, Er, F>(&self, body: F) -> std::result::Result<T, Er>
    where
        Er: From<Error>,
        F: FnOnce(&Self) -> std::result::Result<T, Er>;
}

/// Enumerate every stored entry without materializing them all.
///
/// Enumeration follows the engine's key order, which is stable within one
/// enumeration but carries no application meaning.
pub trait ScannableBackend {
    /// Stream of decoded entries.
    type Entries<'a>: Iterator<Item = Result<Entry>>
    where
        Self: 'a;

    /// Stream of identifiers.
    type EntryIds<'a>: Iterator<Item = Result<EntryId>>
    where
        Self: 'a;

    /// A lazy, single-pass stream of every entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the stream cannot be opened.
    fn all_entries(&self) -> Result<Self::Entries<'_>>;

    /// A lazy, single-pass stream of every identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the stream cannot be opened.
    fn all_entry_ids(&self) -> Result<Self::EntryIds<'_>>;
}

/// Search entries with a predicate over a full scan.
pub trait LinearQueryBackend: ScannableBackend {
    /// Lazily yield every entry for which `predicate` holds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the underlying scan cannot be opened.
    fn search<P>(&self, predicate: P) -> Result<Matches<Self::Entries<'_>, P>>
    where
        P: FnMut(&Entry) -> bool,
    {
        Ok(Matches { inner: self.all_entries()?, predicate })
    }
}

/// Entries of a scan that satisfy a predicate.
pub struct Matches<I, P> {
    inner: I,
    predicate: P,
}

impl<I, P> Iterator for Matches<I, P>
where
    I: Iterator<Item = Result<Entry>>,
    P: FnMut(&Entry) -> bool,
{
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) if (self.predicate)(&entry) => return Some(Ok(entry)),
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
