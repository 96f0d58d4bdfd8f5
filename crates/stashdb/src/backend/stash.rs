//! The transactional blob-store backend.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use stashdb_core::{BincodeSerializer, Entry, EntryId, SerializationError, Serializer};
use stashdb_storage::backends::RedbEngine;
use stashdb_storage::{StorageEngine, Transaction};
use tracing::debug;

use super::{AsEntryId, CrudBackend, LinearQueryBackend, ScannableBackend, TransactionalBackend};
use crate::config::Config;
use crate::cursor::CursorStream;
use crate::environment::{DatabaseHandle, DatabaseKind, Environment};
use crate::error::{Error, Result};

/// Name of the table holding every entry.
pub const OBJECTS: &str = "objects";

/// A durable blob store keyed by string identifier.
///
/// Payloads are produced and decoded by the serialization delegate `S`;
/// the backend never looks inside them. Each entry is stored in the
/// [`OBJECTS`] table under the UTF-8 bytes of its identifier.
///
/// # Example
///
/// ```ignore
/// use stashdb::{BincodeSerializer, Config, CrudBackend, Entry, StashBackend};
///
/// let backend = StashBackend::open(Config::new("/var/lib/stash"), BincodeSerializer)?;
/// backend.insert(&[Entry::new("1", b"payload".to_vec())])?;
/// let entries = backend.get(&["1"])?;
/// ```
pub struct StashBackend<S = BincodeSerializer, E = RedbEngine>
where
    E: StorageEngine,
{
    env: Arc<Environment<E>>,
    serializer: S,
    /// The primary table, opened on first use.
    objects: OnceCell<DatabaseHandle>,
}

impl<S: Serializer> StashBackend<S, RedbEngine> {
    /// Open the environment described by `config` and its primary table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Environment`] if the environment or table cannot be opened.
    pub fn open(config: Config, serializer: S) -> Result<Self> {
        let env = Environment::open(config)?;
        let backend = Self::with_environment(Arc::new(env), serializer);
        backend.ensure_open()?;
        Ok(backend)
    }
}

impl<S: Serializer, E: StorageEngine> StashBackend<S, E> {
    /// Create a backend over a shared environment.
    ///
    /// The primary table is opened on first use.
    pub fn with_environment(env: Arc<Environment<E>>, serializer: S) -> Self {
        Self { env, serializer, objects: OnceCell::new() }
    }

    /// The environment this backend stores into.
    #[must_use]
    pub const fn environment(&self) -> &Arc<Environment<E>> {
        &self.env
    }

    /// The serialization delegate.
    #[must_use]
    pub const fn serializer(&self) -> &S {
        &self.serializer
    }

    /// Open the primary table once and return its handle.
    fn ensure_open(&self) -> Result<&DatabaseHandle> {
        if let Some(handle) = self.objects.get() {
            return Ok(handle);
        }
        // Opened outside the cell: opening can wait on another thread's transaction.
        let handle = self.env.open_database(OBJECTS, DatabaseKind::BTree)?;
        Ok(self.objects.get_or_init(|| handle))
    }

    fn cursor(&self, want_keys: bool, want_values: bool) -> Result<CursorStream<E::Transaction>> {
        let db = self.ensure_open()?;
        self.env.cursor(db, want_keys, want_values)
    }
}

impl<S: Serializer, E: StorageEngine> CrudBackend for StashBackend<S, E> {
    fn insert(&self, entries: &[Entry]) -> Result<()> {
        let db = self.ensure_open()?;

        // Encode everything up front so a bad entry writes nothing.
        let payloads = entries
            .iter()
            .map(|entry| self.serializer.serialize(entry))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let duplicate = self.env.transact(|writer| {
            for (entry, payload) in entries.iter().zip(&payloads) {
                let key = entry.id().as_bytes();
                if entry.has_prev() {
                    writer.put(db.name(), key, payload)?;
                } else if !writer.put_new(db.name(), key, payload)? {
                    return Ok(Some(entry.id().clone()));
                }
            }
            Ok(None)
        })?;

        match duplicate {
            Some(id) => {
                debug!(id = %id, "rejected duplicate entry");
                Err(Error::DuplicateKey(id))
            }
            None => Ok(()),
        }
    }

    fn get<I: AsEntryId>(&self, ids: &[I]) -> Result<Option<Vec<Entry>>> {
        let db = self.ensure_open()?;

        let payloads = self.env.read(|txn| {
            let mut payloads = Vec::with_capacity(ids.len());
            for id in ids {
                match txn.get(db.name(), id.entry_id().as_bytes())? {
                    Some(payload) => payloads.push(payload),
                    None => return Ok(None),
                }
            }
            Ok(Some(payloads))
        })?;

        let Some(payloads) = payloads else {
            return Ok(None);
        };
        let entries = payloads
            .iter()
            .map(|payload| self.serializer.deserialize(payload))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Some(entries))
    }

    fn exists<I: AsEntryId>(&self, ids: &[I]) -> Result<Vec<bool>> {
        let db = self.ensure_open()?;
        self.env.read(|txn| {
            ids.iter()
                .map(|id| Ok(txn.contains(db.name(), id.entry_id().as_bytes())?))
                .collect()
        })
    }

    fn delete<I: AsEntryId>(&self, items: &[I]) -> Result<()> {
        let db = self.ensure_open()?;
        self.env.transact(|writer| {
            for item in items {
                writer.delete(db.name(), item.entry_id().as_bytes())?;
            }
            Ok(())
        })
    }

    fn clear(&self) -> Result<u64> {
        let db = self.ensure_open()?;
        let removed = self.env.transact(|writer| Ok(writer.clear(db.name())?))?;
        debug!(removed, "cleared entries");
        Ok(removed)
    }
}

impl<S: Serializer, E: StorageEngine> TransactionalBackend for StashBackend<S, E> {
    fn txn_begin(&self) -> Result<()> {
        if !self.env.config().transactions {
            return Ok(());
        }
        let parent = self.env.innermost()?;
        self.env.begin_transaction(parent)?;
        Ok(())
    }

    fn txn_commit(&self) -> Result<()> {
        if !self.env.config().transactions {
            return Ok(());
        }
        let txn = self.env.innermost()?.ok_or(stashdb_core::TransactionError::NoActiveTransaction)?;
        self.env.commit(txn)
    }

    fn txn_rollback(&self) -> Result<()> {
        if !self.env.config().transactions {
            return Ok(());
        }
        let txn = self.env.innermost()?.ok_or(stashdb_core::TransactionError::NoActiveTransaction)?;
        self.env.rollback(txn)
    }

    fn txn_do<T, Er, F>(&self, body: F) -> std::result::Result<T, Er>
    where
        Er: From<Error>,
        F: FnOnce(&Self) -> std::result::Result<T, Er>,
    {
        if !self.env.config().transactions {
            return body(self);
        }
        self.env.run_in_transaction(|_| body(self))
    }
}

impl<S: Serializer, E: StorageEngine> ScannableBackend for StashBackend<S, E> {
    type Entries<'a> = EntryStream<'a, S, E::Transaction> where Self: 'a;
    type EntryIds<'a> = EntryIdStream<E::Transaction> where Self: 'a;

    fn all_entries(&self) -> Result<Self::Entries<'_>> {
        Ok(EntryStream { cursor: self.cursor(false, true)?, serializer: &self.serializer })
    }

    fn all_entry_ids(&self) -> Result<Self::EntryIds<'_>> {
        Ok(EntryIdStream { cursor: self.cursor(true, false)? })
    }
}

impl<S: Serializer, E: StorageEngine> LinearQueryBackend for StashBackend<S, E> {}

/// Every stored entry, decoded as it is pulled.
pub struct EntryStream<'a, S, T: Transaction> {
    cursor: CursorStream<T>,
    serializer: &'a S,
}

impl<S: Serializer, T: Transaction> Iterator for EntryStream<'_, S, T> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.cursor.next()?;
        Some(record.and_then(|record| {
            let payload = record.value.ok_or(SerializationError::Empty)?;
            Ok(self.serializer.deserialize(&payload)?)
        }))
    }
}

/// Every stored identifier.
pub struct EntryIdStream<T: Transaction> {
    cursor: CursorStream<T>,
}

impl<T: Transaction> Iterator for EntryIdStream<T> {
    type Item = Result<EntryId>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.cursor.next()?;
        Some(record.and_then(|record| {
            let key = record.key.ok_or(SerializationError::Empty)?;
            let id = String::from_utf8(key)
                .map_err(|e| SerializationError::InvalidId(e.to_string()))?;
            Ok(EntryId::from(id))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stashdb_core::JsonSerializer;

    fn backend() -> StashBackend {
        StashBackend::open(Config::in_memory(), BincodeSerializer).expect("failed to open backend")
    }

    #[test]
    fn test_insert_and_get() {
        let backend = backend();
        let entry = Entry::new("a", b"payload".to_vec());
        backend.insert(&[entry.clone()]).expect("failed to insert");

        assert_eq!(backend.get(&["a"]).expect("failed to get"), Some(vec![entry]));
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let backend = backend();
        backend.insert(&[Entry::new("a", vec![1])]).expect("failed to insert");

        let err = backend.insert(&[Entry::new("a", vec![2])]).expect_err("duplicate");
        assert!(matches!(&err, Error::DuplicateKey(id) if id.as_str() == "a"));
        assert!(err.is_recoverable());

        let stored = backend.get(&["a"]).expect("failed to get").expect("present");
        assert_eq!(stored[0].data(), &[1]);
    }

    #[test]
    fn test_overwrite_with_prev() {
        let backend = backend();
        let entry = Entry::new("a", vec![1]);
        backend.insert(&[entry.clone()]).expect("failed to insert");
        backend.insert(&[entry.revise(vec![2])]).expect("failed to overwrite");

        let stored = backend.get(&["a"]).expect("failed to get").expect("present");
        assert_eq!(stored[0].data(), &[2]);
    }

    #[test]
    fn test_exists_and_delete() {
        let backend = backend();
        let entry = Entry::new("a", vec![1]);
        backend.insert(&[entry.clone()]).expect("failed to insert");

        assert_eq!(backend.exists(&["a", "b"]).expect("failed to check"), vec![true, false]);
        backend.delete(&[entry]).expect("failed to delete");
        backend.delete(&["missing"]).expect("deleting a missing id is a no-op");
        assert_eq!(backend.exists(&["a"]).expect("failed to check"), vec![false]);
    }

    #[test]
    fn test_clear_reports_count() {
        let backend = backend();
        let entries: Vec<_> = (0..4).map(|i| Entry::new(i.to_string(), vec![i])).collect();
        backend.insert(&entries).expect("failed to insert");

        assert_eq!(backend.clear().expect("failed to clear"), 4);
        assert_eq!(backend.clear().expect("failed to clear"), 0);
        assert_eq!(backend.all_entry_ids().expect("failed to scan").count(), 0);
    }

    #[test]
    fn test_bad_payload_writes_nothing() {
        struct Refuses;

        impl Serializer for Refuses {
            fn serialize(&self, entry: &Entry) -> stashdb_core::SerializationResult<Vec<u8>> {
                if entry.id().as_str() == "bad" {
                    return Err(SerializationError::encode("refused"));
                }
                Ok(entry.data().to_vec())
            }

            fn deserialize(&self, _bytes: &[u8]) -> stashdb_core::SerializationResult<Entry> {
                Err(SerializationError::decode("unused"))
            }
        }

        let backend =
            StashBackend::open(Config::in_memory(), Refuses).expect("failed to open backend");
        let err = backend
            .insert(&[Entry::new("good", vec![1]), Entry::new("bad", vec![2])])
            .expect_err("serialization fails");
        assert!(matches!(err, Error::Serialization(_)));
        assert_eq!(backend.exists(&["good"]).expect("failed to check"), vec![false]);
    }

    #[test]
    fn test_json_serializer_backend() {
        let backend = StashBackend::open(Config::in_memory(), JsonSerializer)
            .expect("failed to open backend");
        let entry = Entry::new("doc", b"{}".to_vec());
        backend.insert(&[entry.clone()]).expect("failed to insert");

        let all: Vec<Entry> =
            backend.all_entries().expect("failed to scan").collect::<Result<_>>().expect("decode");
        assert_eq!(all, vec![entry]);
    }

    #[test]
    fn test_search() {
        let backend = backend();
        let entries: Vec<_> = (0..10u8).map(|i| Entry::new(format!("{i}"), vec![i])).collect();
        backend.insert(&entries).expect("failed to insert");

        let even: Vec<Entry> = backend
            .search(|e| e.data()[0] % 2 == 0)
            .expect("failed to search")
            .collect::<Result<_>>()
            .expect("decode");
        assert_eq!(even.len(), 5);
        assert!(even.iter().all(|e| e.data()[0] % 2 == 0));
    }
}
