//! The environment manager.
//!
//! An [`Environment`] owns the storage engine, the registry of named
//! databases and the active transactions of every thread using it.
//! Everything else in the crate reaches the engine through it.
//!
//! # Transactions
//!
//! Transactions belong to the thread that began them. Each thread has at
//! most one transaction stack. Its outermost level holds an engine write
//! transaction; nested levels are savepoints that can be rolled back on
//! their own:
//!
//! ```ignore
//! let outer = env.begin_transaction(None)?;
//! let inner = env.begin_transaction(Some(outer))?;
//! // ... writes ...
//! env.rollback(inner)?; // undoes only the inner writes
//! env.commit(outer)?;   // persists the outer writes
//! ```
//!
//! While a thread has a transaction active, every operation that thread
//! issues through the environment runs inside it. Operations from threads
//! without a transaction read a committed snapshot, and each of their
//! writes commits on its own once the engine's write lock is free.

mod handle;
pub(crate) mod stack;
#[cfg(test)]
pub(crate) mod testing;

pub use handle::{DatabaseHandle, DatabaseKind, TxnHandle};

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use stashdb_core::TransactionError;
use stashdb_storage::backends::{RedbConfig, RedbEngine};
use stashdb_storage::{StorageEngine, StorageError, Transaction};
use tracing::{debug, warn};

use crate::config::Config;
use crate::cursor::{CursorStream, Projection, Source};
use crate::error::{Error, Result};

use self::stack::{TxnStack, Writer};

/// A thread's transaction stack, shared with the cursors it opens.
pub(crate) type SharedStack<T> = Arc<Mutex<TxnStack<T>>>;

/// An open storage environment.
///
/// # Thread Safety
///
/// `Environment` is `Send + Sync`. Transactions are private to the thread
/// that began them: other threads never read their uncommitted writes, and
/// a handle cannot be finalized from another thread. Writers are serialized
/// by the engine, so a second thread's write waits until the active
/// transaction is finalized.
pub struct Environment<E: StorageEngine = RedbEngine> {
    /// The underlying storage engine.
    engine: Arc<E>,
    /// The configuration used to open this environment.
    config: Config,
    /// Databases opened so far, by name.
    databases: Mutex<HashMap<String, DatabaseHandle>>,
    /// Transaction stacks of the threads with an active transaction.
    txns: Mutex<HashMap<ThreadId, SharedStack<E::Transaction>>>,
    /// Counter for generating unique transaction IDs.
    next_txn_id: AtomicU64,
}

impl Environment<RedbEngine> {
    /// Open the redb environment described by `config`.
    ///
    /// The environment file is `<home>/<file_name>`. When `config.create`
    /// is set a missing home directory is created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Environment`] if `home` is not a directory, is
    /// missing while `create` is off, or the engine cannot be opened.
    pub fn open(config: Config) -> Result<Self> {
        let engine = if config.in_memory {
            RedbEngine::in_memory().map_err(|e| Error::environment(e.to_string()))?
        } else {
            prepare_home(&config)?;

            let mut redb_config = RedbConfig::new().create_if_missing(config.create);
            if let Some(cache_size) = config.cache_size {
                redb_config = redb_config.cache_size(cache_size);
            }

            let path = config.db_path();
            RedbEngine::open_with_config(&path, redb_config)
                .map_err(|e| Error::environment(format!("{}: {e}", path.display())))?
        };

        debug!(
            home = %config.home.display(),
            in_memory = config.in_memory,
            transactions = config.transactions,
            "opened environment"
        );
        Ok(Self::with_engine(engine, config))
    }
}

impl<E: StorageEngine> Environment<E> {
    /// Wrap an already opened storage engine.
    ///
    /// `home`, `create` and the file settings of `config` are not consulted.
    pub fn with_engine(engine: E, config: Config) -> Self {
        Self {
            engine: Arc::new(engine),
            config,
            databases: Mutex::new(HashMap::new()),
            txns: Mutex::new(HashMap::new()),
            next_txn_id: AtomicU64::new(1),
        }
    }

    /// Get the configuration used to open this environment.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open a named database, creating it on first access when the
    /// environment allows creation.
    ///
    /// Opening the same name again returns the registered handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Environment`] if the database does not exist and
    /// `create` is off, or if the engine fails to create it.
    pub fn open_database(&self, name: &str, kind: DatabaseKind) -> Result<DatabaseHandle> {
        if let Some(handle) = self.lock_databases()?.get(name) {
            return Ok(handle.clone());
        }

        // The registry is not held here: creating the table can wait on
        // another thread's write transaction.
        let opened = if self.config.create {
            self.transact(|writer| Ok(writer.create_table(name)?))
        } else {
            match self.read(|txn| Ok(txn.has_table(name)?)) {
                Ok(true) => Ok(()),
                Ok(false) => return Err(Error::environment(format!("database {name} does not exist"))),
                Err(e) => Err(e),
            }
        };
        opened.map_err(|e| match e {
            Error::Storage(e) => Error::environment(format!("cannot open database {name}: {e}")),
            other => other,
        })?;

        let handle = self
            .lock_databases()?
            .entry(name.to_owned())
            .or_insert_with(|| DatabaseHandle::new(name, kind))
            .clone();
        debug!(database = name, "opened database");
        Ok(handle)
    }

    /// Begin a transaction, nested under `parent` when given.
    ///
    /// A top-level transaction takes the engine's write lock until it is
    /// finalized, waiting while another thread holds it. A nested
    /// transaction must name the innermost transaction of the calling thread
    /// as its parent.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::Disabled`] if the environment has transactions off
    /// - [`TransactionError::AlreadyActive`] if `parent` is `None` while the
    ///   calling thread has a transaction active
    /// - [`TransactionError::NotInnermost`] or [`TransactionError::UnknownTransaction`]
    ///   if `parent` is not the innermost active transaction
    /// - [`TransactionError::Engine`] if the engine refuses to begin
    pub fn begin_transaction(&self, parent: Option<TxnHandle>) -> Result<TxnHandle> {
        if !self.config.transactions {
            return Err(TransactionError::Disabled.into());
        }

        let shared = match parent {
            None => self.thread_stack_or_default()?,
            Some(parent) => {
                self.thread_stack()?.ok_or(TransactionError::UnknownTransaction(parent.id()))?
            }
        };
        let mut stack = lock_stack(&shared)?;
        match parent {
            None => {
                if !stack.is_empty() {
                    return Err(TransactionError::AlreadyActive.into());
                }
                let txn = match self.engine.begin_write() {
                    Ok(txn) => txn,
                    Err(e) => {
                        self.retire(&stack);
                        return Err(engine_refused(e));
                    }
                };
                stack.push_root(self.next_id(), txn);
            }
            Some(parent) => {
                match stack.innermost() {
                    Some(top) if top.id == parent.id() => {}
                    _ if stack.position(parent.id()).is_some() => {
                        return Err(TransactionError::NotInnermost { id: parent.id() }.into());
                    }
                    _ => return Err(TransactionError::UnknownTransaction(parent.id()).into()),
                }
                stack.push_savepoint(self.next_id());
            }
        }

        let handle = stack
            .innermost()
            .map(|frame| TxnHandle::new(frame.id, stack.depth()))
            .ok_or(TransactionError::NoActiveTransaction)?;
        debug!(txn = handle.id(), depth = handle.depth(), "began transaction");
        Ok(handle)
    }

    /// Commit a transaction.
    ///
    /// Committing a nested transaction folds its writes into its parent.
    /// Committing the outermost one makes every nested write durable.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::UnknownTransaction`] if `txn` is not active on
    ///   the calling thread
    /// - [`TransactionError::ActiveChildren`] if `txn` has unfinalized children
    /// - [`TransactionError::Engine`] if the engine commit fails
    pub fn commit(&self, txn: TxnHandle) -> Result<()> {
        let shared = self.owning_stack(txn)?;
        let mut stack = lock_stack(&shared)?;
        check_innermost(&stack, txn)?;

        let committed = if stack.depth() > 1 {
            stack.release_savepoint();
            Ok(())
        } else {
            stack.pop_root().map_or(Ok(()), |root| root.commit().map_err(engine_refused))
        };
        self.retire(&stack);
        committed?;

        debug!(txn = txn.id(), depth = txn.depth(), "committed transaction");
        Ok(())
    }

    /// Roll back a transaction, undoing exactly the writes made at its level
    /// (including those of children it already committed).
    ///
    /// # Errors
    ///
    /// - [`TransactionError::UnknownTransaction`] if `txn` is not active
    /// - [`TransactionError::ActiveChildren`] if `txn` has unfinalized children
    /// - [`TransactionError::Engine`] if the engine fails to undo the writes.
    ///   The whole transaction is then abandoned, so nothing it wrote is
    ///   committed.
    pub fn rollback(&self, txn: TxnHandle) -> Result<()> {
        let shared = self.owning_stack(txn)?;
        let mut stack = lock_stack(&shared)?;
        check_innermost(&stack, txn)?;
        let rolled_back = rollback_innermost(&mut stack);
        self.retire(&stack);
        rolled_back?;

        debug!(txn = txn.id(), depth = txn.depth(), "rolled back transaction");
        Ok(())
    }

    /// Run `body` inside a transaction.
    ///
    /// The transaction is nested under the innermost active one, if any. It
    /// is committed when `body` returns `Ok` and rolled back when `body`
    /// returns `Err` or panics. Children that `body` left unfinalized are
    /// rolled back with it.
    ///
    /// # Errors
    ///
    /// Returns the error of `body`, or the [`enum@Error`] raised while beginning or
    /// committing the transaction.
    pub fn run_in_transaction<T, Er, F>(&self, body: F) -> std::result::Result<T, Er>
    where
        Er: From<Error>,
        F: FnOnce(TxnHandle) -> std::result::Result<T, Er>,
    {
        let parent = self.innermost()?;
        let txn = self.begin_transaction(parent)?;
        let guard = RollbackGuard { env: self, txn, armed: true };

        let value = body(txn)?;
        self.commit(txn)?;
        guard.disarm();
        Ok(value)
    }

    /// The innermost transaction of the calling thread, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the transaction stack is poisoned.
    pub fn innermost(&self) -> Result<Option<TxnHandle>> {
        let Some(shared) = self.thread_stack()? else {
            return Ok(None);
        };
        let stack = lock_stack(&shared)?;
        Ok(stack.innermost().map(|frame| TxnHandle::new(frame.id, stack.depth())))
    }

    /// Number of active transactions of the calling thread.
    #[must_use]
    pub fn depth(&self) -> usize {
        let Some(shared) = self.recover_thread_stack() else {
            return 0;
        };
        let stack = shared.lock().unwrap_or_else(PoisonError::into_inner);
        stack.depth()
    }

    /// Whether the calling thread has a transaction active.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.depth() > 0
    }

    /// Open a cursor over `db` yielding the requested projection.
    ///
    /// Requesting neither keys nor values yields keys.
    ///
    /// When the calling thread has no transaction the cursor reads from its
    /// own snapshot. Otherwise it reads through that transaction and fails
    /// once the transaction is finalized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the engine cannot begin a read.
    pub fn cursor(
        &self,
        db: &DatabaseHandle,
        want_keys: bool,
        want_values: bool,
    ) -> Result<CursorStream<E::Transaction>> {
        let projection = Projection::from_flags(want_keys, want_values);

        let active = match self.thread_stack()? {
            Some(shared) => {
                let root = lock_stack(&shared)?.root_id();
                root.map(|root| Source::Active { stack: shared, root })
            }
            None => None,
        };
        let source = match active {
            Some(source) => source,
            None => Source::Snapshot(self.engine.begin_read()?),
        };

        Ok(CursorStream::new(source, db.name(), projection, self.config.cursor_batch_size))
    }

    /// Flush buffered engine data to durable storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the flush fails.
    pub fn flush(&self) -> Result<()> {
        Ok(self.engine.flush()?)
    }

    /// Run a read through the calling thread's transaction, or a fresh
    /// snapshot when it has none.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&E::Transaction) -> Result<R>) -> Result<R> {
        if let Some(shared) = self.thread_stack()? {
            let stack = lock_stack(&shared)?;
            if let Some(txn) = stack.active_txn() {
                return f(txn);
            }
        }

        let txn = self.engine.begin_read()?;
        f(&txn)
    }

    /// Run writes through the calling thread's transaction, or in an engine
    /// write transaction of their own that commits when `f` succeeds.
    pub(crate) fn transact<R>(
        &self,
        f: impl FnOnce(&mut Writer<'_, E::Transaction>) -> Result<R>,
    ) -> Result<R> {
        if let Some(shared) = self.thread_stack()? {
            let mut stack = lock_stack(&shared)?;
            if let Some(mut writer) = stack.writer() {
                return f(&mut writer);
            }
        }

        // No lock is held while waiting for the engine's write lock.
        let mut txn = self.engine.begin_write()?;
        match f(&mut Writer::unjournaled(&mut txn)) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort) = txn.rollback() {
                    warn!(error = %abort, "failed to roll back autocommit transaction");
                }
                Err(e)
            }
        }
    }

    /// Roll back `txn` and every transaction nested inside it.
    fn unwind(&self, txn: TxnHandle) -> Result<()> {
        let Some(shared) = self.recover_thread_stack() else {
            return Ok(());
        };
        let mut stack = shared.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(position) = stack.position(txn.id()) else {
            return Ok(());
        };

        let mut unwound = Ok(());
        while stack.depth() > position {
            if let Err(e) = rollback_innermost(&mut stack) {
                unwound = Err(e);
                break;
            }
        }
        self.retire(&stack);
        unwound?;

        debug!(txn = txn.id(), depth = txn.depth(), "rolled back transaction");
        Ok(())
    }

    /// The calling thread's transaction stack, if it has one.
    fn thread_stack(&self) -> Result<Option<SharedStack<E::Transaction>>> {
        let stacks = self.txns.lock().map_err(|_| Error::lock_poisoned("transaction stacks"))?;
        Ok(stacks.get(&thread::current().id()).cloned())
    }

    /// Like [`Self::thread_stack`], ignoring poisoning.
    fn recover_thread_stack(&self) -> Option<SharedStack<E::Transaction>> {
        let stacks = self.txns.lock().unwrap_or_else(PoisonError::into_inner);
        stacks.get(&thread::current().id()).cloned()
    }

    fn thread_stack_or_default(&self) -> Result<SharedStack<E::Transaction>> {
        let mut stacks =
            self.txns.lock().map_err(|_| Error::lock_poisoned("transaction stacks"))?;
        Ok(Arc::clone(stacks.entry(thread::current().id()).or_default()))
    }

    /// The stack that `txn` must belong to.
    fn owning_stack(&self, txn: TxnHandle) -> Result<SharedStack<E::Transaction>> {
        Ok(self.thread_stack()?.ok_or(TransactionError::UnknownTransaction(txn.id()))?)
    }

    /// Forget the calling thread's stack once its last transaction is finalized.
    ///
    /// Called with `stack` locked, so the registry is always locked second.
    fn retire(&self, stack: &TxnStack<E::Transaction>) {
        if stack.is_empty() {
            self.txns.lock().unwrap_or_else(PoisonError::into_inner).remove(&thread::current().id());
        }
    }

    fn lock_databases(&self) -> Result<MutexGuard<'_, HashMap<String, DatabaseHandle>>> {
        self.databases.lock().map_err(|_| Error::lock_poisoned("database registry"))
    }

    fn next_id(&self) -> u64 {
        self.next_txn_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Rolls a transaction back unless disarmed.
struct RollbackGuard<'a, E: StorageEngine> {
    env: &'a Environment<E>,
    txn: TxnHandle,
    armed: bool,
}

impl<E: StorageEngine> RollbackGuard<'_, E> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<E: StorageEngine> Drop for RollbackGuard<'_, E> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = self.env.unwind(self.txn) {
                warn!(txn = self.txn.id(), error = %e, "failed to roll back transaction");
            }
        }
    }
}

fn lock_stack<T>(stack: &Mutex<TxnStack<T>>) -> Result<MutexGuard<'_, TxnStack<T>>> {
    stack.lock().map_err(|_| Error::lock_poisoned("transaction stack"))
}

fn check_innermost<T: Transaction>(stack: &TxnStack<T>, txn: TxnHandle) -> Result<()> {
    match stack.position(txn.id()) {
        None => Err(TransactionError::UnknownTransaction(txn.id()).into()),
        Some(position) if position + 1 != stack.depth() => {
            Err(TransactionError::ActiveChildren { id: txn.id(), depth: position + 1 }.into())
        }
        Some(_) => Ok(()),
    }
}

fn rollback_innermost<T: Transaction>(stack: &mut TxnStack<T>) -> Result<()> {
    if stack.depth() > 1 {
        let undone = stack.rollback_savepoint().map_err(engine_refused)?;
        debug!(undone, "undid savepoint writes");
    } else if let Some(root) = stack.pop_root() {
        root.rollback().map_err(engine_refused)?;
    }
    Ok(())
}

fn engine_refused(err: StorageError) -> Error {
    TransactionError::Engine(err.to_string()).into()
}

fn prepare_home(config: &Config) -> Result<()> {
    let home = config.home();
    match std::fs::metadata(home) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(Error::environment(format!("{} is not a directory", home.display()))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if !config.create {
                return Err(Error::environment(format!("{} does not exist", home.display())));
            }
            std::fs::create_dir_all(home)
                .map_err(|e| Error::environment(format!("cannot create {}: {e}", home.display())))
        }
        Err(e) => Err(Error::environment(format!("cannot access {}: {e}", home.display()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        Environment::open(Config::in_memory()).expect("failed to open environment")
    }

    #[test]
    fn test_begin_nested_and_commit() {
        let env = env();
        assert!(!env.in_transaction());

        let outer = env.begin_transaction(None).expect("failed to begin");
        assert!(outer.is_root());
        let inner = env.begin_transaction(Some(outer)).expect("failed to begin nested");
        assert_eq!(inner.depth(), 2);
        assert_eq!(env.depth(), 2);
        assert_eq!(env.innermost().expect("innermost"), Some(inner));

        env.commit(inner).expect("failed to commit inner");
        env.commit(outer).expect("failed to commit outer");
        assert!(!env.in_transaction());
    }

    #[test]
    fn test_second_root_is_rejected() {
        let env = env();
        let outer = env.begin_transaction(None).expect("failed to begin");

        let err = env.begin_transaction(None).expect_err("second root should fail");
        assert!(matches!(err, Error::Transaction(TransactionError::AlreadyActive)));

        env.rollback(outer).expect("failed to roll back");
    }

    #[test]
    fn test_parent_must_be_innermost() {
        let env = env();
        let outer = env.begin_transaction(None).expect("failed to begin");
        let inner = env.begin_transaction(Some(outer)).expect("failed to begin nested");

        let err = env.begin_transaction(Some(outer)).expect_err("stale parent");
        assert!(matches!(
            err,
            Error::Transaction(TransactionError::NotInnermost { id }) if id == outer.id()
        ));

        env.rollback(inner).expect("failed to roll back inner");
        env.rollback(outer).expect("failed to roll back outer");
    }

    #[test]
    fn test_finalize_with_active_children() {
        let env = env();
        let outer = env.begin_transaction(None).expect("failed to begin");
        let inner = env.begin_transaction(Some(outer)).expect("failed to begin nested");

        let err = env.commit(outer).expect_err("outer has a child");
        assert!(matches!(
            err,
            Error::Transaction(TransactionError::ActiveChildren { depth: 1, .. })
        ));
        let err = env.rollback(outer).expect_err("outer has a child");
        assert!(err.is_transaction_error());

        env.rollback(inner).expect("failed to roll back inner");
        env.commit(outer).expect("failed to commit outer");
    }

    #[test]
    fn test_finalize_twice() {
        let env = env();
        let txn = env.begin_transaction(None).expect("failed to begin");
        env.commit(txn).expect("failed to commit");

        let err = env.commit(txn).expect_err("already committed");
        assert!(matches!(
            err,
            Error::Transaction(TransactionError::UnknownTransaction(id)) if id == txn.id()
        ));
    }

    #[test]
    fn test_disabled_transactions() {
        let env = Environment::open(Config::in_memory().transactions(false))
            .expect("failed to open environment");
        let err = env.begin_transaction(None).expect_err("transactions are off");
        assert!(matches!(err, Error::Transaction(TransactionError::Disabled)));
    }

    #[test]
    fn test_open_database_is_idempotent() {
        let env = env();
        let first = env.open_database("objects", DatabaseKind::BTree).expect("failed to open");
        let second = env.open_database("objects", DatabaseKind::default()).expect("failed to open");
        assert_eq!(first, second);
        assert_eq!(first.name(), "objects");
        assert_eq!(first.kind(), DatabaseKind::BTree);
    }

    #[test]
    fn test_run_in_transaction_rolls_back_on_panic() {
        let env = env();
        let db = env.open_database("objects", DatabaseKind::BTree).expect("failed to open");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: Result<()> = env.run_in_transaction(|_| {
                env.transact(|w| Ok(w.put(db.name(), b"k", b"v")?))?;
                panic!("body failed");
            });
        }));
        assert!(result.is_err());
        assert!(!env.in_transaction());

        let value = env.read(|txn| Ok(txn.get(db.name(), b"k")?)).expect("failed to read");
        assert_eq!(value, None);
    }

    #[test]
    fn test_run_in_transaction_unwinds_leaked_children() {
        let env = env();
        let db = env.open_database("objects", DatabaseKind::BTree).expect("failed to open");

        let result: Result<()> = env.run_in_transaction(|txn| {
            env.begin_transaction(Some(txn))?;
            env.transact(|w| Ok(w.put(db.name(), b"k", b"v")?))?;
            Ok(())
        });
        // The leaked child blocks the commit, and the whole stack is undone.
        assert!(matches!(
            result,
            Err(Error::Transaction(TransactionError::ActiveChildren { .. }))
        ));
        assert!(!env.in_transaction());

        let value = env.read(|txn| Ok(txn.get(db.name(), b"k")?)).expect("failed to read");
        assert_eq!(value, None);
    }

    #[test]
    fn test_handles_belong_to_their_thread() {
        let env = env();
        let txn = env.begin_transaction(None).expect("failed to begin");

        std::thread::scope(|s| {
            s.spawn(|| {
                assert_eq!(env.depth(), 0);
                assert_eq!(env.innermost().expect("innermost"), None);
                let err = env.commit(txn).expect_err("owned by another thread");
                assert!(matches!(
                    err,
                    Error::Transaction(TransactionError::UnknownTransaction(id)) if id == txn.id()
                ));
            })
            .join()
            .expect("thread panicked");
        });

        assert_eq!(env.depth(), 1);
        env.commit(txn).expect("failed to commit");
        assert!(env.txns.lock().expect("lock").is_empty());
    }

    #[test]
    fn test_failed_savepoint_rollback_abandons_transaction() {
        let env = Environment::with_engine(testing::FlakyEngine::default(), Config::in_memory());
        let outer = env.begin_transaction(None).expect("failed to begin");
        let inner = env.begin_transaction(Some(outer)).expect("failed to begin nested");
        env.transact(|w| Ok(w.put("t", b"k", b"v")?)).expect("failed to write");

        env.engine.fail_writes();
        let err = env.rollback(inner).expect_err("undo fails");
        assert!(matches!(err, Error::Transaction(TransactionError::Engine(_))));
        assert!(!env.in_transaction());
        assert_eq!(env.engine.aborted(), 1);

        // The half-undone outer transaction cannot be committed.
        let err = env.commit(outer).expect_err("outer was abandoned");
        assert!(matches!(
            err,
            Error::Transaction(TransactionError::UnknownTransaction(id)) if id == outer.id()
        ));
    }
}
