//! File-backed record store.
//!
//! The whole record set lives in one JSON file (an [`Envelope`]). Every
//! operation loads the envelope, works on it, and for mutations writes the
//! complete envelope back. A process-wide readers-writer lock covers the full
//! load -> mutate -> save cycle, so concurrent inserts can never compute the
//! same id.
//!
//! The lock is in-process only. Two separate processes pointed at the same
//! file are not coordinated.
//!
//! A panic inside a caller's predicate, action or transform poisons the lock.
//! Every write replaces the file with a single rename, so the file still holds
//! a complete envelope at that point and the next operation simply takes the
//! lock back.

mod file;

use crate::error::{StoreError, StoreResult};
use crate::types::Envelope;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// A record that can live in a [`RecordStore`].
///
/// `Default` provides the blank record handed to the insert transform.
pub trait Record: Clone + Default + Serialize + DeserializeOwned {
    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
}

/// Lock mode held for the duration of a [`RecordStore::scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Concurrent with other shared scans.
    Shared,
    /// Excludes every other reader and writer.
    Exclusive,
}

/// Maximum number of matches a scan acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    #[default]
    Unbounded,
    At(usize),
}

impl Limit {
    fn reached(self, count: usize) -> bool {
        match self {
            Limit::Unbounded => false,
            Limit::At(max) => count >= max,
        }
    }
}

/// Negative values mean unbounded.
impl From<i64> for Limit {
    fn from(value: i64) -> Self {
        usize::try_from(value).map_or(Limit::Unbounded, Limit::At)
    }
}

/// Options applied when the store writes its file.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// Write indented JSON.
    pub pretty: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

struct Inner {
    path: PathBuf,
    options: StoreOptions,
    lock: RwLock<()>,
}

/// Handle to a record file. Cloning shares the path and the lock.
pub struct RecordStore<R> {
    inner: Arc<Inner>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for RecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _record: PhantomData,
        }
    }
}

// Held only for its Drop.
#[allow(dead_code)]
enum Guard<'a> {
    Shared(RwLockReadGuard<'a, ()>),
    Exclusive(RwLockWriteGuard<'a, ()>),
}

impl<R: Record> RecordStore<R> {
    /// Open the store at `path`, creating the file (and its directory) if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: StoreOptions) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        file::ensure_file(&path)?;
        debug!(path = %path.display(), pretty = options.pretty, "Opened record store");

        Ok(Self {
            inner: Arc::new(Inner {
                path,
                options,
                lock: RwLock::new(()),
            }),
            _record: PhantomData,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    fn acquire(&self, mode: AccessMode, operation: &'static str) -> Guard<'_> {
        let lock = &self.inner.lock;
        if lock.is_poisoned() {
            warn!(operation, path = %self.inner.path.display(), "Recovering poisoned store lock");
            lock.clear_poison();
        }
        match mode {
            AccessMode::Shared => {
                Guard::Shared(lock.read().unwrap_or_else(PoisonError::into_inner))
            }
            AccessMode::Exclusive => {
                Guard::Exclusive(lock.write().unwrap_or_else(PoisonError::into_inner))
            }
        }
    }

    fn load(&self) -> StoreResult<Envelope<R>> {
        file::read_envelope(&self.inner.path)
    }

    fn save(&self, envelope: &Envelope<R>) -> StoreResult<()> {
        file::write_envelope(&self.inner.path, envelope, self.inner.options.pretty)
    }

    /// Walk the records in order, calling `action` on each one matching
    /// `predicate` until `limit` matches have been handled.
    ///
    /// The lock is held in `mode` for the whole walk. Returns whether anything
    /// matched.
    pub fn scan<P, A>(
        &self,
        predicate: P,
        action: A,
        limit: Limit,
        mode: AccessMode,
    ) -> StoreResult<bool>
    where
        P: Fn(&R) -> bool,
        A: FnMut(&R),
    {
        let _guard = self.acquire(mode, "scan");
        let envelope = self.load()?;
        Ok(visit(&envelope.records, predicate, action, limit))
    }

    /// First record matching `predicate`.
    pub fn find_one<P>(&self, predicate: P) -> StoreResult<Option<R>>
    where
        P: Fn(&R) -> bool,
    {
        let mut found = None;
        self.scan(
            predicate,
            |record| found = Some(record.clone()),
            Limit::At(1),
            AccessMode::Shared,
        )?;
        Ok(found)
    }

    /// All records matching `predicate`, up to `limit`, in insertion order.
    pub fn find_many<P>(&self, predicate: P, limit: Limit) -> StoreResult<Vec<R>>
    where
        P: Fn(&R) -> bool,
    {
        let mut results = Vec::new();
        self.scan(
            predicate,
            |record| results.push(record.clone()),
            limit,
            AccessMode::Shared,
        )?;
        Ok(results)
    }

    /// Insert (`id == 0`) or update the record with `id`.
    ///
    /// On insert the transform receives a blank record already carrying the
    /// new id. On update it receives a copy of the stored record. Either way
    /// the id is restored after the transform runs. Updating an unknown id
    /// fails with [`StoreError::NotFound`] without touching the file, and an
    /// insert once the counter sits at `u64::MAX` fails with
    /// [`StoreError::IdExhausted`].
    pub fn upsert<T>(&self, id: u64, transform: T) -> StoreResult<R>
    where
        T: FnOnce(R) -> R,
    {
        let _guard = self.acquire(AccessMode::Exclusive, "upsert");
        let mut envelope = self.load()?;

        let record = if id == 0 {
            // Never reissue an id still present in the file.
            let current = envelope.current_increment.max(envelope.max_id());
            let new_id = current
                .checked_add(1)
                .ok_or(StoreError::IdExhausted { current })?;

            let mut blank = R::default();
            blank.set_id(new_id);
            let mut record = transform(blank);
            record.set_id(new_id);

            envelope.records.push(record.clone());
            envelope.current_increment = new_id;
            self.save(&envelope)?;
            info!(id = new_id, "Inserted record");
            record
        } else {
            let slot = envelope
                .records
                .iter_mut()
                .find(|record| record.id() == id)
                .ok_or(StoreError::NotFound { id })?;

            let mut record = transform(slot.clone());
            record.set_id(id);
            *slot = record.clone();

            self.save(&envelope)?;
            info!(id, "Updated record");
            record
        };

        Ok(record)
    }

    /// Delete the first record with `id`. Returns `false` (and leaves the
    /// file alone) when there is no such record.
    pub fn remove(&self, id: u64) -> StoreResult<bool> {
        let _guard = self.acquire(AccessMode::Exclusive, "remove");
        let mut envelope = self.load()?;

        let Some(index) = envelope.records.iter().position(|record| record.id() == id) else {
            debug!(id, "Nothing to remove");
            return Ok(false);
        };

        envelope.records.remove(index);
        self.save(&envelope)?;
        info!(id, "Removed record");
        Ok(true)
    }

    /// Copy of the whole envelope, read under the shared lock.
    pub fn snapshot(&self) -> StoreResult<Envelope<R>> {
        let _guard = self.acquire(AccessMode::Shared, "snapshot");
        self.load()
    }
}

fn visit<R, P, A>(records: &[R], predicate: P, mut action: A, limit: Limit) -> bool
where
    P: Fn(&R) -> bool,
    A: FnMut(&R),
{
    let mut matched = 0;
    for record in records {
        if limit.reached(matched) {
            break;
        }
        if predicate(record) {
            action(record);
            matched += 1;
        }
    }
    matched > 0
}
