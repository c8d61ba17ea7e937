//! Served-question history ledger.
//!
//! The ledger remembers, per user, which question ids have already been
//! served. Persistence goes through the [`HistoryStore`] trait, which reads
//! and writes the whole ledger as one blob (a map of user id to
//! `{ "usedIds": [...] }`). Storage failures never surface to callers: an
//! unreadable ledger reads as empty and a failed write is logged and dropped.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// The persisted ledger: user id → history.
pub type HistoryMap = BTreeMap<String, UserHistory>;

/// Questions already served to one user, in the order they were first served.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHistory {
    #[serde(default)]
    pub used_ids: Vec<String>,
}

impl UserHistory {
    /// Ids as a set, for membership checks.
    pub fn used_set(&self) -> HashSet<&str> {
        self.used_ids.iter().map(String::as_str).collect()
    }

    /// Union `ids` into the history. Existing ids keep their position, new
    /// ids are appended in the order given, and nothing is stored twice.
    pub fn record<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let mut known: HashSet<String> = self.used_ids.iter().cloned().collect();
        for id in ids {
            if known.insert(id.to_string()) {
                self.used_ids.push(id.to_string());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.used_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used_ids.is_empty()
    }
}

/// Durable key-value backing for the ledger.
pub trait HistoryStore: Send + Sync {
    /// Read the whole ledger. A store with nothing saved yet returns an empty map.
    fn load(&self) -> Result<HistoryMap, StorageError>;

    /// Replace the whole ledger.
    fn save(&self, history: &HistoryMap) -> Result<(), StorageError>;
}

/// Process-local store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    inner: Mutex<HistoryMap>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing ledger.
    pub fn with_history(history: HistoryMap) -> Self {
        Self {
            inner: Mutex::new(history),
        }
    }

    /// Snapshot of what is currently stored.
    pub fn snapshot(&self) -> HistoryMap {
        lock(&self.inner).clone()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<HistoryMap, StorageError> {
        Ok(lock(&self.inner).clone())
    }

    fn save(&self, history: &HistoryMap) -> Result<(), StorageError> {
        *lock(&self.inner) = history.clone();
        Ok(())
    }
}

/// Ledger persisted as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileHistoryStore {
    fn load(&self) -> Result<HistoryMap, StorageError> {
        if !self.path.exists() {
            return Ok(HistoryMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HistoryMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, history: &HistoryMap) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(history)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Serialized access to a [`HistoryStore`].
///
/// The store holds every user in one blob, so each read-modify-write cycle
/// runs under a single ledger-wide lock. Holding a [`LedgerEntry`] keeps the
/// lock until it is committed or dropped.
#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: HistoryStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current history for `user_id` (empty if unknown or unreadable).
    pub fn user_history(&self, user_id: &str) -> UserHistory {
        let _guard = lock(&self.write_lock);
        self.load_or_empty()
            .remove(user_id)
            .unwrap_or_default()
    }

    /// Ids already served to `user_id`.
    pub fn used_ids(&self, user_id: &str) -> Vec<String> {
        self.user_history(user_id).used_ids
    }

    /// Open the user's entry for a read-modify-write cycle.
    pub fn entry(&self, user_id: &str) -> LedgerEntry<'_, S> {
        let guard = lock(&self.write_lock);
        let mut ledger = self.load_or_empty();
        ledger.entry(user_id.to_string()).or_default();
        LedgerEntry {
            _guard: guard,
            store: &self.store,
            ledger,
            user_id: user_id.to_string(),
        }
    }

    fn load_or_empty(&self) -> HistoryMap {
        match self.store.load() {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("treating question history as empty: {e}");
                HistoryMap::new()
            }
        }
    }
}

/// One user's history, checked out of the ledger under its lock.
pub struct LedgerEntry<'a, S: HistoryStore> {
    _guard: MutexGuard<'a, ()>,
    store: &'a S,
    ledger: HistoryMap,
    user_id: String,
}

impl<S: HistoryStore> LedgerEntry<'_, S> {
    pub fn history(&self) -> &UserHistory {
        // `Ledger::entry` always inserts the user
        &self.ledger[&self.user_id]
    }

    /// Union `ids` into the user's history and persist the whole ledger.
    /// A failed write is logged and dropped.
    pub fn commit<'i>(mut self, ids: impl IntoIterator<Item = &'i str>) {
        self.ledger
            .entry(self.user_id.clone())
            .or_default()
            .record(ids);

        if let Err(e) = self.store.save(&self.ledger) {
            tracing::warn!(
                "could not persist question history for '{}': {e}",
                self.user_id
            );
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
