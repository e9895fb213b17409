//! Key-value storage backing the persistence slot
//!
//! The board lives in a single named slot. Two backends are provided:
//!
//! ```text
//! FileSlotStore                 # one JSON document per key
//!   <data_dir>/
//!     taskColumns.json          # slot contents
//!     taskColumns.json.lock     # advisory lock guarding reads and writes
//!
//! MemorySlotStore               # process-local map, optional byte quota
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

/// A local key-value facility holding string values.
pub trait SlotStore {
    /// Read a value; `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: SlotStore + ?Sized> SlotStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

impl<S: SlotStore + ?Sized> SlotStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// File-backed slots: `<dir>/<key>.json`, written atomically under a lock.
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileSlotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Path of the document holding `key`
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SlotStore for FileSlotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        match lock::read_locked(&path, self.lock_timeout_ms)? {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|err| {
                Error::OperationFailed(format!("{}: invalid UTF-8: {err}", path.display()))
            }),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock::write_atomic_locked(self.slot_path(key), value.as_bytes(), self.lock_timeout_ms)
    }
}

/// In-memory slots with an optional total size quota in bytes.
///
/// A `set` that would push the stored total past the quota fails with
/// [`Error::QuotaExceeded`] and leaves the previous value in place.
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    values: RefCell<HashMap<String, String>>,
    quota: Cell<Option<usize>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            values: RefCell::new(HashMap::new()),
            quota: Cell::new(Some(quota)),
        }
    }

    /// Change the quota; existing values are kept even if now over it.
    pub fn set_quota(&self, quota: Option<usize>) {
        self.quota.set(quota);
    }

    pub fn used_bytes(&self) -> usize {
        self.values
            .borrow()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }
}

impl SlotStore for MemorySlotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Some(limit) = self.quota.get() {
            let existing = self
                .values
                .borrow()
                .get(key)
                .map(|old| key.len() + old.len())
                .unwrap_or(0);
            let projected = self.used_bytes() - existing + key.len() + value.len();
            if projected > limit {
                return Err(Error::QuotaExceeded {
                    key: key.to_string(),
                    limit,
                });
            }
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
