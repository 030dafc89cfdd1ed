//! Per-path mutual exclusion for read-modify-persist on report files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

/// Registry of one mutex per output path.
///
/// Locks are in-process only. Entries are never removed; the set of monthly
/// files a process touches is small.
#[derive(Debug, Default)]
pub struct PathLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        locks.entry(key.to_path_buf()).or_default().clone()
    }

    /// Run `f` while holding the lock for `key`. The lock is released when
    /// `f` returns, including on error and unwinding.
    pub fn with_lock<T>(&self, key: &Path, f: impl FnOnce() -> T) -> T {
        let lock = self.entry(key);
        let _guard = lock.lock();
        f()
    }

    /// Number of paths ever locked.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
