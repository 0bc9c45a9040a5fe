//! Stores that keep their records in process memory.
//!
//! Useful for embedding the engine where sidecar files are unwanted, and in
//! tests. Records do not survive the process.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    atomic::write_atomic,
    backup::BackupStore,
    error::{BackupError, MarkError},
    fingerprint::Fingerprint,
    mark::MarkStore,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // The maps stay consistent across a panic: every update is a single insert or remove.
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct MemoryMarkStore {
    marks: Mutex<HashMap<PathBuf, Fingerprint>>,
}

impl MemoryMarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self, path: &Path) -> Option<Fingerprint> {
        lock(&self.marks).get(path).copied()
    }

    pub fn len(&self) -> usize {
        lock(&self.marks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MarkStore for MemoryMarkStore {
    fn can_mark(&self, _path: &Path) -> bool {
        true
    }

    fn is_marked(&self, path: &Path) -> bool {
        match (self.recorded(path), Fingerprint::of(path)) {
            (Some(recorded), Ok(current)) => recorded == current,
            _ => false,
        }
    }

    fn has_mark(&self, path: &Path) -> bool {
        lock(&self.marks).contains_key(path)
    }

    fn mark(&self, path: &Path) -> Result<(), MarkError> {
        let fingerprint = Fingerprint::of(path).map_err(|source| MarkError::Io {
            operation: "fingerprint",
            path: path.to_path_buf(),
            source,
        })?;
        lock(&self.marks).insert(path.to_path_buf(), fingerprint);
        Ok(())
    }

    fn unmark(&self, path: &Path) -> Result<(), MarkError> {
        match lock(&self.marks).remove(path) {
            Some(_) => Ok(()),
            None => Err(MarkError::Missing {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Snapshot bytes held in memory. Restoring writes them back atomically and
/// keeps the snapshot until it is deleted.
#[derive(Debug, Default)]
pub struct MemoryBackupStore {
    backups: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryBackupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        lock(&self.backups).contains_key(path)
    }

    pub fn len(&self) -> usize {
        lock(&self.backups).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BackupStore for MemoryBackupStore {
    fn can_backup(&self, _path: &Path) -> bool {
        true
    }

    fn backup(&self, path: &Path) -> Result<(), BackupError> {
        let bytes = fs::read(path).map_err(|source| BackupError::Io {
            operation: "create",
            path: path.to_path_buf(),
            source,
        })?;
        lock(&self.backups).insert(path.to_path_buf(), bytes);
        Ok(())
    }

    fn has_backup(&self, path: &Path) -> bool {
        self.contains(path)
    }

    fn restore_last_backup(&self, path: &Path) -> Result<(), BackupError> {
        let guard = lock(&self.backups);
        let Some(bytes) = guard.get(path) else {
            return Err(BackupError::Missing {
                path: path.to_path_buf(),
            });
        };

        write_atomic(path, bytes).map_err(|source| BackupError::Io {
            operation: "restore",
            path: path.to_path_buf(),
            source,
        })
    }

    fn delete_last_backup(&self, path: &Path) -> Result<(), BackupError> {
        match lock(&self.backups).remove(path) {
            Some(_) => Ok(()),
            None => Err(BackupError::Missing {
                path: path.to_path_buf(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
