use std::{
    fs, io,
    path::{Path, PathBuf},
};

use imbatch_fs::is_writable;
use imbatch_runtime::DEFAULT_BACKUP_SUFFIX;
use log::debug;

use crate::{
    atomic::copy_atomic,
    error::{BackupError, InvalidSuffix},
    sidecar::{is_sidecar, sidecar_dir, sidecar_path, validate_suffix},
};

/// Keeps at most one restorable snapshot of each file's bytes.
pub trait BackupStore {
    /// True if a backup of `path` could be written right now.
    fn can_backup(&self, path: &Path) -> bool;

    /// Snapshot the current bytes of `path`, replacing any older snapshot in one
    /// step. On failure no partial snapshot is left for a later restore to read.
    fn backup(&self, path: &Path) -> Result<(), BackupError>;

    /// True if a snapshot of `path` is stored.
    fn has_backup(&self, path: &Path) -> bool;

    /// Overwrite `path` with the stored snapshot.
    fn restore_last_backup(&self, path: &Path) -> Result<(), BackupError>;

    /// Discard the stored snapshot. Reports [`BackupError::Missing`] if there is none.
    fn delete_last_backup(&self, path: &Path) -> Result<(), BackupError>;

    /// True if `path` is one of this store's own records.
    fn owns_path(&self, _path: &Path) -> bool {
        false
    }
}

impl<T: BackupStore + ?Sized> BackupStore for &T {
    fn can_backup(&self, path: &Path) -> bool {
        (**self).can_backup(path)
    }

    fn backup(&self, path: &Path) -> Result<(), BackupError> {
        (**self).backup(path)
    }

    fn has_backup(&self, path: &Path) -> bool {
        (**self).has_backup(path)
    }

    fn restore_last_backup(&self, path: &Path) -> Result<(), BackupError> {
        (**self).restore_last_backup(path)
    }

    fn delete_last_backup(&self, path: &Path) -> Result<(), BackupError> {
        (**self).delete_last_backup(path)
    }

    fn owns_path(&self, path: &Path) -> bool {
        (**self).owns_path(path)
    }
}

impl<T: BackupStore + ?Sized> BackupStore for Box<T> {
    fn can_backup(&self, path: &Path) -> bool {
        (**self).can_backup(path)
    }

    fn backup(&self, path: &Path) -> Result<(), BackupError> {
        (**self).backup(path)
    }

    fn has_backup(&self, path: &Path) -> bool {
        (**self).has_backup(path)
    }

    fn restore_last_backup(&self, path: &Path) -> Result<(), BackupError> {
        (**self).restore_last_backup(path)
    }

    fn delete_last_backup(&self, path: &Path) -> Result<(), BackupError> {
        (**self).delete_last_backup(path)
    }

    fn owns_path(&self, path: &Path) -> bool {
        (**self).owns_path(path)
    }
}

/// Backups kept as sidecar copies next to the subject, e.g. `a.jpg.batchbackup`.
///
/// Restoring renames the sidecar over the subject, which consumes it; the
/// following delete then reports [`BackupError::Missing`].
#[derive(Debug, Clone)]
pub struct SidecarBackupStore {
    suffix: String,
}

impl SidecarBackupStore {
    pub fn new(suffix: impl Into<String>) -> Result<Self, InvalidSuffix> {
        Ok(Self {
            suffix: validate_suffix(suffix.into())?,
        })
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn backup_path(&self, path: &Path) -> PathBuf {
        sidecar_path(path, &self.suffix)
    }

    fn io_error(operation: &'static str, path: &Path, source: io::Error) -> BackupError {
        BackupError::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    fn missing(path: &Path) -> BackupError {
        BackupError::Missing {
            path: path.to_path_buf(),
        }
    }
}

impl Default for SidecarBackupStore {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

impl BackupStore for SidecarBackupStore {
    fn can_backup(&self, path: &Path) -> bool {
        is_writable(sidecar_dir(&self.backup_path(path)))
    }

    fn backup(&self, path: &Path) -> Result<(), BackupError> {
        let backup_path = self.backup_path(path);
        copy_atomic(path, &backup_path).map_err(|e| Self::io_error("create", path, e))?;
        debug!("[backup] {:?} -> {:?}", path, backup_path);
        Ok(())
    }

    fn has_backup(&self, path: &Path) -> bool {
        fs::symlink_metadata(self.backup_path(path)).is_ok()
    }

    fn restore_last_backup(&self, path: &Path) -> Result<(), BackupError> {
        let backup_path = self.backup_path(path);
        match fs::symlink_metadata(&backup_path) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Self::missing(path)),
            Err(e) => return Err(Self::io_error("inspect", path, e)),
        }

        fs::rename(&backup_path, path).map_err(|e| Self::io_error("restore", path, e))?;
        debug!("[backup] restored {:?}", path);
        Ok(())
    }

    fn delete_last_backup(&self, path: &Path) -> Result<(), BackupError> {
        match fs::remove_file(self.backup_path(path)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Self::missing(path)),
            Err(e) => Err(Self::io_error("delete", path, e)),
        }
    }

    fn owns_path(&self, path: &Path) -> bool {
        is_sidecar(path, &self.suffix)
    }
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
