use std::{
    fs, io,
    path::{Path, PathBuf},
};

use imbatch_fs::is_writable;
use imbatch_runtime::DEFAULT_MARK_SUFFIX;
use log::debug;

use crate::{
    atomic::write_atomic,
    error::{InvalidSuffix, MarkError},
    fingerprint::Fingerprint,
    sidecar::{is_sidecar, sidecar_dir, sidecar_path, validate_suffix},
};

/// Remembers that a file was processed in a given content state.
///
/// A mark is only trusted while the subject still has the fingerprint it had
/// when it was marked; any later modification makes it stale.
pub trait MarkStore {
    /// True if a mark for `path` could be written right now.
    fn can_mark(&self, path: &Path) -> bool;

    /// True if a mark exists for `path` and still matches its current fingerprint.
    fn is_marked(&self, path: &Path) -> bool;

    /// True if any mark is recorded for `path`, stale or not.
    fn has_mark(&self, path: &Path) -> bool;

    /// Record the current fingerprint of `path`, replacing any previous mark.
    fn mark(&self, path: &Path) -> Result<(), MarkError>;

    /// Forget the mark of `path`. A missing mark is an error.
    fn unmark(&self, path: &Path) -> Result<(), MarkError>;

    /// True if `path` is one of this store's own records and must not be
    /// processed as a subject.
    fn owns_path(&self, _path: &Path) -> bool {
        false
    }
}

impl<T: MarkStore + ?Sized> MarkStore for &T {
    fn can_mark(&self, path: &Path) -> bool {
        (**self).can_mark(path)
    }

    fn is_marked(&self, path: &Path) -> bool {
        (**self).is_marked(path)
    }

    fn has_mark(&self, path: &Path) -> bool {
        (**self).has_mark(path)
    }

    fn mark(&self, path: &Path) -> Result<(), MarkError> {
        (**self).mark(path)
    }

    fn unmark(&self, path: &Path) -> Result<(), MarkError> {
        (**self).unmark(path)
    }

    fn owns_path(&self, path: &Path) -> bool {
        (**self).owns_path(path)
    }
}

impl<T: MarkStore + ?Sized> MarkStore for Box<T> {
    fn can_mark(&self, path: &Path) -> bool {
        (**self).can_mark(path)
    }

    fn is_marked(&self, path: &Path) -> bool {
        (**self).is_marked(path)
    }

    fn has_mark(&self, path: &Path) -> bool {
        (**self).has_mark(path)
    }

    fn mark(&self, path: &Path) -> Result<(), MarkError> {
        (**self).mark(path)
    }

    fn unmark(&self, path: &Path) -> Result<(), MarkError> {
        (**self).unmark(path)
    }

    fn owns_path(&self, path: &Path) -> bool {
        (**self).owns_path(path)
    }
}

/// Marks kept as sidecar files next to the subject, e.g. `a.jpg.processed`,
/// holding the subject's fingerprint as decimal text.
#[derive(Debug, Clone)]
pub struct SidecarMarkStore {
    suffix: String,
}

impl SidecarMarkStore {
    pub fn new(suffix: impl Into<String>) -> Result<Self, InvalidSuffix> {
        Ok(Self {
            suffix: validate_suffix(suffix.into())?,
        })
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn mark_path(&self, path: &Path) -> PathBuf {
        sidecar_path(path, &self.suffix)
    }

    /// Fingerprint stored in the sidecar, `None` if absent or unreadable.
    pub fn recorded(&self, path: &Path) -> Option<Fingerprint> {
        let mark_path = self.mark_path(path);
        let text = match fs::read_to_string(&mark_path) {
            Ok(text) => text,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    debug!("[mark] cannot read {:?}: {e}", mark_path);
                }
                return None;
            }
        };

        match text.parse() {
            Ok(fp) => Some(fp),
            Err(e) => {
                debug!("[mark] malformed mark {:?}: {e}", mark_path);
                None
            }
        }
    }
}

impl Default for SidecarMarkStore {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_MARK_SUFFIX.to_string(),
        }
    }
}

impl MarkStore for SidecarMarkStore {
    fn can_mark(&self, path: &Path) -> bool {
        is_writable(sidecar_dir(&self.mark_path(path)))
    }

    fn is_marked(&self, path: &Path) -> bool {
        let Some(recorded) = self.recorded(path) else {
            return false;
        };

        match Fingerprint::of(path) {
            Ok(current) => current == recorded,
            Err(e) => {
                debug!("[mark] cannot fingerprint {:?}: {e}", path);
                false
            }
        }
    }

    fn has_mark(&self, path: &Path) -> bool {
        fs::symlink_metadata(self.mark_path(path)).is_ok()
    }

    fn mark(&self, path: &Path) -> Result<(), MarkError> {
        let fingerprint = Fingerprint::of(path).map_err(|source| MarkError::Io {
            operation: "fingerprint",
            path: path.to_path_buf(),
            source,
        })?;

        let mark_path = self.mark_path(path);
        write_atomic(&mark_path, format!("{fingerprint}\n").as_bytes()).map_err(|source| {
            MarkError::Io {
                operation: "write",
                path: path.to_path_buf(),
                source,
            }
        })?;

        debug!("[mark] {:?} marked at {fingerprint}", path);
        Ok(())
    }

    fn unmark(&self, path: &Path) -> Result<(), MarkError> {
        match fs::remove_file(self.mark_path(path)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(MarkError::Missing {
                path: path.to_path_buf(),
            }),
            Err(source) => Err(MarkError::Io {
                operation: "remove",
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn owns_path(&self, path: &Path) -> bool {
        is_sidecar(path, &self.suffix)
    }
}

#[cfg(test)]
#[path = "mark_tests.rs"]
mod tests;
