use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkError {
    #[error("cannot {operation} mark for {}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("no mark recorded for {}", path.display())]
    Missing { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("cannot {operation} backup of {}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("no backup stored for {}", path.display())]
    Missing { path: PathBuf },
}

impl BackupError {
    /// The store had nothing for this path. Callers that already consumed the
    /// backup (a rename-based restore) can treat this as success.
    pub fn is_missing(&self) -> bool {
        matches!(self, BackupError::Missing { .. })
    }
}

#[derive(Debug, Error)]
#[error("invalid sidecar suffix {suffix:?}: must be non-empty and contain no path separator")]
pub struct InvalidSuffix {
    pub suffix: String,
}
