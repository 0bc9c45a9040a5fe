use std::{
    io,
    path::{Path, PathBuf},
};

use imbatch_fs::FsError;
use imbatch_store::{BackupError, MarkError};
use thiserror::Error;

/// Failure of the decode, transform or encode step for one file.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("cannot decode image: {reason}")]
    Decode { reason: String },

    #[error("cannot encode image: {reason}")]
    Encode { reason: String },

    #[error("transform failed: {reason}")]
    Failed { reason: String },

    #[error("i/o error during {operation}")]
    Io {
        operation: &'static str,
        source: io::Error,
    },
}

impl TransformError {
    pub fn decode(reason: impl Into<String>) -> Self {
        TransformError::Decode {
            reason: reason.into(),
        }
    }

    pub fn encode(reason: impl Into<String>) -> Self {
        TransformError::Encode {
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        TransformError::Failed {
            reason: reason.into(),
        }
    }

    pub(crate) fn io(operation: &'static str, source: io::Error) -> Self {
        TransformError::Io { operation, source }
    }
}

/// Why a candidate was refused before anything was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationReason {
    #[error("directory {} is not readable and writable", .0.display())]
    DirectoryAccess(PathBuf),

    #[error("file is not readable and writable")]
    FileAccess,

    #[error("mark store cannot mark it")]
    CannotMark,

    #[error("backup store cannot back it up")]
    CannotBackup,
}

/// Error that aborted a `process` or `unprocess` run.
///
/// Every variant except `Walk` names the file the run stopped at. Files
/// committed earlier in the same run stay committed.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Walk(#[from] FsError),

    /// Refused before any side effect for this file.
    #[error("cannot process {}: {reason}", path.display())]
    Validation {
        path: PathBuf,
        reason: ValidationReason,
    },

    /// Snapshot, restore or delete failed outside a rollback.
    #[error("backup step failed for {}", path.display())]
    Backup { path: PathBuf, source: BackupError },

    /// The file was rolled back to its original bytes.
    #[error("transform failed for {}", path.display())]
    Transform {
        path: PathBuf,
        source: TransformError,
    },

    /// Marking failed after a successful transform; the file was rolled back.
    #[error("cannot record {} as processed", path.display())]
    Mark { path: PathBuf, source: MarkError },

    /// Rolling back after `cause` failed too. Unless `restored` is set, the file
    /// may be left transformed but unmarked and needs manual attention.
    #[error("rollback failed for {} (restored: {restored}) after: {cause}", path.display())]
    Rollback {
        path: PathBuf,
        cause: Box<BatchError>,
        source: BackupError,
        restored: bool,
    },
}

impl BatchError {
    pub fn path(&self) -> Option<&Path> {
        match self {
            BatchError::Walk(FsError::Walk { path, .. }) => Some(path),
            BatchError::Walk(_) => None,
            BatchError::Validation { path, .. }
            | BatchError::Backup { path, .. }
            | BatchError::Transform { path, .. }
            | BatchError::Mark { path, .. }
            | BatchError::Rollback { path, .. } => Some(path),
        }
    }

    /// Short name of the failure kind, for reports and history.
    pub fn kind(&self) -> &'static str {
        match self {
            BatchError::Walk(_) => "walk",
            BatchError::Validation { .. } => "validation",
            BatchError::Backup { .. } => "backup",
            BatchError::Transform { .. } => "transform",
            BatchError::Mark { .. } => "mark",
            BatchError::Rollback { .. } => "rollback",
        }
    }
}
