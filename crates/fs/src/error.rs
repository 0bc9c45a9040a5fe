use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    /// A directory under the root could not be listed or one of its entries inspected.
    #[error("cannot walk {}", path.display())]
    Walk { path: PathBuf, source: io::Error },

    #[error("invalid mask {pattern:?}")]
    Glob {
        pattern: String,
        source: globset::Error,
    },

    #[error("empty mask pattern")]
    EmptyPattern,
}

impl FsError {
    pub(crate) fn walk(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FsError::Walk {
            path: path.into(),
            source,
        }
    }
}
