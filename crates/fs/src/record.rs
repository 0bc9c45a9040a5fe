use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::SystemTime,
};

/// One directory entry seen during a walk. Recomputed on every traversal.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub full_path: PathBuf,
    /// Directory holding the entry
    pub parent: PathBuf,
    /// Base file name, kept as an `OsString` so non UTF-8 names still reach the masks
    pub name: OsString,
    /// Last modification time, `None` where the platform cannot report it
    pub modified: Option<SystemTime>,
    pub is_dir: bool,
    pub is_file: bool,
    pub is_symlink: bool,
    /// Sockets, fifos, devices
    pub is_special: bool,
}

impl FileCandidate {
    /// Plain file that the engine may transform. Symlinks are never followed.
    #[inline]
    pub fn is_regular(&self) -> bool {
        self.is_file && !self.is_symlink
    }

    pub fn path(&self) -> &Path {
        &self.full_path
    }
}
