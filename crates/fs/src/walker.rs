use std::{
    collections::VecDeque,
    fs::{self, DirEntry},
    io,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{error::FsError, record::FileCandidate};

/// Start a recursive walk under `root`.
///
/// The root itself is not yielded. Every entry below it is, directories
/// included; symlinked directories are reported but never descended into.
/// Entries of one directory come out sorted by file name, and a directory's
/// own entries are all yielded before any of its subdirectories are read.
///
/// Each directory is listed completely before its first entry is yielded, so
/// files created in an already-listed directory while the walk is running
/// (sidecars, temp files) never show up.
///
/// An unreadable directory ends the walk with an error rather than being
/// skipped: a silently skipped subtree would look like a completed batch.
pub fn walk(root: &Path) -> Walk {
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    Walk {
        pending_dirs: vec![root],
        ready: VecDeque::new(),
        failed: false,
    }
}

pub struct Walk {
    /// Directories still to list, popped from the back
    pending_dirs: Vec<PathBuf>,
    /// Entries of the most recently listed directory
    ready: VecDeque<FileCandidate>,
    failed: bool,
}

impl Iterator for Walk {
    type Item = Result<FileCandidate, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some(candidate) = self.ready.pop_front() {
                return Some(Ok(candidate));
            }

            let dir = self.pending_dirs.pop()?;
            match list_dir(&dir) {
                Ok(entries) => {
                    // Reverse so the alphabetically first subdirectory is popped first.
                    self.pending_dirs.extend(
                        entries
                            .iter()
                            .rev()
                            .filter(|c| should_recurse(c))
                            .map(|c| c.full_path.clone()),
                    );
                    self.ready.extend(entries);
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

fn list_dir(dir: &Path) -> Result<Vec<FileCandidate>, FsError> {
    debug!("[walk] listing {:?}", dir);

    let rd = fs::read_dir(dir).map_err(|e| FsError::walk(dir, e))?;

    let mut entries = Vec::new();
    for entry_res in rd {
        let entry = entry_res.map_err(|e| FsError::walk(dir, e))?;
        let candidate = inspect_fs_entry(&entry, dir).map_err(|e| FsError::walk(entry.path(), e))?;
        entries.push(candidate);
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn should_recurse(c: &FileCandidate) -> bool {
    c.is_dir && !c.is_symlink
}

fn inspect_fs_entry(entry: &DirEntry, parent: &Path) -> io::Result<FileCandidate> {
    let full_path = entry.path();
    // lstat: a symlink is described as itself, never as its target
    let metadata = fs::symlink_metadata(&full_path)?;

    let file_type = metadata.file_type();
    let is_dir = file_type.is_dir();
    let is_symlink = file_type.is_symlink();
    let is_file = file_type.is_file();
    let is_special = !is_dir && !is_symlink && !is_file;

    Ok(FileCandidate {
        full_path,
        parent: parent.to_path_buf(),
        name: entry.file_name(),
        modified: metadata.modified().ok(),
        is_dir,
        is_file,
        is_symlink,
        is_special,
    })
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
