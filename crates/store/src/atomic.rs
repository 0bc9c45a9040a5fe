use std::{
    fs::{self, File},
    io::{self, Write},
    path::Path,
};

use tempfile::{Builder, NamedTempFile};

const TEMP_PREFIX: &str = ".imbatch-";

/// True for the temp files [`write_atomic`] and [`copy_atomic`] stage writes in.
/// One survives only if the process died mid-write.
pub fn is_atomic_temp(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.as_encoded_bytes().starts_with(TEMP_PREFIX.as_bytes()))
}

fn temp_beside(path: &Path) -> io::Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Builder::new().prefix(TEMP_PREFIX).tempfile_in(parent)
}

fn persist(tmp: NamedTempFile, path: &Path) -> io::Result<()> {
    tmp.as_file().sync_all()?;

    // Same directory, so the rename either lands whole or not at all.
    tmp.persist(path).map_err(|e| e.error)?;

    #[cfg(unix)]
    {
        if let Some(parent) = path.parent()
            && let Ok(dir) = File::open(parent)
        {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

/// Replace `path` with `bytes` without ever exposing a partially written file.
///
/// The content goes to a temp file in the same directory that is then renamed
/// over `path`. If `path` already exists its permissions carry over.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = temp_beside(path)?;
    tmp.as_file_mut().write_all(bytes)?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions())?;
    }

    persist(tmp, path)
}

/// Copy `src` to `dst` atomically, giving `dst` the permissions of `src`.
/// Any previous `dst` is replaced in one step.
pub fn copy_atomic(src: &Path, dst: &Path) -> io::Result<()> {
    let mut input = File::open(src)?;
    let permissions = input.metadata()?.permissions();

    let mut tmp = temp_beside(dst)?;
    io::copy(&mut input, tmp.as_file_mut())?;
    fs::set_permissions(tmp.path(), permissions)?;

    persist(tmp, dst)
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
