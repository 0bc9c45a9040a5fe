use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::error::InvalidSuffix;

pub(crate) fn validate_suffix(suffix: String) -> Result<String, InvalidSuffix> {
    if suffix.is_empty() || suffix.contains('/') || suffix.contains(std::path::MAIN_SEPARATOR) {
        return Err(InvalidSuffix { suffix });
    }
    Ok(suffix)
}

/// `photos/a.jpg` + `.processed` -> `photos/a.jpg.processed`
pub(crate) fn sidecar_path(subject: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = subject.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

pub(crate) fn is_sidecar(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .is_some_and(|name| name.as_encoded_bytes().ends_with(suffix.as_bytes()))
}

/// Directory that has to be writable to create or replace the sidecar.
pub(crate) fn sidecar_dir(sidecar: &Path) -> &Path {
    match sidecar.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
