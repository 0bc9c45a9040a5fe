//! Permission probes used by validation before any file is touched.
//!
//! On unix these ask the kernel through `access(2)`, so ACLs, read-only mounts and
//! the effective uid are all taken into account. Elsewhere only the read-only bit is
//! consulted.

use std::path::Path;

#[cfg(unix)]
use nix::unistd::{AccessFlags, access};

#[cfg(unix)]
pub fn is_readable_writable(path: &Path) -> bool {
    access(path, AccessFlags::R_OK | AccessFlags::W_OK).is_ok()
}

#[cfg(unix)]
pub fn is_writable(path: &Path) -> bool {
    access(path, AccessFlags::W_OK).is_ok()
}

#[cfg(not(unix))]
pub fn is_readable_writable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_writable(path: &Path) -> bool {
    is_readable_writable(path)
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
