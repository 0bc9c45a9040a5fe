use std::{
    fmt, fs, io,
    num::ParseIntError,
    path::Path,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

/// Cheap change detector for a file: its modification time in nanoseconds since
/// the Unix epoch.
///
/// Two different contents written within the filesystem's timestamp resolution
/// share a fingerprint, so a mark can survive such an edit. Times before the
/// epoch collapse to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u128);

impl Fingerprint {
    pub fn from_modified(modified: SystemTime) -> Self {
        Fingerprint(
            modified
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
        )
    }

    /// Reads the current fingerprint of `path` straight from the filesystem.
    /// Nothing is cached, so a file rewritten a moment ago is seen as it is now.
    pub fn of(path: &Path) -> io::Result<Self> {
        let modified = fs::metadata(path)?.modified()?;
        Ok(Self::from_modified(modified))
    }

    pub fn as_nanos(self) -> u128 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u128>().map(Fingerprint)
    }
}

#[cfg(test)]
#[path = "fingerprint_tests.rs"]
mod tests;
