use std::{ffi::OsStr, path::Path};

use globset::{GlobBuilder, GlobMatcher};

use crate::error::FsError;

/// Ordered file name patterns selecting which candidates a batch touches.
///
/// Patterns use globset syntax and are matched against the base file name only,
/// case-sensitively on every platform: `*.jpg` accepts `a.jpg` but not `c.JPG`.
/// A name matches when any pattern does; patterns are tried in order.
#[derive(Debug, Clone)]
pub struct MaskSet {
    patterns: Vec<String>,
    matchers: Vec<GlobMatcher>,
}

impl MaskSet {
    pub fn new<I, S>(patterns: I) -> Result<Self, FsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kept = Vec::new();
        let mut matchers = Vec::new();

        for pattern in patterns {
            let pattern = pattern.into();
            if pattern.trim().is_empty() {
                return Err(FsError::EmptyPattern);
            }

            let glob = GlobBuilder::new(&pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| FsError::Glob {
                    pattern: pattern.clone(),
                    source,
                })?;

            matchers.push(glob.compile_matcher());
            kept.push(pattern);
        }

        Ok(MaskSet {
            patterns: kept,
            matchers,
        })
    }

    #[inline]
    #[must_use]
    pub fn matches(&self, file_name: &OsStr) -> bool {
        let name = Path::new(file_name);
        self.matchers.iter().any(|m| m.is_match(name))
    }

    /// True if some mask picks names by ending in `suffix`, so everything it
    /// matches would also look like a sidecar with that suffix. A mask that
    /// matches names running on past the suffix, like `*`, does not count.
    pub fn selects_suffix(&self, suffix: &str) -> bool {
        let ending = format!("image{suffix}");
        let continued = format!("{ending}.more");
        self.matchers
            .iter()
            .any(|m| m.is_match(&ending) && !m.is_match(&continued))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

#[cfg(test)]
#[path = "masks_tests.rs"]
mod tests;
