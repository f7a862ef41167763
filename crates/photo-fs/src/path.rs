//! Normalized path handling and safe output-path resolution

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Rendered output paths are stored in sync state in this form so that the
/// same photo produces the same recorded path on every platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes and collapses repeated slashes.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let mut normalized = String::with_capacity(path_str.len());
        let mut prev_slash = false;
        for ch in path_str.chars() {
            let ch = if ch == '\\' { '/' } else { ch };
            if ch == '/' && prev_slash {
                continue;
            }
            prev_slash = ch == '/';
            normalized.push(ch);
        }
        Self { inner: normalized }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        if self.inner.is_empty() {
            return Self::new(segment);
        }
        Self::new(format!("{}/{}", self.inner.trim_end_matches('/'), segment))
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// True for paths starting at a filesystem root or drive letter.
    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/')
            || self
                .inner
                .as_bytes()
                .get(1)
                .is_some_and(|b| *b == b':' && self.inner.as_bytes()[0].is_ascii_alphabetic())
    }

    /// True if any segment is `..`.
    pub fn has_traversal(&self) -> bool {
        self.inner.split('/').any(|segment| segment == "..")
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

/// Resolve a relative path inside `base`, refusing anything that could land
/// outside it.
///
/// The relative path must not be absolute and must not contain `..`
/// segments. When part of the destination already exists, its canonical form
/// must still live under the canonical base, which catches symlinks pointing
/// elsewhere.
///
/// # Errors
///
/// Returns [`Error::PathTraversal`] for lexically unsafe input and
/// [`Error::PathEscape`] when an existing ancestor resolves outside `base`.
pub fn resolve_within(base: &Path, relative: &str) -> Result<PathBuf> {
    let rel = NormalizedPath::new(relative);
    if rel.as_str().is_empty() || rel.is_absolute() || rel.has_traversal() {
        return Err(Error::PathTraversal {
            path: relative.to_string(),
        });
    }

    let joined = base.join(rel.to_native());
    if !base.exists() {
        return Ok(joined);
    }

    let base_canon = dunce::canonicalize(base).map_err(|e| Error::io(base, e))?;
    let mut probe = joined.as_path();
    let existing = loop {
        if probe.exists() {
            break probe;
        }
        match probe.parent() {
            Some(parent) => probe = parent,
            None => return Ok(joined),
        }
    };
    let existing_canon = dunce::canonicalize(existing).map_err(|e| Error::io(existing, e))?;
    if !existing_canon.starts_with(&base_canon) {
        return Err(Error::PathEscape {
            path: joined,
            base: base_canon,
        });
    }

    Ok(joined)
}
