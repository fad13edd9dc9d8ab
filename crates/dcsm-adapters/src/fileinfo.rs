//! File metadata snapshots.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// A path plus its modification time as observed at capture.
///
/// The timestamp is a snapshot: it deliberately does not track later
/// changes to the file, so the encrypt/decrypt guards compare the state of
/// the world at startup.
#[derive(Debug, Clone)]
pub struct FileInfo {
    path: PathBuf,
    modified: Option<DateTime<Utc>>,
}

impl FileInfo {
    /// Capture `path` and its current mtime (if the file exists).
    pub fn capture(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let modified = std::fs::metadata(&path)
            .ok()
            .and_then(|meta| meta.modified().ok())
            .map(DateTime::<Utc>::from);
        Self { path, modified }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Does this path exist as a regular file right now?
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Modification time at capture; `None` if the file was absent.
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    /// Strictly newer than `other`. `false` whenever either timestamp is
    /// unknown; the guards treat "can't tell" as "don't overwrite".
    pub fn is_newer_than(&self, other: &FileInfo) -> bool {
        match (self.modified, other.modified) {
            (Some(mine), Some(theirs)) => mine > theirs,
            _ => false,
        }
    }

    /// Construct with an explicit timestamp, bypassing the filesystem.
    /// Test-only: production snapshots always come from [`FileInfo::capture`].
    #[cfg(test)]
    pub(crate) fn with_modified(path: impl Into<PathBuf>, modified: Option<DateTime<Utc>>) -> Self {
        Self {
            path: path.into(),
            modified,
        }
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
