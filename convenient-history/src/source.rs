//! Recorded state of one input file.

use crate::paths;
use crate::timestamp::Timestamp;
use std::path::{Path, PathBuf};

/// A source file as it was when its output was last built.
///
/// The path is stored relative to the output directory so that the history
/// file stays valid when the whole tree is moved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceHistory {
    relative_path: String,
    last_modified: Timestamp,
}

impl SourceHistory {
    /// Create a source record.
    pub fn new(relative_path: impl Into<String>, last_modified: Timestamp) -> Self {
        Self {
            relative_path: relative_path.into(),
            last_modified,
        }
    }

    /// Path relative to the output directory (or absolute if it shares no directory with it).
    #[must_use]
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Modification time captured when the output was built.
    #[must_use]
    pub fn last_modified(&self) -> Timestamp {
        self.last_modified
    }

    /// Resolve the stored path against `base_dir`.
    #[must_use]
    pub fn absolute_path(&self, base_dir: &Path) -> PathBuf {
        paths::canonical_or_absolute(&base_dir.join(&self.relative_path))
    }
}
