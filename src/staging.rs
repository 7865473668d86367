//! Local staging layout for cache archives
//!
//! Restored archives land in `.buildkite_restored_caches/`, freshly
//! compressed ones in `.buildkite_saved_caches/`, both relative to the
//! invocation's working directory. One `{resolved-key}.tar.gz` per entry.
//! Save consults the restored directory to skip re-uploading archives
//! that were already downloaded in the same run.

use crate::error::{CacheError, CacheResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory receiving downloaded archives during restore
pub const RESTORED_DIR: &str = ".buildkite_restored_caches";
/// Directory receiving freshly compressed archives during save
pub const SAVED_DIR: &str = ".buildkite_saved_caches";

/// Archive file name for a resolved cache key
pub fn archive_name(key: &str) -> String {
    format!("{key}.tar.gz")
}

/// Staging directories for one invocation, rooted at the working directory
#[derive(Debug, Clone)]
pub struct Staging {
    root: PathBuf,
}

impl Staging {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Staging rooted at the current working directory. The anka command
    /// maps the same directory into the VM, so scripts running there and
    /// host-side reads resolve the same archive files.
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    pub fn restored_dir(&self) -> PathBuf {
        self.root.join(RESTORED_DIR)
    }

    pub fn saved_dir(&self) -> PathBuf {
        self.root.join(SAVED_DIR)
    }

    /// Path where a restored archive for `key` would be staged
    pub fn restored_archive(&self, key: &str) -> PathBuf {
        self.restored_dir().join(archive_name(key))
    }

    /// Path where a saved archive for `key` is compressed to
    pub fn saved_archive(&self, key: &str) -> PathBuf {
        self.saved_dir().join(archive_name(key))
    }

    /// Create the restored-archives directory if it does not exist yet
    pub fn ensure_restored_dir(&self) -> CacheResult<()> {
        let dir = self.restored_dir();
        fs::create_dir_all(&dir)
            .map_err(|e| CacheError::io(format!("creating {}", dir.display()), e))
    }

    /// True if at least one archive was staged by restore
    pub fn has_restored_archives(&self) -> bool {
        read_archives(&self.restored_dir()).next().is_some()
    }
}

fn read_archives(dir: &Path) -> impl Iterator<Item = PathBuf> {
    dir.read_dir()
        .into_iter()
        .flatten()
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".tar.gz"))
        })
}
