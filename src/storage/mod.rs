//! Object storage abstraction
//!
//! Provides a narrow list/download/upload interface so the restore and
//! save flows can be tested with in-memory fakes. The production
//! implementation shells out to the `aws` CLI.

pub mod s3;

pub use s3::S3CliStore;

use crate::error::CacheResult;
use async_trait::async_trait;
use std::path::Path;

/// Capability set needed from object storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List object keys under `{prefix}/{key}`, ordered by last-modified
    /// ascending. Returns an empty list when nothing matches.
    async fn list(&self, key: &str) -> CacheResult<Vec<String>>;

    /// Download `object_key` into the destination directory
    async fn download(&self, object_key: &str, dest_dir: &Path) -> CacheResult<()>;

    /// Upload a local archive under the configured prefix
    async fn upload(&self, archive: &Path) -> CacheResult<()>;
}
