//! anka-cache - Buildkite build-cache manager for Anka VM agents
//!
//! Restores the best-matching previously saved cache archive from S3 into
//! an Anka build VM, or compresses and uploads the VM's configured paths
//! as a new archive.

pub mod cli;
pub mod config;
pub mod error;
pub mod resolver;
pub mod staging;
pub mod storage;
pub mod template;
pub mod vm;

pub use error::{CacheError, CacheResult};
