//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// anka-cache - Buildkite build-cache manager for Anka VM agents
///
/// Restores previously saved cache archives from S3 into the build VM,
/// or compresses and uploads the VM's configured paths as new archives.
#[derive(Parser, Debug)]
#[command(name = "anka-cache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Cache operation to perform
    #[arg(value_enum)]
    pub command: CacheCommand,

    /// The full anka run command used to execute inside the VM
    #[arg(long)]
    pub anka_command: String,

    /// Prefix for cache S3 keys
    #[arg(long)]
    pub s3_prefix: String,

    /// S3 bucket to download and restore caches from
    #[arg(long)]
    pub s3_bucket: String,

    /// YAML config listing the cache entries
    #[arg(long)]
    pub config_file: PathBuf,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available cache operations
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheCommand {
    /// Download the best-matching archives and extract them in the VM
    RestoreCaches,
    /// Compress and upload the configured paths
    SaveCaches,
}
