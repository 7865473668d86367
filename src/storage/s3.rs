//! S3 object store backed by the `aws` CLI
//!
//! Uses the CLI instead of an SDK to keep the agent image dependency-free.
//! Listings are sorted server-side by LastModified so the newest match is
//! always the last element.

use crate::error::{CacheError, CacheResult};
use crate::storage::ObjectStore;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Object store talking to S3 through the `aws` command-line tool
pub struct S3CliStore {
    bucket: String,
    prefix: String,
}

impl S3CliStore {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    async fn run_aws(&self, args: &[&str]) -> CacheResult<std::process::Output> {
        debug!("Executing: aws {:?}", args);

        Command::new("aws")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CacheError::command_failed(format!("aws {:?}", args), e))
    }
}

#[async_trait]
impl ObjectStore for S3CliStore {
    async fn list(&self, key: &str) -> CacheResult<Vec<String>> {
        let prefix = format!("{}/{}", self.prefix, key);
        let result = self
            .run_aws(&[
                "s3api",
                "list-objects",
                "--bucket",
                &self.bucket,
                "--prefix",
                &prefix,
                "--query",
                "sort_by(Contents,&LastModified)[].Key",
                "--output",
                "json",
            ])
            .await;

        // A failed listing is treated as a miss, not an error, so a cold
        // bucket or prefix still lets the build proceed uncached.
        let output = match result {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                debug!(
                    "Cache listing for {} failed: {}",
                    prefix,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                return Ok(Vec::new());
            }
            Err(e) => {
                debug!("Cache listing for {} failed: {}", prefix, e);
                return Ok(Vec::new());
            }
        };

        // The query yields `null` when no objects match the prefix
        match serde_json::from_slice::<Option<Vec<String>>>(&output.stdout) {
            Ok(keys) => Ok(keys.unwrap_or_default()),
            Err(e) => {
                debug!("Unparseable cache listing for {}: {}", prefix, e);
                Ok(Vec::new())
            }
        }
    }

    async fn download(&self, object_key: &str, dest_dir: &Path) -> CacheResult<()> {
        let uri = format!("s3://{}/{}", self.bucket, object_key);
        println!("Downloading cache {uri}");

        let dest = format!("{}/", dest_dir.display());
        let output = self.run_aws(&["s3", "cp", &uri, &dest]).await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CacheError::command_exec(
                format!("aws s3 cp {uri}"),
                String::from_utf8_lossy(&output.stderr).trim(),
            ))
        }
    }

    async fn upload(&self, archive: &Path) -> CacheResult<()> {
        let source = archive.display().to_string();
        let dest = format!("s3://{}/{}/", self.bucket, self.prefix);

        let output = self.run_aws(&["s3", "cp", &source, &dest]).await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CacheError::command_exec(
                format!("aws s3 cp {source} {dest}"),
                String::from_utf8_lossy(&output.stderr).trim(),
            ))
        }
    }
}
