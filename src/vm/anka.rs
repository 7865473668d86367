//! Anka VM runner
//!
//! Wraps the full `anka run ...` command line provided by the agent via
//! `--anka-command`. The command is an opaque string chosen by the
//! operator, so the composed line is handed to `sh -c` rather than being
//! tokenized here.

use crate::error::{CacheError, CacheResult};
use crate::vm::VmRunner;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Path inside the Anka VM where the build checkout lives
pub const VM_WORKDIR: &str = "/Users/anka/app";

/// VM runner invoking the configured Anka run command
pub struct AnkaVm {
    command: String,
}

impl AnkaVm {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl VmRunner for AnkaVm {
    async fn run_shell(&self, script: &str) -> CacheResult<()> {
        let line = format!("{} bash -c {}", self.command, shell_quote(script));
        debug!("Executing in VM: {}", line);

        let output = Command::new("sh")
            .args(["-c", &line])
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CacheError::command_failed(line.clone(), e))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CacheError::command_exec(
                line,
                String::from_utf8_lossy(&output.stderr).trim(),
            ))
        }
    }
}

/// Quote a string for POSIX `sh`, surviving embedded single quotes
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
