//! VM command execution abstraction
//!
//! The orchestrator needs exactly one capability from the build VM: run a
//! shell script inside its working directory and report success. Tests
//! implement the trait with an in-memory fake; production wraps the
//! configured Anka run command.

pub mod anka;

pub use anka::AnkaVm;

use crate::error::CacheResult;
use async_trait::async_trait;

/// Runs shell commands inside the isolated build VM
#[async_trait]
pub trait VmRunner: Send + Sync {
    /// Run `script` with `bash -c` inside the VM, blocking until it exits
    async fn run_shell(&self, script: &str) -> CacheResult<()>;
}
