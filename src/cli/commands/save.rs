//! Save command - compress and upload cache archives
//!
//! Each entry is saved under its evaluated primary key. Entries whose
//! archive was already restored in this invocation are skipped, so an
//! unchanged cache is never re-uploaded within one run.

use crate::config::CacheEntry;
use crate::error::CacheResult;
use crate::resolver::CacheResolver;
use crate::staging::{self, Staging};
use crate::storage::ObjectStore;
use crate::template::KeyEvaluator;
use crate::vm::{anka::VM_WORKDIR, VmRunner};

/// Execute the save-caches command
pub async fn execute(
    entries: &[CacheEntry],
    evaluator: &KeyEvaluator,
    store: &dyn ObjectStore,
    vm: &dyn VmRunner,
    staging: &Staging,
) -> CacheResult<()> {
    let resolver = CacheResolver::new(evaluator, store);

    for entry in entries {
        let key = resolver.save_key(entry)?;

        if staging.restored_archive(&key).exists() {
            println!("Skipping cache upload, already downloaded");
            continue;
        }

        println!("Compressing {}", staging::archive_name(&key));
        vm.run_shell(&compress_script(&key, &entry.paths, staging))
            .await?;

        println!("Uploading cache {key}");
        store.upload(&staging.saved_archive(&key)).await?;
    }

    Ok(())
}

/// Script compressing an entry's paths from the VM workdir into the
/// saved staging directory. The archive path is derived from the same
/// `Staging` instance the upload reads from, so the two stay in step.
fn compress_script(key: &str, paths: &[String], staging: &Staging) -> String {
    let quoted = paths
        .iter()
        .map(|p| format!("'{p}'"))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "mkdir -p {dir} && tar -C {workdir} -czf {archive} {quoted}",
        dir = staging.saved_dir().display(),
        workdir = VM_WORKDIR,
        archive = staging.saved_archive(key).display(),
    )
}
