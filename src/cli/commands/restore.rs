//! Restore command - download and extract matching cache archives
//!
//! Every entry is resolved against the remote listing and downloaded into
//! the restored staging directory. Extraction happens once at the end, in
//! a single VM invocation covering all staged archives, so N entries never
//! cost N VM round-trips.

use crate::config::CacheEntry;
use crate::error::CacheResult;
use crate::resolver::CacheResolver;
use crate::staging::Staging;
use crate::storage::ObjectStore;
use crate::template::KeyEvaluator;
use crate::vm::{anka::VM_WORKDIR, VmRunner};

/// Execute the restore-caches command
pub async fn execute(
    entries: &[CacheEntry],
    evaluator: &KeyEvaluator,
    store: &dyn ObjectStore,
    vm: &dyn VmRunner,
    staging: &Staging,
) -> CacheResult<()> {
    let resolver = CacheResolver::new(evaluator, store);
    staging.ensure_restored_dir()?;

    for entry in entries {
        match resolver.resolve_restore(entry).await? {
            Some(object_key) => {
                store.download(&object_key, &staging.restored_dir()).await?;
            }
            None => {
                if let Some(key) = entry.keys.last() {
                    println!("No caches to restore for {key}");
                }
            }
        }
    }

    if staging.has_restored_archives() {
        println!("Extracting caches");
        vm.run_shell(&extract_script(staging)).await?;
    }

    Ok(())
}

/// One script extracting every staged archive into the VM workdir. The
/// glob is derived from the same `Staging` instance the downloads were
/// staged into.
fn extract_script(staging: &Staging) -> String {
    format!(
        r#"for archive in {}/*.tar.gz; do tar -C {} -xzf "$archive"; done"#,
        staging.restored_dir().display(),
        VM_WORKDIR
    )
}
