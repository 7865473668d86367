//! Cache entry resolution
//!
//! Restore walks an entry's keys in order as fallback tiers: the first key
//! whose listing is non-empty wins, and the newest object under it is
//! selected. Later keys are never queried once a match is found. Save is
//! asymmetric on purpose: it always keys on the primary (first) key only.

use crate::config::CacheEntry;
use crate::error::{CacheError, CacheResult};
use crate::storage::ObjectStore;
use crate::template::KeyEvaluator;
use tracing::debug;

/// Decides which remote archive (if any) matches a cache entry
pub struct CacheResolver<'a> {
    evaluator: &'a KeyEvaluator,
    store: &'a dyn ObjectStore,
}

impl<'a> CacheResolver<'a> {
    pub fn new(evaluator: &'a KeyEvaluator, store: &'a dyn ObjectStore) -> Self {
        Self { evaluator, store }
    }

    /// Resolve the remote object to restore for this entry, or `None`
    /// when no key yields a match.
    pub async fn resolve_restore(&self, entry: &CacheEntry) -> CacheResult<Option<String>> {
        for key in &entry.keys {
            let resolved = self.evaluator.evaluate(key)?;
            let listing = self.store.list(&resolved).await?;

            if let Some(newest) = listing.last() {
                debug!("Key {} matched {}", resolved, newest);
                return Ok(Some(newest.clone()));
            }
            debug!("No caches under key {}", resolved);
        }
        Ok(None)
    }

    /// The evaluated primary key an entry is saved under
    pub fn save_key(&self, entry: &CacheEntry) -> CacheResult<String> {
        let primary = entry
            .keys
            .first()
            .ok_or(CacheError::ConfigEmptyKeys)?;
        self.evaluator.evaluate(primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;

    /// In-memory store recording every listed prefix
    struct FakeStore {
        listings: HashMap<String, Vec<String>>,
        queried: Mutex<Vec<String>>,
    }

    impl FakeStore {
        fn new(listings: &[(&str, &[&str])]) -> Self {
            Self {
                listings: listings
                    .iter()
                    .map(|(k, objects)| {
                        (k.to_string(), objects.iter().map(|o| o.to_string()).collect())
                    })
                    .collect(),
                queried: Mutex::new(Vec::new()),
            }
        }

        fn queried(&self) -> Vec<String> {
            self.queried.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        async fn list(&self, key: &str) -> CacheResult<Vec<String>> {
            self.queried.lock().unwrap().push(key.to_string());
            Ok(self.listings.get(key).cloned().unwrap_or_default())
        }

        async fn download(&self, _object_key: &str, _dest_dir: &Path) -> CacheResult<()> {
            Ok(())
        }

        async fn upload(&self, _archive: &Path) -> CacheResult<()> {
            Ok(())
        }
    }

    fn entry(keys: &[&str]) -> CacheEntry {
        CacheEntry {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            paths: vec!["vendor/bundle".to_string()],
        }
    }

    fn evaluator() -> KeyEvaluator {
        KeyEvaluator::new(Some("main".to_string()), Some("abc123".to_string()))
    }

    #[tokio::test]
    async fn falls_back_to_later_key_and_picks_newest() {
        let store = FakeStore::new(&[(
            "gems-fallback",
            &["prefix/gems-old.tar.gz", "prefix/gems-new.tar.gz"][..],
        )]);
        let evaluator = evaluator();
        let resolver = CacheResolver::new(&evaluator, &store);

        let resolved = resolver
            .resolve_restore(&entry(&["gems-exact", "gems-fallback"]))
            .await
            .unwrap();

        assert_eq!(resolved.as_deref(), Some("prefix/gems-new.tar.gz"));
        assert_eq!(store.queried(), vec!["gems-exact", "gems-fallback"]);
    }

    #[tokio::test]
    async fn first_match_short_circuits() {
        let store = FakeStore::new(&[
            ("gems-exact", &["prefix/gems-exact.tar.gz"][..]),
            ("gems-fallback", &["prefix/gems-fallback.tar.gz"][..]),
        ]);
        let evaluator = evaluator();
        let resolver = CacheResolver::new(&evaluator, &store);

        let resolved = resolver
            .resolve_restore(&entry(&["gems-exact", "gems-fallback"]))
            .await
            .unwrap();

        assert_eq!(resolved.as_deref(), Some("prefix/gems-exact.tar.gz"));
        // The fallback tier is never consulted after a hit
        assert_eq!(store.queried(), vec!["gems-exact"]);
    }

    #[tokio::test]
    async fn no_match_resolves_to_none() {
        let store = FakeStore::new(&[]);
        let evaluator = evaluator();
        let resolver = CacheResolver::new(&evaluator, &store);

        let resolved = resolver
            .resolve_restore(&entry(&["gems-exact", "gems-fallback"]))
            .await
            .unwrap();

        assert_eq!(resolved, None);
        assert_eq!(store.queried(), vec!["gems-exact", "gems-fallback"]);
    }

    #[tokio::test]
    async fn keys_are_evaluated_before_listing() {
        let store = FakeStore::new(&[]);
        let evaluator = evaluator();
        let resolver = CacheResolver::new(&evaluator, &store);

        resolver
            .resolve_restore(&entry(&["gems-{{ .Branch }}"]))
            .await
            .unwrap();

        assert_eq!(store.queried(), vec!["gems-main"]);
    }

    #[tokio::test]
    async fn save_key_uses_primary_only() {
        let store = FakeStore::new(&[]);
        let evaluator = evaluator();
        let resolver = CacheResolver::new(&evaluator, &store);

        let key = resolver
            .save_key(&entry(&["gems-{{ .Revision }}", "gems-{{ .Branch }}"]))
            .unwrap();

        assert_eq!(key, "gems-abc123");
        // Save never lists remote objects
        assert!(store.queried().is_empty());
    }
}
