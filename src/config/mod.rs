//! Cache configuration loading and validation
//!
//! The config file is a YAML sequence of cache entries, each with an
//! ordered list of fallback `keys` and the `paths` to archive. The raw
//! document is shape-checked before typed deserialization so the error
//! messages stay descriptive.

use crate::error::{CacheError, CacheResult};
use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// One configured unit of cacheable state
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    /// Ordered fallback lookup keys; the first is the primary key
    pub keys: Vec<String>,
    /// Paths inside the VM working directory to archive
    pub paths: Vec<String>,
}

/// Load and validate the cache config from a YAML file
pub async fn load(path: &Path) -> CacheResult<Vec<CacheEntry>> {
    let contents = fs::read_to_string(path)
        .await
        .map_err(|e| CacheError::io(format!("reading config from {}", path.display()), e))?;

    from_yaml(&contents).map_err(|e| match e {
        CacheError::ConfigParse { reason, .. } => CacheError::ConfigParse {
            path: path.to_path_buf(),
            reason,
        },
        other => other,
    })
}

/// Parse and validate a YAML config document
pub fn from_yaml(contents: &str) -> CacheResult<Vec<CacheEntry>> {
    let value: Value = serde_yaml::from_str(contents).map_err(|e| CacheError::ConfigParse {
        path: Path::new("<config>").to_path_buf(),
        reason: e.to_string(),
    })?;

    validate(&value)?;

    let entries: Vec<CacheEntry> =
        serde_yaml::from_value(value).map_err(|e| CacheError::ConfigParse {
            path: Path::new("<config>").to_path_buf(),
            reason: e.to_string(),
        })?;

    debug!("Loaded {} cache entries", entries.len());
    Ok(entries)
}

/// Check that the raw config value is a sequence of well-formed cache
/// objects. The first violation aborts validation for the whole config.
pub fn validate(config: &Value) -> CacheResult<()> {
    let Some(entries) = config.as_sequence() else {
        return Err(CacheError::ConfigNotArray);
    };

    for entry in entries {
        let mapping = entry.as_mapping().ok_or(CacheError::ConfigNotArray)?;

        if !mapping.contains_key("keys") {
            return Err(CacheError::ConfigMissingKey("keys"));
        }
        if !mapping.contains_key("paths") {
            return Err(CacheError::ConfigMissingKey("paths"));
        }

        match mapping.get("keys").and_then(Value::as_sequence) {
            Some(keys) if !keys.is_empty() => {}
            _ => return Err(CacheError::ConfigEmptyKeys),
        }
        match mapping.get("paths").and_then(Value::as_sequence) {
            Some(paths) if !paths.is_empty() => {}
            _ => return Err(CacheError::ConfigEmptyPaths),
        }

        if mapping.len() != 2 {
            return Err(CacheError::ConfigExtraKeys);
        }
    }

    Ok(())
}
