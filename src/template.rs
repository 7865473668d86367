//! Cache-key template evaluation
//!
//! Expands `{{ ... }}` placeholders in cache keys into literal strings.
//! Three directives are supported: `{{ .Branch }}`, `{{ .Revision }}`, and
//! `{{ checksum <file> }}`. Branch and revision values are injected at
//! construction rather than read from the environment, so the evaluator
//! stays deterministic under test.

use crate::error::{CacheError, CacheResult};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable holding the CI branch name
pub const BRANCH_VAR: &str = "BUILDKITE_BRANCH";
/// Environment variable holding the CI commit identifier
pub const REVISION_VAR: &str = "BUILDKITE_COMMIT";

/// A parsed `{{ ... }}` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `{{ .Branch }}` - branch name with `/` replaced by `_`
    Branch,
    /// `{{ .Revision }}` - commit identifier verbatim
    Revision,
    /// `{{ checksum <file> }}` - hash of the file's contents
    Checksum(PathBuf),
}

impl Directive {
    /// Parse the trimmed interior of a `{{ ... }}` placeholder
    pub fn parse(contents: &str) -> CacheResult<Self> {
        match contents {
            ".Branch" => Ok(Self::Branch),
            ".Revision" => Ok(Self::Revision),
            _ => {
                let mut tokens = contents.split_whitespace();
                if tokens.next() == Some("checksum") && tokens.next().is_some() {
                    // Everything after the checksum token is the file path
                    let path = contents["checksum".len()..].trim();
                    return Ok(Self::Checksum(PathBuf::from(path)));
                }
                Err(CacheError::UnsupportedDirective(contents.to_string()))
            }
        }
    }
}

/// Expands cache-key templates into resolved keys
pub struct KeyEvaluator {
    branch: Option<String>,
    revision: Option<String>,
    pattern: Regex,
}

impl KeyEvaluator {
    /// Create an evaluator with explicit branch and revision values
    pub fn new(branch: Option<String>, revision: Option<String>) -> Self {
        Self {
            branch,
            revision,
            // Lazy match so adjacent placeholders don't merge
            pattern: Regex::new(r"\{\{(.+?)\}\}").unwrap(),
        }
    }

    /// Create an evaluator from the Buildkite environment
    pub fn from_env() -> Self {
        Self::new(env::var(BRANCH_VAR).ok(), env::var(REVISION_VAR).ok())
    }

    /// Expand every placeholder in `template`, copying all other text
    /// through unchanged. A template with no placeholders is returned as-is.
    pub fn evaluate(&self, template: &str) -> CacheResult<String> {
        let mut resolved = String::with_capacity(template.len());
        let mut last = 0;

        for caps in self.pattern.captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            let contents = caps.get(1).map_or("", |m| m.as_str()).trim();

            resolved.push_str(&template[last..whole.start()]);
            resolved.push_str(&self.resolve(contents)?);
            last = whole.end();
        }
        resolved.push_str(&template[last..]);

        debug!("Evaluated cache key {:?} -> {:?}", template, resolved);
        Ok(resolved)
    }

    fn resolve(&self, contents: &str) -> CacheResult<String> {
        match Directive::parse(contents)? {
            Directive::Branch => {
                let branch = self
                    .branch
                    .as_deref()
                    .ok_or(CacheError::MissingEnv(BRANCH_VAR))?;
                Ok(branch.replace('/', "_"))
            }
            Directive::Revision => self
                .revision
                .clone()
                .ok_or(CacheError::MissingEnv(REVISION_VAR)),
            Directive::Checksum(path) => checksum_file(&path),
        }
    }
}

/// Hash a file's contents with SHA-256, returning lowercase hex
fn checksum_file(path: &Path) -> CacheResult<String> {
    let contents = fs::read(path).map_err(|e| CacheError::ChecksumFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let digest = Sha256::digest(&contents);
    Ok(hex::encode(digest))
}
