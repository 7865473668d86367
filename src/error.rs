//! Error types for anka-cache
//!
//! All modules use `CacheResult<T>` as their return type. Every variant
//! renders as a single line on stderr; the process exits 1 on any of them.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// All errors that can occur while restoring or saving caches
#[derive(Error, Debug)]
pub enum CacheError {
    // Config errors; argument errors are produced and printed by clap
    #[error("Config must be an array of cache objects")]
    ConfigNotArray,

    #[error("Cache config must have \"{0}\" key")]
    ConfigMissingKey(&'static str),

    #[error("Cache must have at least one key in an array")]
    ConfigEmptyKeys,

    #[error("Cache must have at least one path in an array")]
    ConfigEmptyPaths,

    #[error("Cache must only have \"keys\" and \"paths\" keys")]
    ConfigExtraKeys,

    #[error("Invalid config file {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    // Template errors
    #[error("Unknown templating command \"{0}\". Only {{{{ checksum <file> }}}}, {{{{ .Branch }}}}, and {{{{ .Revision }}}} are supported")]
    UnsupportedDirective(String),

    #[error("Checksum failed: {}", path.display())]
    ChecksumFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable {0} not set")]
    MissingEnv(&'static str),

    // Transfer errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {command}: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl CacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_directive_message() {
        let err = CacheError::UnsupportedDirective(".Tag".to_string());
        assert_eq!(
            err.to_string(),
            "Unknown templating command \".Tag\". Only {{ checksum <file> }}, {{ .Branch }}, and {{ .Revision }} are supported"
        );
    }

    #[test]
    fn config_messages() {
        assert_eq!(
            CacheError::ConfigNotArray.to_string(),
            "Config must be an array of cache objects"
        );
        assert_eq!(
            CacheError::ConfigMissingKey("keys").to_string(),
            "Cache config must have \"keys\" key"
        );
    }

    #[test]
    fn checksum_failed_names_path() {
        let err = CacheError::ChecksumFailed {
            path: PathBuf::from("Gemfile.lock"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().starts_with("Checksum failed"));
        assert!(err.to_string().contains("Gemfile.lock"));
    }
}
