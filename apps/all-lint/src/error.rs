//! Error types for configuration loading and fatal run conditions.
//!
//! A failing linter is not an error: it is recorded as an
//! `ExecutionResult` and only affects the final exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Problems loading or validating the configuration file.
///
/// Every variant renders as a single line suitable for stderr.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{format} syntax error: {message}")]
    Syntax {
        format: &'static str,
        message: String,
    },

    #[error("Invalid config: {0}")]
    InvalidSchema(String),

    #[error("Invalid linter '{name}': {reason}")]
    InvalidLinter { name: String, reason: String },
}

/// Fatal conditions that abort a run.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to expand glob: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_single_line() {
        let e = ConfigError::NotFound {
            path: PathBuf::from(".all_lint.yml"),
        };
        assert_eq!(e.to_string(), "Config file not found: .all_lint.yml");

        let e = ConfigError::InvalidLinter {
            name: "rubocop".into(),
            reason: "'glob' and 'command' are required".into(),
        };
        assert_eq!(
            e.to_string(),
            "Invalid linter 'rubocop': 'glob' and 'command' are required"
        );
        assert!(!e.to_string().contains('\n'));
    }

    #[test]
    fn test_config_error_converts_transparently() {
        let e: Error = ConfigError::InvalidSchema("'linters' mapping is required".into()).into();
        assert_eq!(
            e.to_string(),
            "Invalid config: 'linters' mapping is required"
        );
    }

    #[test]
    fn test_non_utf8_path_message() {
        let e = Error::NonUtf8Path(PathBuf::from("/work/tree"));
        assert_eq!(e.to_string(), "Path is not valid UTF-8: /work/tree");
    }
}
