//! Error types for tenderstat.
//!
//! Library crates use [`TenderStatError`] via `thiserror`.
//! The cli app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all tenderstat operations.
///
/// The normalization pipeline itself never produces one of these: bad
/// records degrade to zeroed or excluded values instead. Errors come from
/// configuration, the upstream fetch, and file I/O.
#[derive(Debug, thiserror::Error)]
pub enum TenderStatError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to the record source.
    #[error("network error: {0}")]
    Network(String),

    /// The record source answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Response body or saved file could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Caller-supplied input is unusable (empty company name, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TenderStatError>;

impl TenderStatError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether a retry of the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = TenderStatError::config("min_year out of range");
        assert_eq!(err.to_string(), "config error: min_year out of range");

        let err = TenderStatError::validation("company name must not be empty");
        assert!(err.to_string().contains("company name"));
    }

    #[test]
    fn transport_and_server_errors_are_retryable() {
        assert!(TenderStatError::Network("timed out".into()).is_retryable());
        assert!(
            TenderStatError::Status {
                status: 503,
                url: "http://localhost/scrape".into()
            }
            .is_retryable()
        );
        assert!(
            !TenderStatError::Status {
                status: 400,
                url: "http://localhost/scrape".into()
            }
            .is_retryable()
        );
        assert!(!TenderStatError::parse("bad json").is_retryable());
        assert!(!TenderStatError::validation("empty").is_retryable());
    }
}
