// src/error.rs

//! Unified error handling for the crawler application.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Transport failure, timeout, or non-2xx status
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// Required page structure is absent
    #[error("Missing field '{field}' in {url}")]
    MissingField { field: String, url: String },

    /// Directory creation or file write failed
    #[error("File system error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cached listing file could not be decoded
    #[error("Decode error in {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Asset could not be mirrored
    #[error("Asset error for {url}: {message}")]
    Asset { url: String, message: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a network error for a URL.
    pub fn network(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a missing-field error.
    pub fn missing(field: impl Into<String>, url: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            url: url.into(),
        }
    }

    /// Create a file system error for a path.
    pub fn file_system(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a decode error for a cached file.
    pub fn decode(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Decode {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an asset mirroring error.
    pub fn asset(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Asset {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error ends a single work item rather than the whole run.
    pub fn is_item_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::MissingField { .. }
                | Self::FileSystem { .. }
                | Self::Decode { .. }
                | Self::Asset { .. }
                | Self::Json(_)
                | Self::Io(_)
        )
    }

    /// Whether a retry of the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_recoverable_classification() {
        assert!(AppError::network("http://x", "timeout").is_item_recoverable());
        assert!(AppError::missing("score", "http://x").is_item_recoverable());
        assert!(!AppError::config("bad").is_item_recoverable());
        assert!(!AppError::selector("[[", "parse").is_item_recoverable());
    }

    #[test]
    fn test_only_network_errors_retry() {
        assert!(AppError::network("http://x", "503").is_retryable());
        assert!(!AppError::missing("score", "http://x").is_retryable());
    }

    #[test]
    fn test_missing_field_message() {
        let err = AppError::missing(".game-resume", "https://example.com/m?matchId=1");
        assert_eq!(
            err.to_string(),
            "Missing field '.game-resume' in https://example.com/m?matchId=1"
        );
    }
}
