// src/error.rs

//! Unified error handling for the news cache.

use std::fmt;

use thiserror::Error;

/// Result type alias for news cache operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A request parameter was present but not a positive integer
    #[error("{name} must be a positive integer")]
    InvalidParameter { name: String },

    /// Requested news category is not configured
    #[error("unknown news category \"{0}\"")]
    UnknownCategory(String),

    /// Language or region tag does not map to a known region
    #[error("unsupported language/region \"{0}\"")]
    UnsupportedRegion(String),

    /// Transport failure or timeout talking to the upstream API
    #[error("upstream unreachable ({url}): {message}")]
    UpstreamUnreachable { url: String, message: String },

    /// Upstream answered with a non-200 status
    #[error("upstream status {code} ({url})")]
    UpstreamStatus { code: u16, url: String },

    /// Upstream body was not the expected JSON
    #[error("decode error ({context}): {message}")]
    Decode { context: String, message: String },

    /// Snapshot could not be loaded or refreshed for a request
    #[error("news cache unavailable for {key}: {message}")]
    CacheUnavailable { key: String, message: String },

    /// Snapshot backend failed to read or write a document
    #[error("storage error for {key}: {message}")]
    Storage { key: String, message: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: impl Into<String>) -> Self {
        Self::InvalidParameter { name: name.into() }
    }

    /// Create an upstream transport error.
    pub fn unreachable(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::UpstreamUnreachable {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a decode error with context.
    pub fn decode(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a cache unavailable error for a snapshot key.
    pub fn cache_unavailable(key: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::CacheUnavailable {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Create a storage error for a snapshot key.
    pub fn storage(key: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Storage {
            key: key.into(),
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

    /// Whether the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::UnknownCategory(_) | Self::UnsupportedRegion(_)
        )
    }

    /// HTTP status an outer shell should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidParameter { .. } | Self::UnsupportedRegion(_) => 400,
            Self::UnknownCategory(_) => 404,
            Self::UpstreamUnreachable { .. }
            | Self::UpstreamStatus { .. }
            | Self::Decode { .. } => 502,
            Self::CacheUnavailable { .. } | Self::Storage { .. } => 503,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(AppError::invalid_parameter("index").status_code(), 400);
        assert_eq!(AppError::UnsupportedRegion("fr".into()).status_code(), 400);
        assert_eq!(AppError::UnknownCategory("misc".into()).status_code(), 404);
        assert!(AppError::UnknownCategory("misc".into()).is_client_error());
    }

    #[test]
    fn cache_and_upstream_errors_are_server_side() {
        let err = AppError::cache_unavailable("jp:news", "timeout");
        assert_eq!(err.status_code(), 503);
        assert!(!err.is_client_error());

        let err = AppError::UpstreamStatus {
            code: 500,
            url: "https://example.com".into(),
        };
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn invalid_parameter_message_names_the_parameter() {
        let err = AppError::invalid_parameter("size");
        assert_eq!(err.to_string(), "size must be a positive integer");
    }
}
