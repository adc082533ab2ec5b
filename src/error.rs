use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for trending-digest
#[derive(Error, Debug)]
pub enum TrendingError {
    /// Missing or rejected GitHub credential
    #[error("GitHub authentication failed: {0}")]
    Auth(String),

    /// GitHub request quota exhausted
    #[error("GitHub rate limit exceeded{}", describe_reset(.reset_at))]
    RateLimit { reset_at: Option<DateTime<Utc>> },

    /// Transport failures
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success response not covered by a more specific variant
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// README payload that is not valid base64
    #[error("Failed to decode README content: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Unreadable cache entry
    #[error("Failed to read cache entry {path:?}: {source}")]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    /// Chat completion errors
    #[error("Summarizer error: {0}")]
    Summarizer(String),
}

fn describe_reset(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => format!(" (resets at {})", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => String::new(),
    }
}

/// Result type alias for trending-digest operations
pub type Result<T> = std::result::Result<T, TrendingError>;

impl TrendingError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new authentication error
    pub fn auth<S: Into<String>>(msg: S) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a new summarizer error
    pub fn summarizer<S: Into<String>>(msg: S) -> Self {
        Self::Summarizer(msg.into())
    }

    /// Whether the error ends the run rather than a single item
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Auth(_) | Self::RateLimit { .. } | Self::Config(_) | Self::MissingConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rate_limit_message_with_reset() {
        let reset_at = Utc.with_ymd_and_hms(2025, 7, 24, 15, 0, 0).single();
        let err = TrendingError::RateLimit { reset_at };
        assert_eq!(
            err.to_string(),
            "GitHub rate limit exceeded (resets at 2025-07-24 15:00:00 UTC)"
        );
    }

    #[test]
    fn test_rate_limit_message_without_reset() {
        let err = TrendingError::RateLimit { reset_at: None };
        assert_eq!(err.to_string(), "GitHub rate limit exceeded");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(TrendingError::auth("bad token").is_fatal());
        assert!(TrendingError::RateLimit { reset_at: None }.is_fatal());
        assert!(!TrendingError::summarizer("empty reply").is_fatal());
        assert!(!TrendingError::Api {
            status: 500,
            message: "boom".to_string()
        }
        .is_fatal());
    }
}
