//! Error handling module for tweetforge
//!
//! This module defines the error types used throughout the application,
//! providing a unified error handling strategy for the stream session,
//! the classifier and the aggregation stage.

use thiserror::Error;

use crate::aggregate::AggregationError;
use crate::models::ExtractionError;

/// Result type alias for tweetforge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tweetforge
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A status was missing one of the fixed record fields
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// The collected records could not be turned into a table
    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// The stream endpoint refused or broke the connection
    #[error("Stream error: {0}")]
    Stream(String),

    /// Request signing failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The provider signalled a rate limit
    #[error("Rate limited by provider (status {0})")]
    RateLimit(u16),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a stream error
    pub fn stream<S: Into<String>>(msg: S) -> Self {
        Error::Stream(msg.into())
    }

    /// Create an authentication error
    pub fn auth<S: Into<String>>(msg: S) -> Self {
        Error::Auth(msg.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Check if a supervisor could reasonably reconnect after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Stream(_) | Error::RateLimit(_))
    }

    /// Short machine-readable name of the error kind, used in log fields
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::Config(_) => "configuration_error",
            Error::Extraction(_) => "extraction_error",
            Error::Aggregation(_) => "aggregation_error",
            Error::Serialization(_) => "serialization_error",
            Error::Io(_) => "io_error",
            Error::Http(_) => "http_error",
            Error::Stream(_) => "stream_error",
            Error::Auth(_) => "auth_error",
            Error::RateLimit(_) => "rate_limit",
            Error::Internal(_) => "internal_error",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

/// Convert from anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

/// Convert from envconfig::Error to our Error type
impl From<envconfig::Error> for Error {
    fn from(err: envconfig::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ExtractionErrorKind};

    #[test]
    fn test_error_retryable() {
        assert!(Error::stream("connection reset").is_retryable());
        assert!(Error::RateLimit(420).is_retryable());
        assert!(!Error::config("missing key").is_retryable());
        assert!(!Error::internal("boom").is_retryable());
    }

    #[test]
    fn test_extraction_error_converts() {
        let err: Error =
            ExtractionError::new(ExtractionErrorKind::MissingField, "lang", Category::Quoted)
                .into();
        assert_eq!(err.error_type(), "extraction_error");
        let message = err.to_string();
        assert!(message.contains("lang"));
        assert!(message.contains("Quoted"));
    }

    #[test]
    fn test_anyhow_converts_to_internal() {
        let err: Error = anyhow::anyhow!("something odd").into();
        assert!(matches!(err, Error::Internal(ref m) if m == "something odd"));
    }
}
