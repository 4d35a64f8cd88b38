//! Configuration module for tweetforge
//!
//! Loads and validates configuration from environment variables (and a
//! `.env` file when present).

use std::fmt;
use std::time::Duration;

use envconfig::Envconfig;
use serde::{Deserialize, Serialize};

use crate::aggregate::{CREATED_AT_COLUMN, DEFAULT_COLUMNS};
use crate::error::{Error, Result};

/// Main configuration structure for tweetforge
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct Config {
    /// Application configuration
    #[serde(flatten)]
    #[envconfig(nested)]
    pub app: AppConfig,

    /// Provider credentials
    #[serde(flatten)]
    #[envconfig(nested)]
    pub credentials: CredentialsConfig,

    /// Stream filter and connection settings
    #[serde(flatten)]
    #[envconfig(nested)]
    pub stream: StreamConfig,

    /// Output locations and table projection
    #[serde(flatten)]
    #[envconfig(nested)]
    pub output: OutputConfig,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct AppConfig {
    /// Log level
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,

    /// Environment (development, staging, production)
    #[envconfig(from = "ENVIRONMENT", default = "development")]
    pub environment: String,
}

impl AppConfig {
    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// The four OAuth 1.0a secrets.
///
/// Never serialized and redacted from `Debug`.
#[derive(Clone, Deserialize, Serialize, Envconfig)]
pub struct CredentialsConfig {
    #[serde(skip_serializing)]
    #[envconfig(from = "TWITTER_CONSUMER_KEY")]
    pub consumer_key: String,

    #[serde(skip_serializing)]
    #[envconfig(from = "TWITTER_CONSUMER_SECRET")]
    pub consumer_secret: String,

    #[serde(skip_serializing)]
    #[envconfig(from = "TWITTER_ACCESS_TOKEN")]
    pub access_token: String,

    #[serde(skip_serializing)]
    #[envconfig(from = "TWITTER_ACCESS_TOKEN_SECRET")]
    pub access_token_secret: String,
}

impl CredentialsConfig {
    /// Check that no secret is blank
    pub fn is_complete(&self) -> bool {
        [
            &self.consumer_key,
            &self.consumer_secret,
            &self.access_token,
            &self.access_token_secret,
        ]
        .iter()
        .all(|secret| !secret.trim().is_empty())
    }

    /// Mask a secret for logging, keeping only its last two characters
    pub fn masked(secret: &str) -> String {
        let chars: Vec<char> = secret.chars().collect();
        if chars.len() <= 4 {
            return "***".to_string();
        }
        let tail: String = chars[chars.len() - 2..].iter().collect();
        format!("***{}", tail)
    }
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

/// Stream filter and connection settings
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct StreamConfig {
    /// Filter endpoint
    #[envconfig(from = "STREAM_URL", default = "https://stream.twitter.com/1.1/statuses/filter.json")]
    pub url: String,

    /// Track terms (comma-separated)
    #[envconfig(from = "STREAM_TRACK", default = "")]
    pub track: String,

    /// Language codes (comma-separated)
    #[envconfig(from = "STREAM_LANGUAGES", default = "")]
    pub languages: String,

    /// Connect and read timeout in seconds
    #[envconfig(from = "STREAM_TIMEOUT_SECS", default = "90")]
    pub timeout_secs: u64,

    /// Session duration limit in seconds, 0 for unbounded
    #[envconfig(from = "STREAM_RUN_SECS", default = "0")]
    pub run_secs: u64,
}

impl StreamConfig {
    /// Create a config for an endpoint with the default timeout and no limit
    pub fn new(url: impl Into<String>, track: &[&str]) -> Self {
        Self {
            url: url.into(),
            track: track.join(","),
            languages: String::new(),
            timeout_secs: 90,
            run_secs: 0,
        }
    }

    /// Get track terms as a vector
    pub fn track_list(&self) -> Vec<String> {
        split_list(&self.track)
    }

    /// Get language codes as a vector
    pub fn languages_list(&self) -> Vec<String> {
        split_list(&self.languages)
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the session duration limit, if any
    pub fn run_limit(&self) -> Option<Duration> {
        (self.run_secs > 0).then(|| Duration::from_secs(self.run_secs))
    }

    /// Form parameters sent with the filter request
    pub fn form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("track".to_string(), self.track_list().join(","))];
        let languages = self.languages_list();
        if !languages.is_empty() {
            params.push(("language".to_string(), languages.join(",")));
        }
        params
    }
}

/// Output locations and table projection
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct OutputConfig {
    /// Text sink, one normalized status text per line
    #[envconfig(from = "OUTPUT_TEXT_PATH", default = "./data/statuses.txt")]
    pub text_path: String,

    /// Exported table (JSON Lines)
    #[envconfig(from = "OUTPUT_TABLE_PATH", default = "./data/statuses.jsonl")]
    pub table_path: String,

    /// Table projection (comma-separated), empty for the default
    #[envconfig(from = "OUTPUT_COLUMNS", default = "")]
    pub columns: String,
}

impl OutputConfig {
    /// Get the projection, falling back to the default column list
    pub fn columns_list(&self) -> Vec<String> {
        if self.columns.trim().is_empty() {
            return DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect();
        }
        split_list(&self.columns)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenv::dotenv().ok();

        Config::init_from_env().map_err(Error::from)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.credentials.is_complete() {
            return Err(Error::config("All four Twitter credentials must be set"));
        }

        if self.stream.track_list().is_empty() {
            return Err(Error::config("STREAM_TRACK must name at least one term"));
        }

        if self.stream.timeout_secs == 0 {
            return Err(Error::config("Stream timeout must be at least 1 second"));
        }

        let columns = self.output.columns_list();
        if columns.is_empty() {
            return Err(Error::config("Output projection cannot be empty"));
        }
        if !columns.iter().any(|c| c == CREATED_AT_COLUMN) {
            return Err(Error::config(format!(
                "Output projection must include '{}'",
                CREATED_AT_COLUMN
            )));
        }

        Ok(())
    }

    /// Log configuration (with secrets masked)
    pub fn log_config(&self) {
        tracing::info!(
            environment = %self.app.environment,
            log_level = %self.app.log_level,
            "Application configuration"
        );

        tracing::info!(
            consumer_key = %CredentialsConfig::masked(&self.credentials.consumer_key),
            access_token = %CredentialsConfig::masked(&self.credentials.access_token),
            "Credentials configuration"
        );

        tracing::info!(
            url = %self.stream.url,
            track = ?self.stream.track_list(),
            languages = ?self.stream.languages_list(),
            timeout_secs = self.stream.timeout_secs,
            run_secs = self.stream.run_secs,
            "Stream configuration"
        );

        tracing::info!(
            text_path = %self.output.text_path,
            table_path = %self.output.table_path,
            columns = self.output.columns_list().len(),
            "Output configuration"
        );
    }
}
