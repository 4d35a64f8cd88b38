//! Streaming transport
//!
//! Connects to the provider's filter endpoint, frames the line-delimited
//! JSON body and drives a [`StreamListener`](crate::listener::StreamListener).
//! A session is a single connection: there is no reconnection.

mod client;
pub mod oauth;

pub use client::StreamClient;
pub use oauth::OAuthSigner;

use std::fmt;

use serde_json::Value;

use crate::config::CredentialsConfig;
use crate::error::Result;
use crate::models::RawStatus;

/// Key whose presence marks a message as a status
pub const STATUS_MARKER: &str = "in_reply_to_status_id";

/// The four OAuth 1.0a secrets, opaque to everything but the signer
#[derive(Clone)]
pub struct Credentials {
    pub(crate) consumer_key: String,
    pub(crate) consumer_secret: String,
    pub(crate) access_token: String,
    pub(crate) access_token_secret: String,
}

impl Credentials {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
        }
    }
}

impl From<&CredentialsConfig> for Credentials {
    fn from(config: &CredentialsConfig) -> Self {
        Self::new(
            config.consumer_key.clone(),
            config.consumer_secret.clone(),
            config.access_token.clone(),
            config.access_token_secret.clone(),
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(<redacted>)")
    }
}

/// One line of the stream body
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// A status, handed to the listener
    Status(RawStatus),
    /// Deletion notice for an earlier status
    Delete(Value),
    /// Statuses matched but not delivered since the connection opened
    Limit { undelivered: u64 },
    /// The provider is closing the connection
    Disconnect { code: Option<u64>, reason: String },
    /// Stall or other provider warning
    Warning { code: String, message: String },
    /// Anything else
    Other(Value),
}

impl StreamMessage {
    /// Parse one non-blank line of the body
    pub fn parse(line: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(line)?;
        Ok(Self::from_value(value))
    }

    /// Identify a decoded message by its keys
    pub fn from_value(value: Value) -> Self {
        let Some(object) = value.as_object() else {
            return StreamMessage::Other(value);
        };

        if object.contains_key(STATUS_MARKER) {
            return StreamMessage::Status(RawStatus::new(value));
        }
        if let Some(delete) = object.get("delete") {
            return StreamMessage::Delete(delete.clone());
        }
        if let Some(limit) = object.get("limit") {
            return StreamMessage::Limit {
                undelivered: limit.get("track").and_then(Value::as_u64).unwrap_or(0),
            };
        }
        if let Some(disconnect) = object.get("disconnect") {
            return StreamMessage::Disconnect {
                code: disconnect.get("code").and_then(Value::as_u64),
                reason: string_field(disconnect, "reason"),
            };
        }
        if let Some(warning) = object.get("warning") {
            return StreamMessage::Warning {
                code: string_field(warning, "code"),
                message: string_field(warning, "message"),
            };
        }

        StreamMessage::Other(value)
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            StreamMessage::Status(_) => "status",
            StreamMessage::Delete(_) => "delete",
            StreamMessage::Limit { .. } => "limit",
            StreamMessage::Disconnect { .. } => "disconnect",
            StreamMessage::Warning { .. } => "warning",
            StreamMessage::Other(_) => "other",
        }
    }
}

fn string_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) if !other.is_null() => other.to_string(),
        _ => String::new(),
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The response body ended
    Completed,
    /// The listener stopped on a rate-limit signal
    RateLimited,
    /// The provider sent a disconnect message
    Disconnected,
    /// The listener or the operator stopped the session
    Stopped,
}

impl SessionEnd {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionEnd::Completed => "completed",
            SessionEnd::RateLimited => "rate_limited",
            SessionEnd::Disconnected => "disconnected",
            SessionEnd::Stopped => "stopped",
        }
    }
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one streaming session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub end: SessionEnd,
    /// Statuses handed to the listener
    pub statuses: u64,
    /// Non-blank lines read, statuses included
    pub messages: u64,
}
