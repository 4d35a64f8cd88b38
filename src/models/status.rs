//! Raw status documents and their classification
//!
//! A status arrives from the stream as an arbitrary JSON document. This
//! module decides which of the three categories it belongs to and which
//! nested payload the record should be extracted from.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Key holding the reshared status on a retweet
pub const RETWEETED_STATUS: &str = "retweeted_status";

/// Key holding the quoted status on a quote-share
pub const QUOTED_STATUS: &str = "quoted_status";

/// Category of a status, determined once at classification time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Original post
    Tweet,
    /// Verbatim reshare of another status
    Retweet,
    /// Reshare with added commentary
    Quoted,
}

impl Category {
    /// All categories in aggregation block order
    pub const ALL: [Category; 3] = [Category::Tweet, Category::Retweet, Category::Quoted];

    /// Display name, also used as the `kind` column value
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tweet => "Tweet",
            Category::Retweet => "Retweet",
            Category::Quoted => "Quoted",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw status as delivered by the stream
///
/// The document is kept as plain JSON so that every optional sub-structure
/// can be probed by presence instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawStatus(Value);

impl RawStatus {
    /// Wrap an already parsed JSON document
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a status from a JSON string
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json).map(Self)
    }

    /// The full document
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the wrapper and return the document
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Status identifier, preferring the string form the provider sends
    pub fn id_str(&self) -> Option<String> {
        match self.0.get("id_str").and_then(Value::as_str) {
            Some(id) => Some(id.to_string()),
            None => self.0.get("id").and_then(Value::as_u64).map(|id| id.to_string()),
        }
    }

    /// Reshared sub-structure, when this status is a retweet
    pub fn retweeted_status(&self) -> Option<&Value> {
        sub_structure(&self.0, RETWEETED_STATUS)
    }

    /// Quoted sub-structure, when this status is a quote-share
    pub fn quoted_status(&self) -> Option<&Value> {
        sub_structure(&self.0, QUOTED_STATUS)
    }

    /// Determine the category. A reshare takes priority over a quote.
    pub fn category(&self) -> Category {
        self.classify().0
    }

    /// Determine the category together with the payload to extract from
    pub fn classify(&self) -> (Category, &Value) {
        if let Some(reshared) = self.retweeted_status() {
            (Category::Retweet, reshared)
        } else if let Some(quoted) = self.quoted_status() {
            (Category::Quoted, quoted)
        } else {
            (Category::Tweet, &self.0)
        }
    }
}

impl From<Value> for RawStatus {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// A nested status counts as present only when it is an object.
fn sub_structure<'a>(status: &'a Value, key: &str) -> Option<&'a Value> {
    status.get(key).filter(|value| value.is_object())
}

/// Resolve the display text of a payload
///
/// The long-form `extended_tweet.full_text` wins whenever it is present;
/// the short `text` field is used only when it is structurally absent.
pub fn resolve_text(payload: &Value) -> Option<&str> {
    payload
        .pointer("/extended_tweet/full_text")
        .and_then(Value::as_str)
        .or_else(|| payload.get("text").and_then(Value::as_str))
}

/// Collapse a text onto a single line: newlines become spaces and
/// carriage returns are dropped. Trailing whitespace left behind by a
/// final line break is trimmed so the sink line ends with the text itself.
pub fn normalize_text(text: &str) -> String {
    let mut line = text.replace('\n', " ").replace('\r', "");
    line.truncate(line.trim_end().len());
    line
}
