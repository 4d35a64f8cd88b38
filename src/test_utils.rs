//! Test utilities for tweetforge
//!
//! This module provides status fixtures and a recording listener for
//! testing the classifier, the aggregation stage and the transport.

use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::listener::{is_rate_limit, ListenerControl, StreamListener};
use crate::models::RawStatus;

/// Timestamp used by fixtures unless overridden
pub const DEFAULT_CREATED_AT: &str = "Wed Oct 10 20:19:24 +0000 2018";

/// Builder for status documents shaped like the provider's v1.1 payloads
#[derive(Debug, Clone)]
pub struct StatusBuilder {
    value: Value,
}

impl StatusBuilder {
    /// A plain status carrying every record field
    pub fn new(id: u64) -> Self {
        Self {
            value: json!({
                "created_at": DEFAULT_CREATED_AT,
                "id": id,
                "id_str": id.to_string(),
                "text": format!("status {}", id),
                "source": "<a href=\"https://mobile.twitter.com\" rel=\"nofollow\">Twitter Web App</a>",
                "truncated": false,
                "in_reply_to_status_id": null,
                "user": {
                    "id": 6253282,
                    "name": "Test User",
                    "screen_name": "test_user",
                    "location": "Somewhere",
                    "followers_count": 10
                },
                "geo": null,
                "coordinates": null,
                "favorite_count": 0,
                "retweet_count": 0,
                "entities": {
                    "hashtags": [],
                    "urls": [],
                    "user_mentions": [],
                    "symbols": []
                },
                "lang": "en"
            }),
        }
    }

    /// Set the short text
    pub fn text(mut self, text: &str) -> Self {
        self.value["text"] = json!(text);
        self
    }

    /// Attach an extended text (`extended_tweet.full_text`)
    pub fn extended_text(mut self, full_text: &str) -> Self {
        self.value["truncated"] = json!(true);
        self.value["extended_tweet"] = json!({ "full_text": full_text });
        self
    }

    /// Set the creation timestamp
    pub fn created_at(mut self, created_at: &str) -> Self {
        self.value["created_at"] = json!(created_at);
        self
    }

    /// Set the author's screen name
    pub fn screen_name(mut self, screen_name: &str) -> Self {
        self.value["user"]["screen_name"] = json!(screen_name);
        self
    }

    /// Set the hashtags entity list
    pub fn hashtags(mut self, tags: &[&str]) -> Self {
        self.value["entities"]["hashtags"] = tags
            .iter()
            .map(|tag| json!({ "text": tag, "indices": [0, tag.len() + 1] }))
            .collect();
        self
    }

    /// Set the language
    pub fn lang(mut self, lang: &str) -> Self {
        self.value["lang"] = json!(lang);
        self
    }

    /// Make this status a retweet of `inner`
    pub fn retweet_of(mut self, inner: Value) -> Self {
        self.value["retweeted_status"] = inner;
        self
    }

    /// Make this status a quote of `inner`
    pub fn quoting(mut self, inner: Value) -> Self {
        self.value["is_quote_status"] = json!(true);
        self.value["quoted_status"] = inner;
        self
    }

    /// Remove a top-level field
    pub fn without(mut self, field: &str) -> Self {
        if let Some(map) = self.value.as_object_mut() {
            map.remove(field);
        }
        self
    }

    /// Build the JSON document
    pub fn build(self) -> Value {
        self.value
    }

    /// Build a [`RawStatus`]
    pub fn build_status(self) -> RawStatus {
        RawStatus::new(self.value)
    }
}

/// Listener that records every callback, for transport tests
#[derive(Debug, Default)]
pub struct RecordingListener {
    /// Ids of the statuses received, in order
    pub status_ids: Vec<String>,
    /// Status codes passed to `on_error`
    pub error_codes: Vec<u16>,
    /// Stop after this many statuses
    pub stop_after: Option<usize>,
    /// Fail when a status with this id arrives
    pub fail_on: Option<String>,
}

impl RecordingListener {
    /// Create a listener that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after `count` statuses
    pub fn stop_after(mut self, count: usize) -> Self {
        self.stop_after = Some(count);
        self
    }

    /// Fail on the status with the given id
    pub fn fail_on(mut self, id: &str) -> Self {
        self.fail_on = Some(id.to_string());
        self
    }
}

impl StreamListener for RecordingListener {
    fn on_status(&mut self, status: &RawStatus) -> Result<ListenerControl> {
        let id = status.id_str().unwrap_or_default();
        if self.fail_on.as_deref() == Some(id.as_str()) {
            return Err(Error::internal(format!("refused status {}", id)));
        }
        self.status_ids.push(id);

        match self.stop_after {
            Some(limit) if self.status_ids.len() >= limit => Ok(ListenerControl::Stop),
            _ => Ok(ListenerControl::Continue),
        }
    }

    fn on_error(&mut self, status_code: u16) -> ListenerControl {
        self.error_codes.push(status_code);
        if is_rate_limit(status_code) {
            ListenerControl::Stop
        } else {
            ListenerControl::Continue
        }
    }
}
