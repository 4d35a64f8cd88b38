//! tweetforge Library
//!
//! Classifies a live status stream into tweets, retweets and quoted tweets,
//! then aggregates the collected records into one normalized table.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod listener;
pub mod logging;
pub mod models;
pub mod stream;
pub mod test_utils;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{Error, Result};

// Re-export model types
pub use models::{Category, Collections, ExtractionError, ExtractionErrorKind, RawStatus, Record};

// Re-export the session pipeline
pub use aggregate::{AggregationError, Aggregator, NormalizedTable};
pub use listener::{ListenerControl, StatusListener, StreamListener};
pub use stream::{Credentials, SessionEnd, SessionSummary, StreamClient};
