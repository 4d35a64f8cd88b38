//! Logging module for tweetforge
//!
//! Structured logging through `tracing`: JSON lines in production, pretty
//! output everywhere else. `RUST_LOG` overrides the configured level.

use std::time::{Duration, Instant};

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::error::{Error, Result};
use crate::models::Category;

/// Build the filter for the crate's own targets
fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tweetforge={},warn", log_level)))
}

/// Initialize the logging system
///
/// - `production`: JSON with thread ids and the current span
/// - anything else: pretty output without thread details
pub fn init_tracing(log_level: &str, environment: &str) -> Result<()> {
    let filter = env_filter(log_level);
    let registry = Registry::default().with(filter);

    let init = if environment == "production" {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    };
    init.map_err(|e| Error::internal(format!("Failed to initialize tracing: {}", e)))?;

    tracing::info!(environment, log_level, "Logging initialized");
    Ok(())
}

/// Span covering one streaming session
#[macro_export]
macro_rules! session_span {
    ($session_id:expr) => {
        tracing::info_span!(
            "session",
            session_id = %$session_id,
            statuses = tracing::field::Empty,
            end = tracing::field::Empty,
        )
    };
}

/// Span covering the classification of one status
#[macro_export]
macro_rules! status_span {
    ($count:expr, $category:expr) => {
        tracing::debug_span!(
            "status",
            status_count = $count,
            category = %$category,
        )
    };
}

/// Span covering the aggregation and export of a finished session
#[macro_export]
macro_rules! export_span {
    ($path:expr) => {
        tracing::info_span!(
            "export",
            file_path = %$path,
            rows_written = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        )
    };
}

/// Log a crate error with its type name
#[macro_export]
macro_rules! log_error {
    ($error:expr, $msg:expr) => {
        tracing::error!(
            error = %$error,
            error_type = $error.error_type(),
            $msg
        )
    };
    ($error:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::error!(
            error = %$error,
            error_type = $error.error_type(),
            $($key = tracing::field::display(&$value),)*
            $msg
        )
    };
}

/// Log the per-category counts of a collection or table
pub fn log_category_counts(stage: &str, counts: &[(Category, usize); 3]) {
    let [(_, tweets), (_, retweets), (_, quoted)] = *counts;
    tracing::info!(stage, tweets, retweets, quoted, "Category counts");
}

/// Helper for timing operations
pub struct Timer {
    start: Instant,
    operation: String,
}

impl Timer {
    /// Start a new timer
    pub fn start(operation: impl Into<String>) -> Self {
        Timer {
            start: Instant::now(),
            operation: operation.into(),
        }
    }

    /// Time elapsed so far
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and log the duration at debug level
    pub fn stop(self) -> Duration {
        self.stop_and_log(Level::DEBUG)
    }

    /// Stop the timer and log at the given level
    pub fn stop_and_log(self, level: Level) -> Duration {
        let duration = self.start.elapsed();
        let duration_ms = duration.as_millis() as u64;
        let operation = self.operation.as_str();
        match level {
            Level::TRACE => tracing::trace!(operation, duration_ms, "Operation completed"),
            Level::DEBUG => tracing::debug!(operation, duration_ms, "Operation completed"),
            Level::INFO => tracing::info!(operation, duration_ms, "Operation completed"),
            Level::WARN => tracing::warn!(operation, duration_ms, "Operation completed"),
            Level::ERROR => tracing::error!(operation, duration_ms, "Operation completed"),
        }
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer() {
        let timer = Timer::start("aggregate");
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed() >= Duration::from_millis(10));
        let duration = timer.stop_and_log(Level::INFO);
        assert!(duration.as_millis() >= 10);
    }

    #[test]
    fn test_spans_and_counts() {
        let span = crate::session_span!("abc");
        let _enter = span.enter();
        let _status = crate::status_span!(1u64, Category::Tweet);
        let _export = crate::export_span!("out.jsonl");
        log_category_counts("collected", &[(Category::Tweet, 1), (Category::Retweet, 0), (Category::Quoted, 2)]);
        crate::log_error!(Error::stream("boom"), "Stream failed", attempt = 1);
    }
}
