//! tweetforge - a real-time status stream listener
//!
//! Connects to the filter stream, classifies every status into tweets,
//! retweets and quoted tweets, writes their text to a file and, once the
//! session ends, exports the normalized table of all collected records.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn, Instrument};
use uuid::Uuid;

use tweetforge::aggregate::{export_to_file, Aggregator};
use tweetforge::logging::{self, log_category_counts, Timer};
use tweetforge::stream::{Credentials, SessionEnd, SessionSummary, StreamClient};
use tweetforge::{Config, Result, StatusListener};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env()?;

    // Validate configuration
    config.validate()?;

    // Initialize logging/tracing
    logging::init_tracing(&config.app.log_level, &config.app.environment)?;

    // Log configuration (with secrets masked)
    config.log_config();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting tweetforge");

    let session_id = Uuid::new_v4();
    let span = tweetforge::session_span!(session_id);
    run_session(config).instrument(span).await?;

    info!("tweetforge shutdown complete");
    Ok(())
}

/// One session: stream, then aggregate and export whatever was collected.
///
/// A stream or listener error is returned only after the export.
async fn run_session(config: Config) -> Result<()> {
    let mut listener = StatusListener::create(&config.output.text_path)?;
    let client = StreamClient::new(Credentials::from(&config.credentials), config.stream.clone())?;

    let outcome = tokio::select! {
        result = client.run(&mut listener) => result.map(Some),
        _ = run_limit(config.stream.run_limit()) => {
            info!("Run duration reached, stopping session");
            Ok(None)
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, stopping session");
            Ok(None)
        }
    };
    listener.stop();

    let span = tracing::Span::current();
    match &outcome {
        Ok(Some(SessionSummary { end, statuses, .. })) => {
            span.record("statuses", *statuses);
            span.record("end", end.as_str());
            if *end == SessionEnd::RateLimited {
                warn!("Session ended by rate limit");
            }
        },
        Ok(None) => {
            span.record("end", SessionEnd::Stopped.as_str());
        },
        Err(e) => tweetforge::log_error!(e, "Stream session failed"),
    }

    let collections = listener.finish()?;
    log_category_counts("collected", &collections.counts());

    let export_span = tweetforge::export_span!(config.output.table_path);
    let timer = Timer::start("aggregate_and_export");
    let aggregator = Aggregator::new(config.output.columns_list());
    let table = aggregator.aggregate_collections(&collections)?;
    let rows = export_to_file(&table, &config.output.table_path)?;
    let duration = timer.stop_and_log(tracing::Level::INFO);
    export_span.record("rows_written", rows);
    export_span.record("duration_ms", duration.as_millis() as u64);

    outcome.map(|_| ())
}

/// Resolves after the configured limit, or never
fn run_limit(limit: Option<Duration>) -> impl Future<Output = ()> {
    async move {
        match limit {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    }
}
