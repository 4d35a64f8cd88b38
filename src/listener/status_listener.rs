//! Status classification and extraction for one streaming session

use std::fs::File;
use std::io::{LineWriter, Write};
use std::path::Path;

use tracing::{debug, error, info, warn};

use super::{is_rate_limit, ListenerControl, StreamListener};
use crate::error::Result;
use crate::models::{
    normalize_text, resolve_text, Category, Collections, ExtractionError, ExtractionErrorKind, RawStatus, Record,
};

/// Lifecycle of a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Accepting statuses
    Listening,
    /// Terminal: rate limited or stopped by the operator
    Stopped,
}

/// Classifies each incoming status, keeps its record in the collection of
/// its category and writes its normalized text to the output sink.
///
/// One instance owns the collections and the sink for exactly one session.
pub struct StatusListener<W: Write = LineWriter<File>> {
    /// Output text sink, one line per status
    sink: W,

    /// Records accumulated so far
    collections: Collections,

    /// Statuses received, diagnostic only
    status_counter: u64,

    /// Current lifecycle state
    state: ListenerState,
}

impl StatusListener<LineWriter<File>> {
    /// Open the output text file (created or truncated) and start a session.
    ///
    /// The parent directory must already exist.
    pub fn create(output_path: impl AsRef<Path>) -> Result<Self> {
        let path = output_path.as_ref();
        let file = File::create(path)?;
        info!(path = %path.display(), "Opened output text sink");
        Ok(Self::with_sink(LineWriter::new(file)))
    }
}

impl<W: Write> StatusListener<W> {
    /// Start a session writing to an arbitrary sink
    pub fn with_sink(sink: W) -> Self {
        Self {
            sink,
            collections: Collections::new(),
            status_counter: 0,
            state: ListenerState::Listening,
        }
    }

    /// Classify and extract one status, returning its category.
    ///
    /// On error nothing is appended and nothing is written.
    pub fn process(&mut self, status: &RawStatus) -> Result<Category> {
        self.status_counter += 1;

        let (category, payload) = status.classify();
        let span = crate::status_span!(self.status_counter, category);
        let _enter = span.enter();

        let context = || format!("status {}", status.id_str().unwrap_or_else(|| "<no id>".into()));

        let text = resolve_text(payload).ok_or_else(|| {
            let error = match payload.get("text") {
                Some(value) if !value.is_null() => ExtractionError::new(
                    ExtractionErrorKind::InvalidFieldType { expected: "string" },
                    "text",
                    category,
                ),
                _ => ExtractionError::missing("text", category),
            };
            error.with_context(context())
        })?;
        let line = normalize_text(text);

        let record =
            Record::extract(payload, category).map_err(|e| e.with_context(context()))?;

        writeln!(self.sink, "{}", line)?;
        self.collections.push(category, record);

        debug!(status_count = self.status_counter, "Status classified");
        Ok(category)
    }

    /// Enter the terminal state without a provider signal
    pub fn stop(&mut self) {
        if self.state == ListenerState::Listening {
            info!(status_count = self.status_counter, "Listener stopped");
        }
        self.state = ListenerState::Stopped;
    }

    /// Current lifecycle state
    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Check if the listener reached its terminal state
    pub fn is_stopped(&self) -> bool {
        self.state == ListenerState::Stopped
    }

    /// Number of statuses received in this session
    pub fn status_count(&self) -> u64 {
        self.status_counter
    }

    /// Borrow all collections
    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    /// Plain tweets collected so far
    pub fn tweets(&self) -> &[Record] {
        &self.collections.tweets
    }

    /// Retweets collected so far
    pub fn retweets(&self) -> &[Record] {
        &self.collections.retweets
    }

    /// Quoted tweets collected so far
    pub fn quoted(&self) -> &[Record] {
        &self.collections.quoted
    }

    /// Record counts per category in block order
    pub fn category_counts(&self) -> [(Category, usize); 3] {
        self.collections.counts()
    }

    /// Borrow the sink
    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// End the session: flush the sink and hand back the collections
    pub fn finish(mut self) -> Result<Collections> {
        self.sink.flush()?;
        let [(_, tweets), (_, retweets), (_, quoted)] = self.collections.counts();
        info!(
            status_count = self.status_counter,
            tweets,
            retweets,
            quoted,
            "Listener session finished"
        );
        Ok(self.collections)
    }

    /// Like [`finish`](Self::finish) but also returns the sink
    pub fn into_parts(mut self) -> Result<(Collections, W)> {
        self.sink.flush()?;
        Ok((self.collections, self.sink))
    }
}

impl<W: Write> StreamListener for StatusListener<W> {
    fn on_status(&mut self, status: &RawStatus) -> Result<ListenerControl> {
        if self.is_stopped() {
            debug!("Listener stopped, ignoring status");
            return Ok(ListenerControl::Stop);
        }

        self.process(status).map_err(|e| {
            error!(error = %e, error_type = e.error_type(), "Failed to process status");
            e
        })?;

        Ok(ListenerControl::Continue)
    }

    fn on_error(&mut self, status_code: u16) -> ListenerControl {
        if is_rate_limit(status_code) {
            warn!(
                status_code,
                status_count = self.status_counter,
                "You have been rate-limited for making too many requests"
            );
            self.state = ListenerState::Stopped;
            return ListenerControl::Stop;
        }

        error!(status_code, "Stream reported an error");
        ListenerControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::RECORD_FIELDS;
    use crate::test_utils::StatusBuilder;

    fn listener() -> StatusListener<Vec<u8>> {
        StatusListener::with_sink(Vec::new())
    }

    fn sink_text(listener: &StatusListener<Vec<u8>>) -> String {
        String::from_utf8(listener.sink().clone()).unwrap()
    }

    #[test]
    fn test_plain_status_scenario() {
        let mut listener = listener();
        let status = StatusBuilder::new(1).text("hello world\n").build_status();

        let category = listener.process(&status).unwrap();

        assert_eq!(category, Category::Tweet);
        assert_eq!(listener.tweets().len(), 1);
        assert_eq!(listener.tweets()[0].len(), RECORD_FIELDS.len());
        assert_eq!(sink_text(&listener), "hello world\n");
    }

    #[test]
    fn test_retweet_prefers_extended_text() {
        let mut listener = listener();
        let inner = StatusBuilder::new(10)
            .text("long form…")
            .extended_text("long form text here")
            .build();
        let status = StatusBuilder::new(11).text("RT @x: long form…").retweet_of(inner).build_status();

        assert_eq!(listener.process(&status).unwrap(), Category::Retweet);
        assert_eq!(sink_text(&listener), "long form text here\n");
        // the record comes from the reshared status, not the wrapper
        assert_eq!(listener.retweets()[0].id(), Some(10));
    }

    #[test]
    fn test_quoted_fallback_appends_to_quoted() {
        // A quote whose inner status has no extended text must still land in
        // the quoted collection, never in the plain tweets.
        let mut listener = listener();
        let inner = StatusBuilder::new(20).text("short quoted").build();
        let status = StatusBuilder::new(21).text("my take").quoting(inner).build_status();

        assert_eq!(listener.process(&status).unwrap(), Category::Quoted);
        assert!(listener.tweets().is_empty());
        assert_eq!(listener.quoted().len(), 1);
        assert_eq!(sink_text(&listener), "short quoted\n");
    }

    #[test]
    fn test_missing_field_writes_nothing() {
        let mut listener = listener();
        let status = StatusBuilder::new(5).without("source").build_status();

        let err = listener.process(&status).unwrap_err();
        match err {
            Error::Extraction(e) => {
                assert_eq!(e.kind, ExtractionErrorKind::MissingField);
                assert_eq!(e.field, "source");
                assert_eq!(e.context.as_deref(), Some("status 5"));
            },
            other => panic!("unexpected error: {other}"),
        }
        assert!(listener.collections().is_empty());
        assert!(sink_text(&listener).is_empty());
        assert_eq!(listener.status_count(), 1);
    }

    #[test]
    fn test_missing_text_is_an_error() {
        let mut listener = listener();
        let status = StatusBuilder::new(6).without("text").build_status();
        assert!(listener.on_status(&status).is_err());
    }

    #[test]
    fn test_non_string_text_is_invalid() {
        let mut listener = listener();
        let mut status = StatusBuilder::new(7).build();
        status["text"] = serde_json::json!(42);

        match listener.process(&RawStatus::new(status)) {
            Err(Error::Extraction(e)) => {
                assert_eq!(e.kind, ExtractionErrorKind::InvalidFieldType { expected: "string" })
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_rate_limit_stops_listener() {
        let mut listener = listener();
        listener.process(&StatusBuilder::new(1).build_status()).unwrap();

        assert_eq!(listener.on_error(420), ListenerControl::Stop);
        assert!(listener.is_stopped());

        let control = listener.on_status(&StatusBuilder::new(2).build_status()).unwrap();
        assert_eq!(control, ListenerControl::Stop);
        assert_eq!(listener.tweets().len(), 1);
    }

    #[test]
    fn test_other_errors_continue() {
        let mut listener = listener();
        assert_eq!(listener.on_error(503), ListenerControl::Continue);
        assert_eq!(listener.state(), ListenerState::Listening);
    }

    #[test]
    fn test_counter_counts_every_status() {
        let mut listener = listener();
        for id in 0..3 {
            listener.on_status(&StatusBuilder::new(id).build_status()).unwrap();
        }
        assert_eq!(listener.status_count(), 3);
        assert_eq!(
            listener.category_counts(),
            [(Category::Tweet, 3), (Category::Retweet, 0), (Category::Quoted, 0)]
        );
    }

    #[test]
    fn test_finish_returns_collections() {
        let mut listener = listener();
        listener.process(&StatusBuilder::new(1).build_status()).unwrap();
        let collections = listener.finish().unwrap();
        assert_eq!(collections.tweets.len(), 1);
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "stale content\n").unwrap();

        let mut listener = StatusListener::create(&path).unwrap();
        listener.process(&StatusBuilder::new(1).text("fresh").build_status()).unwrap();
        listener.finish().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn test_create_requires_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        assert!(matches!(StatusListener::create(&path), Err(Error::Io(_))));
    }
}
