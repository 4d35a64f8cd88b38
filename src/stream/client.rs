//! Filter stream client

use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, error, info, warn};

use super::{Credentials, OAuthSigner, SessionEnd, SessionSummary, StreamMessage};
use crate::config::StreamConfig;
use crate::error::{Error, Result};
use crate::listener::{is_rate_limit, ListenerControl, StreamListener};

/// Opens one filter-stream connection per [`run`](Self::run) and feeds the
/// listener until the session ends.
#[derive(Debug)]
pub struct StreamClient {
    http: reqwest::Client,
    signer: OAuthSigner,
    config: StreamConfig,
}

impl StreamClient {
    pub fn new(credentials: Credentials, config: StreamConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout())
            .user_agent(concat!("tweetforge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            signer: OAuthSigner::new(credentials),
            config,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    async fn connect(&self) -> Result<reqwest::Response> {
        let params = self.config.form_params();
        let authorization = self.signer.sign("POST", &self.config.url, &params)?;

        info!(url = %self.config.url, track = ?self.config.track_list(), "Connecting to filter stream");

        let response = self
            .http
            .post(&self.config.url)
            .header(AUTHORIZATION, authorization)
            .form(&params)
            .send()
            .await?;

        Ok(response)
    }

    /// Run one session.
    ///
    /// Returns how the session ended. An error from the listener halts the
    /// session and is returned as is; statuses already processed stay in the
    /// listener.
    pub async fn run<L>(&self, listener: &mut L) -> Result<SessionSummary>
    where
        L: StreamListener + ?Sized,
    {
        let response = self.connect().await?;
        let status = response.status();

        if !status.is_success() {
            let code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status_code = code, body = %body, "Stream request rejected");

            return match listener.on_error(code) {
                ListenerControl::Stop => Ok(SessionSummary {
                    end: if is_rate_limit(code) { SessionEnd::RateLimited } else { SessionEnd::Stopped },
                    statuses: 0,
                    messages: 0,
                }),
                ListenerControl::Continue if is_rate_limit(code) => Err(Error::RateLimit(code)),
                ListenerControl::Continue if code == 401 => {
                    Err(Error::auth("Stream request was not authorized"))
                },
                ListenerControl::Continue => {
                    Err(Error::stream(format!("Stream request failed with status {}", code)))
                },
            };
        }

        info!(status = %status, "Connected to filter stream");

        let mut summary = SessionSummary {
            end: SessionEnd::Completed,
            statuses: 0,
            messages: 0,
        };
        let mut body = response.bytes_stream();
        let mut framer = LineFramer::default();
        let idle_timeout = self.config.timeout();

        loop {
            let chunk: Bytes = match tokio::time::timeout(idle_timeout, body.next()).await {
                Ok(Some(chunk)) => chunk?,
                Ok(None) => break,
                Err(_) => {
                    return Err(Error::stream(format!(
                        "No data received for {} seconds",
                        idle_timeout.as_secs()
                    )))
                },
            };

            for line in framer.push(&chunk) {
                if let Some(end) = dispatch(&line, listener, &mut summary)? {
                    summary.end = end;
                    info!(end = %end, statuses = summary.statuses, "Stream session ended");
                    return Ok(summary);
                }
            }
        }

        if let Some(line) = framer.finish() {
            if let Some(end) = dispatch(&line, listener, &mut summary)? {
                summary.end = end;
            }
        }

        info!(end = %summary.end, statuses = summary.statuses, "Stream body ended");
        Ok(summary)
    }
}

/// Handle one line; `Some` ends the session
fn dispatch<L>(line: &str, listener: &mut L, summary: &mut SessionSummary) -> Result<Option<SessionEnd>>
where
    L: StreamListener + ?Sized,
{
    summary.messages += 1;

    let message = match StreamMessage::parse(line) {
        Ok(message) => message,
        Err(e) => {
            warn!(error = %e, "Skipping malformed stream line");
            return Ok(None);
        },
    };

    match message {
        StreamMessage::Status(status) => {
            summary.statuses += 1;
            let control = listener.on_status(&status).map_err(|e| {
                error!(
                    status_id = status.id_str().as_deref().unwrap_or("<no id>"),
                    error = %e,
                    "Listener failed, halting session"
                );
                e
            })?;
            if control.is_stop() {
                return Ok(Some(SessionEnd::Stopped));
            }
        },
        StreamMessage::Delete(notice) => debug!(notice = %notice, "Deletion notice"),
        StreamMessage::Limit { undelivered } => info!(undelivered, "Limit notice"),
        StreamMessage::Disconnect { code, reason } => {
            warn!(code = ?code, reason = %reason, "Provider disconnected the stream");
            return Ok(Some(SessionEnd::Disconnected));
        },
        StreamMessage::Warning { code, message } => {
            warn!(code = %code, message = %message, "Stream warning")
        },
        StreamMessage::Other(_) => debug!("Ignoring unrecognized stream message"),
    }

    Ok(None)
}

/// Splits the body into newline-terminated lines across chunk boundaries
#[derive(Debug, Default)]
struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    /// Append a chunk and take every complete non-blank line
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw).trim().to_string();
            // blank lines are keep-alives
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }

    /// Whatever is left after the body ends
    fn finish(&mut self) -> Option<String> {
        let line = String::from_utf8_lossy(&self.buffer).trim().to_string();
        self.buffer.clear();
        (!line.is_empty()).then_some(line)
    }
}
