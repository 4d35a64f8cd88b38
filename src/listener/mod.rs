//! Stream listener module
//!
//! This module provides:
//! - The callback contract the stream transport drives (`StreamListener`)
//! - The status classifier that fills the per-category collections and
//!   writes each normalized text to the output sink

mod status_listener;

pub use status_listener::{ListenerState, StatusListener};

use crate::error::Result;
use crate::models::RawStatus;

/// HTTP status codes the provider uses to signal a rate limit.
/// 420 is the legacy "Enhance Your Calm" code of the v1.1 streaming API.
pub const RATE_LIMIT_STATUS_CODES: [u16; 2] = [420, 429];

/// Check whether a status code is a rate-limit signal
pub fn is_rate_limit(status_code: u16) -> bool {
    RATE_LIMIT_STATUS_CODES.contains(&status_code)
}

/// What the transport should do after a callback returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerControl {
    /// Keep delivering events
    Continue,
    /// Stop the session; the listener accepts no further events
    Stop,
}

impl ListenerControl {
    /// Check if the transport should stop
    pub fn is_stop(&self) -> bool {
        matches!(self, ListenerControl::Stop)
    }
}

/// Callback surface invoked by the stream transport, once per event,
/// sequentially.
pub trait StreamListener {
    /// Handle one status. An error halts the session.
    fn on_status(&mut self, status: &RawStatus) -> Result<ListenerControl>;

    /// Handle a non-success status code from the provider
    fn on_error(&mut self, status_code: u16) -> ListenerControl;
}
