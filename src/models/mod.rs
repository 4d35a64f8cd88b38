//! Data models for tweetforge
//!
//! This module contains the domain models used throughout the application:
//! raw status documents, their classification, the fixed-shape records
//! extracted from them and the per-category collections.

pub mod collections;
pub mod error;
pub mod record;
pub mod status;

// Re-export commonly used types
pub use collections::Collections;
pub use error::{ExtractionError, ExtractionErrorKind, ExtractionResult};
pub use record::{Record, RECORD_FIELDS};
pub use status::{normalize_text, resolve_text, Category, RawStatus};
