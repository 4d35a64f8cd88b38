//! Extraction error types for tweetforge models
//!
//! These errors describe a status that could not be turned into a record,
//! separate from the general application errors.

use std::fmt;
use thiserror::Error;

use super::status::Category;

/// Error raised when a status cannot be turned into a [`Record`](super::Record)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ExtractionError {
    /// The kind of extraction failure
    pub kind: ExtractionErrorKind,
    /// The field that failed
    pub field: String,
    /// Category the status was classified as
    pub category: Category,
    /// Optional additional context, usually the offending status id
    pub context: Option<String>,
}

impl ExtractionError {
    /// Create a new extraction error
    pub fn new(kind: ExtractionErrorKind, field: impl Into<String>, category: Category) -> Self {
        Self {
            kind,
            field: field.into(),
            category,
            context: None,
        }
    }

    /// Create a missing-field error, the common case
    pub fn missing(field: impl Into<String>, category: Category) -> Self {
        Self::new(ExtractionErrorKind::MissingField, field, category)
    }

    /// Add context to an existing error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(
                f,
                "{} status field '{}': {} - {}",
                self.category, self.field, self.kind, ctx
            ),
            None => write!(
                f,
                "{} status field '{}': {}",
                self.category, self.field, self.kind
            ),
        }
    }
}

/// Specific extraction failure types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionErrorKind {
    /// A field of the fixed record set is absent
    #[error("Required field is missing")]
    MissingField,

    /// The status or selected sub-structure is not a JSON object
    #[error("Expected a JSON object")]
    NotAnObject,

    /// The field is present but has an unusable type
    #[error("Field has an unexpected type (expected {expected})")]
    InvalidFieldType { expected: &'static str },
}

/// Result type alias for extraction operations
pub type ExtractionResult<T> = Result<T, ExtractionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error_creation() {
        let error = ExtractionError::missing("entities", Category::Retweet);
        assert_eq!(error.kind, ExtractionErrorKind::MissingField);
        assert_eq!(error.field, "entities");
        assert!(error.context.is_none());
    }

    #[test]
    fn test_extraction_error_display() {
        let error = ExtractionError::missing("geo", Category::Tweet).with_context("status 42");
        let display = error.to_string();
        assert!(display.contains("Tweet"));
        assert!(display.contains("'geo'"));
        assert!(display.contains("missing"));
        assert!(display.contains("status 42"));
    }

    #[test]
    fn test_invalid_type_display() {
        let error = ExtractionError::new(
            ExtractionErrorKind::InvalidFieldType { expected: "string" },
            "text",
            Category::Quoted,
        );
        assert!(error.to_string().contains("expected string"));
    }
}
