//! Fixed-shape record extracted from a status
//!
//! Every record carries exactly the same field set regardless of category,
//! which is what lets the aggregation stage treat all three collections
//! uniformly.

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::{ExtractionError, ExtractionErrorKind, ExtractionResult};
use super::status::Category;

/// Field names copied from a status payload, in record order
pub const RECORD_FIELDS: [&str; 11] = [
    "created_at",
    "id",
    "text",
    "favorite_count",
    "retweet_count",
    "lang",
    "geo",
    "coordinates",
    "source",
    "user",
    "entities",
];

/// Normalized record for one status
///
/// Values are plain JSON and may be `null`; only the presence of each key
/// is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Copy the fixed field set out of a status payload
    ///
    /// Fails on the first field of [`RECORD_FIELDS`] that is absent, so a
    /// partial record is never produced.
    pub fn extract(payload: &Value, category: Category) -> ExtractionResult<Self> {
        let source = payload.as_object().ok_or_else(|| {
            ExtractionError::new(ExtractionErrorKind::NotAnObject, "status", category)
        })?;

        let mut fields = Map::with_capacity(RECORD_FIELDS.len());
        for field in RECORD_FIELDS {
            let value = source
                .get(field)
                .ok_or_else(|| ExtractionError::missing(field, category))?;
            fields.insert(field.to_string(), value.clone());
        }

        Ok(Self { fields })
    }

    /// Look up a field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field names in record order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields, always `RECORD_FIELDS.len()`
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Records are never empty; provided for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Provider-formatted creation timestamp
    pub fn created_at(&self) -> Option<&str> {
        self.get("created_at").and_then(Value::as_str)
    }

    /// Numeric status identifier
    pub fn id(&self) -> Option<u64> {
        self.get("id").and_then(Value::as_u64)
    }

    /// Short text as sent by the provider
    pub fn text(&self) -> Option<&str> {
        self.get("text").and_then(Value::as_str)
    }

    /// Author object
    pub fn user(&self) -> Option<&Map<String, Value>> {
        self.get("user").and_then(Value::as_object)
    }

    /// Entities object (hashtags, mentions, urls...)
    pub fn entities(&self) -> Option<&Map<String, Value>> {
        self.get("entities").and_then(Value::as_object)
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Convert into a JSON object
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}
