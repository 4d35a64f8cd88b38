//! Aggregation of the per-category collections into one table
//!
//! Runs once after the stream session ends:
//! - flattens `user` and `entities` into dotted-path columns
//! - projects every category onto a fixed column list
//! - tags rows with their `kind` and concatenates the three blocks
//! - coerces `created_at` to a structured date-time

pub mod export;
mod flatten;
mod table;

pub use export::{export_to_file, write_json_lines};
pub use flatten::{flatten_record, FLATTENED_FIELDS};
pub use table::{Cell, NormalizedTable, Row, KIND_COLUMN};

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::models::{Category, Collections, Record};

/// Provider-native timestamp format, e.g. `Wed Oct 10 20:19:24 +0000 2018`
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Column holding the creation timestamp
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Default projection of the exported table
pub const DEFAULT_COLUMNS: [&str; 14] = [
    "created_at",
    "id",
    "text",
    "favorite_count",
    "retweet_count",
    "lang",
    "geo",
    "coordinates",
    "source",
    "user.name",
    "user.screen_name",
    "user.location",
    "entities.hashtags",
    "entities.user_mentions",
];

/// Aggregation-specific error types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Column '{column}' is missing from every {category} record")]
    MissingColumn { column: String, category: Category },

    #[error("Projection must include the 'created_at' column")]
    MissingTimestampColumn,

    #[error("Invalid created_at value in {category} row {row}: {value}")]
    InvalidTimestamp {
        category: Category,
        row: usize,
        value: String,
    },
}

/// Parse a provider-formatted timestamp
pub fn parse_created_at(value: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_str(value, CREATED_AT_FORMAT)
}

/// Format a timestamp back into the provider format
pub fn format_created_at(dt: &DateTime<FixedOffset>) -> String {
    dt.format(CREATED_AT_FORMAT).to_string()
}

/// Builds a [`NormalizedTable`] from the three collections
#[derive(Debug, Clone)]
pub struct Aggregator {
    columns: Vec<String>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS.iter().map(|column| column.to_string()).collect())
    }
}

impl Aggregator {
    /// Create an aggregator with a custom projection
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// The projection, without the trailing `kind` column
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Aggregate the collections of a finished session
    pub fn aggregate_collections(
        &self,
        collections: &Collections,
    ) -> Result<NormalizedTable, AggregationError> {
        self.aggregate(&collections.tweets, &collections.retweets, &collections.quoted)
    }

    /// Flatten, project, tag and concatenate the three collections.
    ///
    /// No partial table is produced: any missing column or unparseable
    /// timestamp fails the whole aggregation.
    pub fn aggregate(
        &self,
        tweets: &[Record],
        retweets: &[Record],
        quoted: &[Record],
    ) -> Result<NormalizedTable, AggregationError> {
        let timestamp_index = self
            .columns
            .iter()
            .position(|column| column == CREATED_AT_COLUMN)
            .ok_or(AggregationError::MissingTimestampColumn)?;

        let mut rows = Vec::with_capacity(tweets.len() + retweets.len() + quoted.len());
        for (category, records) in [
            (Category::Tweet, tweets),
            (Category::Retweet, retweets),
            (Category::Quoted, quoted),
        ] {
            let projected = self.project(category, records)?;
            for (index, values) in projected.into_iter().enumerate() {
                rows.push(to_row(category, index, values, timestamp_index)?);
            }
            debug!(category = %category, rows = records.len(), "Category projected");
        }

        Ok(NormalizedTable::new(&self.columns, rows))
    }

    /// Flatten and project one category's records.
    ///
    /// A column must appear in at least one row of a non-empty category;
    /// rows lacking it individually get `null`.
    fn project(
        &self,
        category: Category,
        records: &[Record],
    ) -> Result<Vec<Vec<Value>>, AggregationError> {
        let flattened: Vec<Map<String, Value>> = records.iter().map(flatten_record).collect();
        if flattened.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(column) = self
            .columns
            .iter()
            .find(|column| !flattened.iter().any(|row| row.contains_key(column.as_str())))
        {
            return Err(AggregationError::MissingColumn {
                column: column.clone(),
                category,
            });
        }

        Ok(flattened
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| row.get(column).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect())
    }
}

fn to_row(
    category: Category,
    index: usize,
    values: Vec<Value>,
    timestamp_index: usize,
) -> Result<Row, AggregationError> {
    let cells = values
        .into_iter()
        .enumerate()
        .map(|(position, value)| {
            if position != timestamp_index {
                return Ok(Cell::Json(value));
            }
            value
                .as_str()
                .and_then(|raw| parse_created_at(raw).ok())
                .map(Cell::DateTime)
                .ok_or_else(|| AggregationError::InvalidTimestamp {
                    category,
                    row: index,
                    value: value.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Row::new(category, cells))
}
