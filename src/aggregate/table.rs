//! The normalized table produced by aggregation

use chrono::{DateTime, FixedOffset};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::format_created_at;
use crate::models::Category;

/// Name of the trailing category column
pub const KIND_COLUMN: &str = "kind";

/// One value of the table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Plain JSON value copied from the record
    Json(Value),
    /// Coerced `created_at` value
    DateTime(DateTime<FixedOffset>),
    /// The `kind` tag
    Kind(Category),
}

impl Cell {
    /// JSON representation; timestamps use the provider format
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Json(value) => value.clone(),
            Cell::DateTime(dt) => Value::String(format_created_at(dt)),
            Cell::Kind(category) => Value::String(category.as_str().to_string()),
        }
    }

    /// The JSON value, when this is a plain cell
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Cell::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The timestamp, when this is the coerced `created_at` cell
    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Cell::DateTime(dt) => Some(dt),
            _ => None,
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Json(value) => value.serialize(serializer),
            Cell::DateTime(dt) => serializer.serialize_str(&format_created_at(dt)),
            Cell::Kind(category) => serializer.serialize_str(category.as_str()),
        }
    }
}

/// One table row: the projected cells followed by the `kind` cell
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    kind: Category,
    cells: Vec<Cell>,
}

impl Row {
    pub(crate) fn new(kind: Category, mut cells: Vec<Cell>) -> Self {
        cells.push(Cell::Kind(kind));
        Self { kind, cells }
    }

    /// Category this row came from
    pub fn kind(&self) -> Category {
        self.kind
    }

    /// Cell at a column position
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// All cells in column order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// Union of the three collections, flattened, projected and tagged.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl NormalizedTable {
    pub(crate) fn new(projection: &[String], rows: Vec<Row>) -> Self {
        let mut columns = projection.to_vec();
        columns.push(KIND_COLUMN.to_string());
        Self { columns, rows }
    }

    /// Column names: the projection followed by `kind`
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, Tweet block first, then Retweet, then Quoted
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row by position
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Position of a column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// All cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
    }

    /// The `kind` of every row
    pub fn kinds(&self) -> Vec<Category> {
        self.rows.iter().map(Row::kind).collect()
    }

    /// Row counts per category in block order
    pub fn kind_counts(&self) -> [(Category, usize); 3] {
        Category::ALL.map(|category| {
            (category, self.rows.iter().filter(|row| row.kind == category).count())
        })
    }

    /// A row as a JSON object keyed by column name, in column order
    pub fn row_to_json(&self, row: &Row) -> Map<String, Value> {
        self.columns
            .iter()
            .zip(row.cells())
            .map(|(column, cell)| (column.clone(), cell.to_json()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn table() -> NormalizedTable {
        let projection = vec!["created_at".to_string(), "id".to_string()];
        let ts = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2018, 10, 10, 20, 19, 24).unwrap();
        NormalizedTable::new(
            &projection,
            vec![
                Row::new(Category::Tweet, vec![Cell::DateTime(ts), Cell::Json(json!(1))]),
                Row::new(Category::Quoted, vec![Cell::DateTime(ts), Cell::Json(json!(2))]),
            ],
        )
    }

    #[test]
    fn test_columns_end_with_kind() {
        let table = table();
        assert_eq!(table.columns(), &["created_at", "id", "kind"]);
        assert_eq!(table.column_index("kind"), Some(2));
        assert_eq!(table.column_index("missing"), None);
    }

    #[test]
    fn test_row_to_json() {
        let table = table();
        let row = table.row_to_json(table.row(1).unwrap());
        assert_eq!(row["created_at"], "Wed Oct 10 20:19:24 +0000 2018");
        assert_eq!(row["id"], 2);
        assert_eq!(row["kind"], "Quoted");
        let keys: Vec<_> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, ["created_at", "id", "kind"]);
    }

    #[test]
    fn test_kind_counts() {
        let table = table();
        assert_eq!(
            table.kind_counts(),
            [(Category::Tweet, 1), (Category::Retweet, 0), (Category::Quoted, 1)]
        );
        assert_eq!(table.column("id").unwrap().len(), 2);
    }

    #[test]
    fn test_cell_serialization() {
        assert_eq!(serde_json::to_value(Cell::Kind(Category::Retweet)).unwrap(), json!("Retweet"));
        assert_eq!(serde_json::to_value(Cell::Json(json!([1, 2]))).unwrap(), json!([1, 2]));
    }
}
