//! JSON Lines export of the normalized table

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use super::NormalizedTable;
use crate::error::Result;

/// Write one JSON object per row, keys in column order.
///
/// Returns the number of rows written.
pub fn write_json_lines<W: Write>(table: &NormalizedTable, mut writer: W) -> Result<usize> {
    for row in table.rows() {
        serde_json::to_writer(&mut writer, &table.row_to_json(row))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(table.len())
}

/// Export the table to a file, creating or truncating it
pub fn export_to_file(table: &NormalizedTable, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let rows = write_json_lines(table, BufWriter::new(file))?;
    info!(path = %path.display(), rows, "Exported normalized table");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::models::{Category, Record};
    use crate::test_utils::StatusBuilder;
    use serde_json::Value;

    fn sample_table() -> NormalizedTable {
        let tweet = Record::extract(&StatusBuilder::new(1).hashtags(&["rust"]).build(), Category::Tweet).unwrap();
        let retweet = Record::extract(&StatusBuilder::new(2).build(), Category::Retweet).unwrap();
        Aggregator::default().aggregate(&[tweet], &[retweet], &[]).unwrap()
    }

    #[test]
    fn test_write_json_lines() {
        let table = sample_table();
        let mut out = Vec::new();
        assert_eq!(write_json_lines(&table, &mut out).unwrap(), 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "Tweet");
        assert_eq!(lines[0]["created_at"], "Wed Oct 10 20:19:24 +0000 2018");
        assert_eq!(lines[0]["entities.hashtags"][0]["text"], "rust");
        assert_eq!(lines[1]["kind"], "Retweet");
        assert_eq!(lines[1]["user.screen_name"], "test_user");
    }

    #[test]
    fn test_empty_table_writes_nothing() {
        let table = Aggregator::default().aggregate(&[], &[], &[]).unwrap();
        let mut out = Vec::new();
        assert_eq!(write_json_lines(&table, &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.jsonl");
        assert_eq!(export_to_file(&sample_table(), &path).unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
