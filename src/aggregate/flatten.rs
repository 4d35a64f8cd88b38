//! Dotted-path flattening of nested record objects

use serde_json::{Map, Value};

use crate::models::Record;

/// Record fields whose objects are expanded into dotted-path columns
pub const FLATTENED_FIELDS: [&str; 2] = ["user", "entities"];

/// Flatten a record into a single-level map.
///
/// `user` and `entities` objects are expanded recursively (`user.name`,
/// `user.entities.url.urls`, ...). Arrays stay whole, so
/// `entities.hashtags` is one column holding the list. Every other field is
/// copied unchanged.
pub fn flatten_record(record: &Record) -> Map<String, Value> {
    let mut flat = Map::new();

    for (key, value) in record.as_map() {
        match value {
            Value::Object(object) if FLATTENED_FIELDS.contains(&key.as_str()) => {
                flatten_into(&mut flat, key, object);
            },
            _ => {
                flat.insert(key.clone(), value.clone());
            },
        }
    }

    flat
}

fn flatten_into(out: &mut Map<String, Value>, prefix: &str, object: &Map<String, Value>) {
    for (key, value) in object {
        let path = format!("{}.{}", prefix, key);
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(out, &path, inner),
            _ => {
                out.insert(path, value.clone());
            },
        }
    }
}
