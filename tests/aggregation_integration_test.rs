//! Integration tests for aggregation and table export

use serde_json::{json, Value};
use tweetforge::aggregate::{export_to_file, format_created_at, write_json_lines, DEFAULT_COLUMNS};
use tweetforge::{AggregationError, Aggregator, Category, RawStatus, StatusListener, StreamListener};

fn status_json(id: u64, created_at: &str) -> Value {
    json!({
        "created_at": created_at,
        "id": id,
        "id_str": id.to_string(),
        "text": format!("status number {}", id),
        "source": "web",
        "in_reply_to_status_id": null,
        "user": {
            "name": format!("User {}", id),
            "screen_name": format!("user_{}", id),
            "location": "Earth",
            "entities": {"description": {"urls": []}}
        },
        "geo": null,
        "coordinates": null,
        "favorite_count": id * 2,
        "retweet_count": id,
        "entities": {
            "hashtags": [],
            "user_mentions": [{"screen_name": "someone", "indices": [0, 8]}]
        },
        "lang": "en"
    })
}

fn retweet_json(id: u64) -> Value {
    let mut outer = status_json(id + 1000, "Thu Oct 11 08:00:00 +0000 2018");
    outer["retweeted_status"] = status_json(id, "Thu Oct 11 07:00:00 +0000 2018");
    outer
}

fn quote_json(id: u64) -> Value {
    let mut outer = status_json(id + 2000, "Fri Oct 12 09:30:00 +0000 2018");
    outer["quoted_status"] = status_json(id, "Fri Oct 12 09:00:00 +0000 2018");
    outer
}

fn collected_listener() -> StatusListener<Vec<u8>> {
    let mut listener = StatusListener::with_sink(Vec::new());
    let statuses = vec![
        status_json(1, "Wed Oct 10 20:19:24 +0000 2018"),
        quote_json(50),
        status_json(2, "Wed Oct 10 20:20:00 +0000 2018"),
        retweet_json(30),
        status_json(3, "Wed Oct 10 20:21:00 +0000 2018"),
        quote_json(51),
    ];
    for status in statuses {
        listener.on_status(&RawStatus::new(status)).unwrap();
    }
    listener
}

#[test]
fn test_three_one_two_yields_six_rows_in_block_order() {
    let listener = collected_listener();
    let table = Aggregator::default()
        .aggregate(listener.tweets(), listener.retweets(), listener.quoted())
        .unwrap();

    assert_eq!(table.len(), 6);
    assert_eq!(
        table.kinds(),
        [
            Category::Tweet,
            Category::Tweet,
            Category::Tweet,
            Category::Retweet,
            Category::Quoted,
            Category::Quoted
        ]
    );

    let ids: Vec<Value> = table.column("id").unwrap().into_iter().map(|c| c.to_json()).collect();
    assert_eq!(ids, [json!(1), json!(2), json!(3), json!(30), json!(50), json!(51)]);
}

#[test]
fn test_table_columns_are_projection_plus_kind() {
    let listener = collected_listener();
    let table = Aggregator::default().aggregate_collections(listener.collections()).unwrap();

    assert_eq!(table.columns().len(), DEFAULT_COLUMNS.len() + 1);
    assert_eq!(&table.columns()[..DEFAULT_COLUMNS.len()], DEFAULT_COLUMNS);
    assert_eq!(table.columns().last().unwrap(), "kind");

    let screen_names: Vec<Value> = table
        .column("user.screen_name")
        .unwrap()
        .into_iter()
        .map(|c| c.to_json())
        .collect();
    assert_eq!(screen_names[3], "user_30");
}

#[test]
fn test_created_at_round_trips() {
    let listener = collected_listener();
    let table = Aggregator::default().aggregate_collections(listener.collections()).unwrap();
    let index = table.column_index("created_at").unwrap();

    let originals: Vec<String> = listener
        .tweets()
        .iter()
        .chain(listener.retweets())
        .chain(listener.quoted())
        .map(|r| r.created_at().unwrap().to_string())
        .collect();

    for (row, original) in table.rows().iter().zip(originals) {
        let dt = row.get(index).and_then(|c| c.as_datetime()).unwrap();
        assert_eq!(format_created_at(dt), original);
    }
}

#[test]
fn test_custom_projection_with_nested_user_column() {
    let listener = collected_listener();
    let aggregator = Aggregator::new(vec![
        "created_at".to_string(),
        "user.entities.description.urls".to_string(),
    ]);

    let table = aggregator.aggregate_collections(listener.collections()).unwrap();
    assert_eq!(table.columns(), &["created_at", "user.entities.description.urls", "kind"]);
    assert_eq!(table.row(0).unwrap().get(1).unwrap().to_json(), json!([]));
}

#[test]
fn test_missing_column_produces_no_table() {
    let listener = collected_listener();
    let aggregator = Aggregator::new(vec!["created_at".to_string(), "place".to_string()]);

    let err = aggregator.aggregate_collections(listener.collections()).unwrap_err();
    assert_eq!(
        err,
        AggregationError::MissingColumn {
            column: "place".to_string(),
            category: Category::Tweet
        }
    );
}

#[test]
fn test_empty_categories_contribute_no_rows() {
    let mut listener = StatusListener::with_sink(Vec::new());
    listener
        .on_status(&RawStatus::new(status_json(1, "Wed Oct 10 20:19:24 +0000 2018")))
        .unwrap();

    let table = Aggregator::default().aggregate_collections(listener.collections()).unwrap();
    assert_eq!(
        table.kind_counts(),
        [(Category::Tweet, 1), (Category::Retweet, 0), (Category::Quoted, 0)]
    );
}

#[test]
fn test_json_lines_export() {
    let listener = collected_listener();
    let table = Aggregator::default().aggregate_collections(listener.collections()).unwrap();

    let mut buffer = Vec::new();
    assert_eq!(write_json_lines(&table, &mut buffer).unwrap(), 6);

    let text = String::from_utf8(buffer).unwrap();
    let first: serde_json::Map<String, Value> =
        serde_json::from_str(text.lines().next().unwrap()).unwrap();
    let keys: Vec<&str> = first.keys().map(String::as_str).collect();
    assert_eq!(keys, table.columns());
    assert_eq!(first["created_at"], "Wed Oct 10 20:19:24 +0000 2018");
    assert_eq!(first["entities.user_mentions"][0]["screen_name"], "someone");
    assert_eq!(first["kind"], "Tweet");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("statuses.jsonl");
    assert_eq!(export_to_file(&table, &path).unwrap(), 6);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
}
