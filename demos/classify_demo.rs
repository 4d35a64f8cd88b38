//! Demonstration of status classification and aggregation
//!
//! Run with: cargo run --example classify_demo

use serde_json::{json, Value};
use tweetforge::aggregate::write_json_lines;
use tweetforge::{Aggregator, RawStatus, StatusListener, StreamListener};

fn main() {
    println!("=== tweetforge Classification Demo ===\n");

    let mut listener = StatusListener::with_sink(Vec::new());

    // Demo 1: the three categories
    demo_classification(&mut listener);
    println!();

    // Demo 2: a status that cannot be extracted
    demo_extraction_error(&mut listener);
    println!();

    // Demo 3: aggregation into one table
    demo_aggregation(listener);
}

fn status(id: u64, text: &str) -> Value {
    json!({
        "created_at": "Wed Oct 10 20:19:24 +0000 2018",
        "id": id,
        "id_str": id.to_string(),
        "text": text,
        "source": "demo",
        "in_reply_to_status_id": null,
        "user": {"name": "Demo User", "screen_name": "demo", "location": "Localhost"},
        "geo": null,
        "coordinates": null,
        "favorite_count": 0,
        "retweet_count": 0,
        "entities": {"hashtags": [{"text": "rustlang"}], "user_mentions": []},
        "lang": "en"
    })
}

fn demo_classification(listener: &mut StatusListener<Vec<u8>>) {
    println!("🏷️  Demo 1: Classification");
    println!("-------------------------");

    let plain = status(1, "hello world\n");

    let mut inner = status(2, "long form…");
    inner["extended_tweet"] = json!({"full_text": "long form text\r\nacross two lines"});
    let mut retweet = status(3, "RT @demo: long form…");
    retweet["retweeted_status"] = inner;

    let mut quote = status(5, "worth reading");
    quote["quoted_status"] = status(4, "the quoted original");

    for value in [plain, retweet, quote] {
        let raw = RawStatus::new(value);
        let category = raw.category();
        listener.on_status(&raw).unwrap();
        println!("  status {} -> {}", raw.id_str().unwrap_or_default(), category);
    }

    println!("\nText sink:");
    for line in String::from_utf8_lossy(listener.sink()).lines() {
        println!("  {}", line);
    }
}

fn demo_extraction_error(listener: &mut StatusListener<Vec<u8>>) {
    println!("❌ Demo 2: Extraction Error");
    println!("---------------------------");

    let mut broken = status(6, "no source field");
    broken.as_object_mut().unwrap().remove("source");

    match listener.on_status(&RawStatus::new(broken)) {
        Err(e) => println!("  {}", e),
        Ok(_) => println!("  Unexpected success!"),
    }
    println!("  Statuses seen: {}", listener.status_count());
}

fn demo_aggregation(listener: StatusListener<Vec<u8>>) {
    println!("📊 Demo 3: Aggregation");
    println!("----------------------");

    let collections = listener.finish().unwrap();
    let table = Aggregator::default().aggregate_collections(&collections).unwrap();

    println!("Columns: {}", table.columns().join(", "));
    for (category, rows) in table.kind_counts() {
        println!("  {}: {} row(s)", category, rows);
    }

    let mut out = Vec::new();
    write_json_lines(&table, &mut out).unwrap();
    println!("\nJSON Lines export:");
    print!("{}", String::from_utf8_lossy(&out));
}
