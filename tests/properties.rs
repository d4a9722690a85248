//! Property tests for dedup and round-trip semantics.

use proptest::prelude::*;
use rowdb::{Collection, Record, StoreConfig};
use serde_json::json;
use tempfile::TempDir;

fn record(value: serde_json::Value) -> Record {
    value.as_object().unwrap().clone()
}

proptest! {
    // Saving any sequence of keyed records keeps exactly the last
    // occurrence per key, positioned at that last occurrence.
    #[test]
    fn dedup_keeps_last_occurrence(entries in prop::collection::vec((0u8..5, any::<i64>()), 0..20)) {
        let dir = TempDir::new().unwrap();
        let col = Collection::open("props", StoreConfig::new(dir.path())).unwrap();

        let records: Vec<Record> = entries
            .iter()
            .map(|(k, v)| record(json!({"id": format!("k{}", k), "v": v})))
            .collect();
        col.save_items(records).unwrap();

        let mut expected: Vec<(String, i64)> = Vec::new();
        for (k, v) in &entries {
            let key = format!("k{}", k);
            expected.retain(|(seen, _)| seen != &key);
            expected.push((key, *v));
        }

        let all = col.all().unwrap();
        prop_assert_eq!(all.len(), expected.len());
        for (row, (key, v)) in all.iter().zip(expected.iter()) {
            prop_assert_eq!(row["id"].as_str().unwrap(), key.as_str());
            prop_assert_eq!(row["v"].as_i64().unwrap(), *v);
        }
    }

    // Arbitrary string content survives a write and reopen unchanged.
    #[test]
    fn round_trip_preserves_content(titles in prop::collection::vec(any::<String>(), 1..10)) {
        let dir = TempDir::new().unwrap();

        {
            let col = Collection::open("props", StoreConfig::new(dir.path())).unwrap();
            let records: Vec<Record> = titles
                .iter()
                .enumerate()
                .map(|(i, t)| record(json!({"id": i, "title": t})))
                .collect();
            col.save_items(records).unwrap();
        }

        let col = Collection::open("props", StoreConfig::new(dir.path())).unwrap();
        let all = col.all().unwrap();
        prop_assert_eq!(all.len(), titles.len());
        for (row, title) in all.iter().zip(titles.iter()) {
            prop_assert_eq!(row["title"].as_str().unwrap(), title.as_str());
        }
    }
}
