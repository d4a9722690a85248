//! Identity assignment for records
//!
//! Records without a primary key get a deterministic ID: a keyed BLAKE3
//! hash of the record's canonical JSON encoding. Identical content hashes
//! to the identical ID, so re-saving the same content is an idempotent
//! insert rather than a duplicate. Callers that want distinct rows for
//! identical content set the primary key to the `"nonunique"` sentinel,
//! which is replaced with a hash of a timestamp plus a random number.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

use crate::query::Record;

/// Sentinel primary-key value requesting a freshly generated unique ID.
pub const NONUNIQUE_SENTINEL: &str = "nonunique";

/// Fixed default key for the keyed hash. Documented so that IDs are
/// reproducible across processes and releases.
const ID_HASH_KEY: &[u8; 32] = b"rowdb-default-identity-key-0001!";

/// Ensure `record` carries a primary-key value, assigning one if needed.
///
/// - Missing key: content hash over the record's canonical JSON encoding
///   (serde_json maps are key-ordered, so encoding is canonical).
/// - Key equal to `"nonunique"`: replaced with a fresh timestamp+random
///   hash, practically unique without any coordination.
/// - Any other key: left untouched; the caller asserts uniqueness.
pub fn ensure_id(mut record: Record, primary_key: &str) -> Record {
    match record.get(primary_key) {
        None => {
            let id = content_hash(&record);
            record.insert(primary_key.to_string(), Value::String(id));
        }
        Some(Value::String(s)) if s == NONUNIQUE_SENTINEL => {
            record.insert(primary_key.to_string(), Value::String(fresh_id()));
        }
        Some(_) => {}
    }
    record
}

/// Lowercase 64-char hex of the keyed hash of the record's JSON encoding.
pub fn content_hash(record: &Record) -> String {
    // Serializing a string-keyed map of JSON values cannot fail.
    let encoded = serde_json::to_vec(record).expect("JSON object encoding is infallible");
    blake3::keyed_hash(ID_HASH_KEY, &encoded).to_hex().to_string()
}

/// Hash of `<unix-millis>:<random u64>` under the same key.
fn fresh_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seed = format!("{}:{}", millis, rand::random::<u64>());
    blake3::keyed_hash(ID_HASH_KEY, seed.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_missing_key_gets_content_hash() {
        let a = ensure_id(record(json!({"title": "a"})), "id");
        let b = ensure_id(record(json!({"title": "a"})), "id");

        let id_a = a["id"].as_str().unwrap();
        assert_eq!(id_a.len(), 64);
        assert!(id_a.chars().all(|c| c.is_ascii_hexdigit()));
        // Identical content, identical id.
        assert_eq!(a["id"], b["id"]);
    }

    #[test]
    fn test_different_content_different_hash() {
        let a = ensure_id(record(json!({"title": "a"})), "id");
        let b = ensure_id(record(json!({"title": "b"})), "id");
        assert_ne!(a["id"], b["id"]);
    }

    #[test]
    fn test_existing_key_untouched() {
        let rec = ensure_id(record(json!({"id": 42, "title": "a"})), "id");
        assert_eq!(rec["id"], json!(42));
    }

    #[test]
    fn test_nonunique_sentinel_regenerated() {
        let a = ensure_id(record(json!({"id": "nonunique", "title": "x"})), "id");
        let b = ensure_id(record(json!({"id": "nonunique", "title": "x"})), "id");

        assert_ne!(a["id"].as_str().unwrap(), "nonunique");
        assert_ne!(b["id"].as_str().unwrap(), "nonunique");
        assert_ne!(a["id"], b["id"]);
        assert_eq!(a["id"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn test_custom_primary_key_field() {
        let rec = ensure_id(record(json!({"title": "a"})), "uuid");
        assert_eq!(rec["uuid"].as_str().unwrap().len(), 64);
        assert!(rec.get("id").is_none());
    }
}
