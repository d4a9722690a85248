//! Collection manager - the public record-store API
//!
//! A `Collection` binds to one dataType and composes the other pieces:
//! every public operation reloads the on-disk snapshot (read-your-writes
//! freshness against external writers), applies the query engine and/or
//! identity assignment, and for mutations hands the resulting row set to
//! the durable writer before returning.
//!
//! There is deliberately no cross-call in-memory cache: the snapshot is
//! valid only for the duration of one operation. The cost is that the
//! reload→mutate→write sequence is not atomic against another writer
//! process; the reload only narrows that race, it does not close it.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::identity::ensure_id;
use crate::query::{Matcher, Record};
use crate::writer::{self, RowsDocument, ROWS_FILE};

/// A bound collection: one dataType, one `rows.json`.
pub struct Collection {
    data_type: String,
    dir: PathBuf,
    primary_key: String,
}

impl Collection {
    /// Bind to a collection by type name, creating the backing
    /// directory and an empty `rows.json` if absent.
    ///
    /// Type names are case-insensitive (normalized to lowercase) and
    /// restricted to 1-128 characters of `[a-zA-Z0-9_-]`.
    pub fn open(data_type: &str, config: StoreConfig) -> Result<Self> {
        let data_type = data_type.to_lowercase();
        Self::validate_type_name(&data_type)?;

        let collection = Self {
            dir: config.data_root.join(&data_type),
            data_type,
            primary_key: config.primary_key,
        };
        collection.load()?;
        Ok(collection)
    }

    /// Collection type name (lowercased).
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// Primary-key field name for this collection.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    fn validate_type_name(name: &str) -> Result<()> {
        if name.is_empty() || name.len() > 128 {
            return Err(StoreError::InvalidTypeName(
                "name must be 1-128 characters".to_string(),
            ));
        }
        let valid = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidTypeName(
                "name can only contain a-z, A-Z, 0-9, _, -".to_string(),
            ));
        }
        Ok(())
    }

    /// Load the current snapshot from disk.
    ///
    /// A missing or malformed file (or one whose `rows` field is not an
    /// array) is treated as "no data yet": the collection resets to empty
    /// and a fresh empty document is written. Malformed content is
    /// distinguished from first-run absence only by a log warning.
    fn load(&self) -> Result<Vec<Value>> {
        let path = self.dir.join(ROWS_FILE);
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RowsDocument>(&contents) {
                Ok(doc) => Ok(doc.rows),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        "malformed rows file, resetting to empty: {}", err
                    );
                    self.reset_empty()
                }
            },
            Err(_) => self.reset_empty(),
        }
    }

    fn reset_empty(&self) -> Result<Vec<Value>> {
        fs::create_dir_all(&self.dir)?;
        writer::commit(&self.dir, &[])?;
        Ok(Vec::new())
    }

    // ── Reads ──────────────────────────────────────────────────────────

    /// Every record in the collection, in stored order.
    pub fn all(&self) -> Result<Vec<Value>> {
        self.load()
    }

    /// All records matching the predicate, original order preserved.
    /// Empty on no match or on predicate evaluation failure.
    ///
    /// (`where` in the original API; `where` is reserved in Rust.)
    pub fn select_where(&self, matcher: impl Into<Matcher>) -> Result<Vec<Value>> {
        let rows = self.load()?;
        match matcher.into().filter(&rows) {
            Ok(matched) => Ok(matched.into_iter().cloned().collect()),
            Err(err) => {
                tracing::warn!("select_where evaluation failed, returning empty: {}", err);
                Ok(Vec::new())
            }
        }
    }

    /// First record matching the predicate, or the empty record on no
    /// match or evaluation failure.
    pub fn find_where(&self, matcher: impl Into<Matcher>) -> Result<Value> {
        let matched = self.select_where(matcher)?;
        Ok(matched
            .into_iter()
            .next()
            .unwrap_or_else(|| Value::Object(Record::new())))
    }

    // ── Writes ─────────────────────────────────────────────────────────

    /// Append one record (assigning an ID if needed), dedupe by primary
    /// key, persist. Returns the stored record.
    pub fn save_item(&self, item: Record) -> Result<Value> {
        let mut stored = self.save_items([item])?;
        Ok(stored.pop().unwrap_or_else(|| Value::Object(Record::new())))
    }

    /// Batch append records, dedupe by primary key, persist. Returns the
    /// stored records (with assigned IDs) in input order.
    ///
    /// A duplicated primary-key value keeps the last occurrence only - a
    /// guard against double-insert, not a merge.
    pub fn save_items(&self, items: impl IntoIterator<Item = Record>) -> Result<Vec<Value>> {
        let mut rows = self.load()?;
        let mut stored = Vec::new();
        for item in items {
            let row = Value::Object(ensure_id(item, &self.primary_key));
            stored.push(row.clone());
            rows.push(row);
        }
        let rows = self.dedupe_by_key(rows);
        writer::commit(&self.dir, &rows)?;
        Ok(stored)
    }

    /// Alias for [`save_items`](Self::save_items).
    pub fn create(&self, items: impl IntoIterator<Item = Record>) -> Result<Vec<Value>> {
        self.save_items(items)
    }

    /// Persist zero rows. The file stays in place; emptying is a write,
    /// not a removal.
    pub fn make_empty(&self) -> Result<()> {
        self.load()?;
        writer::commit(&self.dir, &[])
    }

    /// Remove every record matching the predicate; persist the rest.
    ///
    /// Removal is by primary-key membership in the match set, so a
    /// record equal in content to a matched one but with a different key
    /// survives. Matched rows lacking the primary-key field are removed
    /// positionally. Evaluation failure leaves the collection untouched.
    pub fn delete_where(&self, matcher: impl Into<Matcher>) -> Result<()> {
        let rows = self.load()?;
        let mask = match matcher.into().mask(&rows) {
            Ok(mask) => mask,
            Err(err) => {
                tracing::warn!("delete_where evaluation failed, leaving rows untouched: {}", err);
                return Ok(());
            }
        };

        let mut doomed_keys: HashSet<String> = HashSet::new();
        for (row, &matched) in rows.iter().zip(mask.iter()) {
            if matched {
                if let Some(key) = row.get(&self.primary_key) {
                    doomed_keys.insert(key_repr(key));
                }
            }
        }

        let mut remaining: Vec<Value> = Vec::with_capacity(rows.len());
        for (row, &matched) in rows.into_iter().zip(mask.iter()) {
            let doomed = match row.get(&self.primary_key) {
                Some(key) => doomed_keys.contains(&key_repr(key)),
                None => matched,
            };
            if !doomed {
                remaining.push(row);
            }
        }

        writer::commit(&self.dir, &remaining)
    }

    /// Alias for [`delete_where`](Self::delete_where).
    pub fn delete(&self, matcher: impl Into<Matcher>) -> Result<()> {
        self.delete_where(matcher)
    }

    /// Retain only records matching the predicate; persist.
    /// Evaluation failure leaves the collection untouched.
    pub fn keep_where(&self, matcher: impl Into<Matcher>) -> Result<()> {
        let rows = self.load()?;
        let kept = match matcher.into().filter(&rows) {
            Ok(matched) => matched.into_iter().cloned().collect::<Vec<_>>(),
            Err(err) => {
                tracing::warn!("keep_where evaluation failed, leaving rows untouched: {}", err);
                return Ok(());
            }
        };
        writer::commit(&self.dir, &kept)
    }

    /// Alias for [`keep_where`](Self::keep_where).
    pub fn keep(&self, matcher: impl Into<Matcher>) -> Result<()> {
        self.keep_where(matcher)
    }

    /// Merge `patch` fields into every record matching the predicate
    /// (patch fields overwrite, others untouched); persist all rows.
    /// Evaluation failure leaves the collection untouched.
    pub fn update_where(&self, matcher: impl Into<Matcher>, patch: Record) -> Result<()> {
        let rows = self.load()?;
        let mask = match matcher.into().mask(&rows) {
            Ok(mask) => mask,
            Err(err) => {
                tracing::warn!("update_where evaluation failed, leaving rows untouched: {}", err);
                return Ok(());
            }
        };

        let mut updated: Vec<Value> = Vec::with_capacity(rows.len());
        for (mut row, &matched) in rows.into_iter().zip(mask.iter()) {
            if matched {
                if let Some(fields) = row.as_object_mut() {
                    for (k, v) in &patch {
                        fields.insert(k.clone(), v.clone());
                    }
                }
            }
            updated.push(row);
        }

        writer::commit(&self.dir, &updated)
    }

    /// Alias for [`update_where`](Self::update_where).
    pub fn update(&self, matcher: impl Into<Matcher>, patch: Record) -> Result<()> {
        self.update_where(matcher, patch)
    }

    /// Keep the last occurrence of each primary-key value, preserving the
    /// position of that last occurrence. Rows without the key field (only
    /// possible via external writers) are kept as-is.
    fn dedupe_by_key(&self, rows: Vec<Value>) -> Vec<Value> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut deduped: Vec<Value> = rows
            .into_iter()
            .rev()
            .filter(|row| match row.get(&self.primary_key) {
                Some(key) => seen.insert(key_repr(key)),
                None => true,
            })
            .collect();
        deduped.reverse();
        deduped
    }
}

/// Hashable representation of a primary-key value. Keys are compared by
/// JSON value, so `1` and `"1"` stay distinct.
fn key_repr(key: &Value) -> String {
    key.to_string()
}
