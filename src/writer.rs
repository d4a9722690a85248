//! Durable commit of a collection snapshot
//!
//! A commit never writes the canonical `rows.json` directly. The new
//! content goes to a file inside a uniquely named staging directory, then
//! an atomic rename swaps it over the canonical path. A reader therefore
//! observes either the previous complete document or the new one, never a
//! partial write, and a failed commit leaves the previous file untouched.
//!
//! This protects readers against partial writes only. Two processes
//! committing the same collection concurrently still race; last writer
//! wins (documented non-goal).

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Canonical file name of a collection snapshot.
pub const ROWS_FILE: &str = "rows.json";

/// On-disk document shape: `{"rows": [ <record>, ... ]}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RowsDocument {
    pub rows: Vec<Value>,
}

/// Atomically replace `<collection_dir>/rows.json` with the given rows.
///
/// On any failure the canonical file is unchanged; the staging directory
/// is cleaned up best-effort.
pub fn commit(collection_dir: &Path, rows: &[Value]) -> Result<()> {
    let contents = serde_json::to_string(&RowsDocument { rows: rows.to_vec() })?;

    // Timestamp in the name avoids collision with another in-process
    // writer staging in the same collection directory.
    let staging_dir = collection_dir.join(format!("writing-{}", timestamp_millis()));
    let staged = staging_dir.join(ROWS_FILE);
    let canonical = collection_dir.join(ROWS_FILE);

    fs::create_dir(&staging_dir)?;

    let result = fs::write(&staged, &contents).and_then(|_| fs::rename(&staged, &canonical));
    if let Err(err) = result {
        if let Err(cleanup_err) = fs::remove_dir_all(&staging_dir) {
            tracing::warn!("failed to clean up staging dir after aborted commit: {}", cleanup_err);
        }
        return Err(err.into());
    }

    fs::remove_dir(&staging_dir)?;

    tracing::debug!(
        rows = rows.len(),
        path = %canonical.display(),
        "committed collection snapshot"
    );
    Ok(())
}

fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
