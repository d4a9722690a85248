//! Store configuration
//!
//! The original design resolved a process-wide data root once at module
//! load. Here the configuration is an explicit value passed to each
//! `Collection` at construction, with a documented fallback: the
//! `ROWDB_DATA_DIR` environment variable when set, else `./data` relative
//! to the working directory.

use std::path::PathBuf;

/// Environment variable that overrides the default data root.
pub const DATA_DIR_ENV: &str = "ROWDB_DATA_DIR";

/// Default primary-key field name.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Configuration for a record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory under which each collection gets its own subdirectory.
    pub data_root: PathBuf,
    /// Field used for record identity and deduplication.
    pub primary_key: String,
}

impl StoreConfig {
    /// Create a configuration rooted at `data_root` with the default
    /// primary key (`"id"`).
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
        }
    }

    /// Set the primary-key field name.
    pub fn primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = key.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        let root = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));
        Self::new(root)
    }
}
