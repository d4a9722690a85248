//! rowdb — minimal embedded JSON record store
//!
//! Each logical collection ("dataType") persists as a single JSON document
//! of rows at `<data_root>/<lowercased-type>/rows.json`. Every mutation
//! reloads the snapshot, applies the change in memory, and commits the
//! whole row set back through a write-temp-then-rename protocol, so a
//! reader never observes a partially written file.
//!
//! # Usage
//!
//! ```no_run
//! use rowdb::{Collection, StoreConfig};
//! use serde_json::json;
//!
//! let tasks = Collection::open("tasks", StoreConfig::new("/data"))?;
//!
//! tasks.save_item(json!({"title": "a"}).as_object().unwrap().clone())?;
//! let open = tasks.select_where(json!({"status": "open"}))?;
//! tasks.delete_where(json!({"title": "a"}))?;
//! # Ok::<(), rowdb::StoreError>(())
//! ```
//!
//! Limitations, by design: linear scans only, one collection per file, no
//! cross-process coordination (concurrent writers race; last one wins).

pub mod collection;
pub mod config;
pub mod error;
pub mod identity;
pub mod query;
pub mod writer;

pub use collection::Collection;
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use identity::NONUNIQUE_SENTINEL;
pub use query::{Matcher, Record};
