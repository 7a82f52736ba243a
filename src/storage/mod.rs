//! Storage Layer - SQLite-backed target store
//!
//! Every run drops and recreates its tables inside one transaction:
//! - entity tables: `id` surrogate key plus one column per descriptor
//! - edge tables: `<source>_id`, `<target>_id` foreign-key pairs

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, LoadSession, SqliteStore, project_rows};
