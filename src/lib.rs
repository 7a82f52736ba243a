//! # Holoload - catalog import pipeline
//!
//! Pulls the paginated resource collections of a catalog API and loads them
//! into a relational SQLite schema, replacing whatever was there before.
//!
//! Holoload provides:
//! - Declarative column descriptors that drive both DDL and row projection
//! - A per-run identifier registry that swaps source URLs for surrogate keys
//! - Sentinel filtering of "unknown" placeholder values
//! - Many-to-many edge tables materialized from embedded identifier lists
//! - A pass-through HTTP source and a filesystem-cached source

pub mod record;
pub mod registry;
pub mod normalize;
pub mod column;
pub mod storage;
pub mod catalog;
pub mod fetch;
pub mod import;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use record::EntityRecord;
pub use registry::{IdentifierRegistry, SurrogateKey};
pub use column::{Column, SqlType};
pub use catalog::{EdgeDef, Resource, TableDef};
pub use fetch::{CachedSource, HttpSource, ResourceSource};
pub use import::{ImportReport, Importer};
pub use storage::SqliteStore;

/// Result type alias for Holoload operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Holoload operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Schema conflict on table {table}: {reason}")]
    SchemaConflict { table: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
