//! # schema-bootstrap - Idempotent SQLite schema bootstrap
//!
//! Creates a fresh SQLite store at a target location from a declarative SQL
//! script.
//!
//! schema-bootstrap provides:
//! - Optional clearing of a stale store (and its journal sidecars) before creation
//! - All-or-nothing application of the schema script inside one transaction
//! - An optional seed script committed in the same unit of work
//! - A scoped store handle that is always released, even on failure
//! - Catalog inspection of the resulting store

pub mod bootstrap;
pub mod config;
pub mod output;
pub mod script;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use bootstrap::{bootstrap, BootstrapOptions, BootstrapReport, ClearPolicy};
pub use script::SchemaScript;
pub use storage::{SchemaCatalog, SqliteStore};

use std::path::PathBuf;

/// Result type alias for bootstrap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for bootstrap operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Schema script not found or unreadable: {}: {source}", .path.display())]
    MissingScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema script is empty: {}", .0.display())]
    EmptyScript(PathBuf),

    #[error("Invalid target location {}: {reason}", .path.display())]
    InvalidLocation { path: PathBuf, reason: String },

    #[error("Failed to clear existing store at {}: {reason}", .path.display())]
    Deletion { path: PathBuf, reason: String },

    #[error("Script execution failed for {}: {source}", .script.display())]
    ScriptExecution {
        script: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to close store: {0}")]
    StoreClose(rusqlite::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
