//! Storage Layer - the SQLite store being bootstrapped
//!
//! - `store`: scoped, exclusively owned connection with transactional script application
//! - `catalog`: read-back of user schema objects and table columns from `sqlite_master`

pub mod catalog;
pub mod store;

pub use catalog::{Column, SchemaCatalog, SchemaObject, TableInfo};
pub use store::{check_location, remove_store_files, SqliteStore};
