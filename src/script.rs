//! Schema script loading
//!
//! A script is treated as one opaque unit of SQL text. It is never parsed or
//! split here; SQLite decides statement boundaries when it runs the batch.

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// SQL text loaded verbatim from disk
#[derive(Debug, Clone)]
pub struct SchemaScript {
    /// Where the script was read from
    pub path: PathBuf,
    /// Full script contents
    pub sql: String,
    /// BLAKE3 hex digest of `sql`
    pub digest: String,
}

impl SchemaScript {
    /// Read a script from disk.
    ///
    /// Fails with [`Error::MissingScript`] if the file cannot be read and with
    /// [`Error::EmptyScript`] if it holds only whitespace.
    pub fn load(path: &Path) -> Result<Self> {
        let sql = std::fs::read_to_string(path).map_err(|source| Error::MissingScript {
            path: path.to_path_buf(),
            source,
        })?;

        if sql.trim().is_empty() {
            return Err(Error::EmptyScript(path.to_path_buf()));
        }

        let digest = blake3::hash(sql.as_bytes()).to_string();
        tracing::debug!("Loaded script {} ({} bytes, blake3 {})", path.display(), sql.len(), digest);

        Ok(Self {
            path: path.to_path_buf(),
            sql,
            digest,
        })
    }
}
