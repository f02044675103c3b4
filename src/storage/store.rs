//! SQLite store handle

use std::path::{Path, PathBuf};
use rusqlite::hooks::{AuthAction, AuthContext, Authorization};
use rusqlite::{Connection, OpenFlags};
use crate::{Result, Error};
use crate::script::SchemaScript;
use super::catalog::SchemaCatalog;

/// Files SQLite may keep next to a database, by suffix
const SIDECAR_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

/// Exclusively owned connection to the store being bootstrapped.
///
/// Dropping the store rolls back anything uncommitted and closes the
/// connection, so every exit path releases the file.
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        check_location(path)?;
        let conn = Connection::open(path).map_err(|e| Error::InvalidLocation {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::debug!("Opened store at {}", path.display());
        Ok(Self { conn, path: path.to_path_buf() })
    }

    /// Open an existing database file read-only
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::InvalidLocation {
                path: path.to_path_buf(),
                reason: "no store exists at this path".to_string(),
            });
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| Error::InvalidLocation {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { conn, path: path.to_path_buf() })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: PathBuf::from(":memory:") })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Execute the scripts in order as one transaction.
    ///
    /// Stops at the first failing statement. Nothing is committed unless every
    /// script ran to completion. Transaction control inside a script
    /// (`BEGIN`, `COMMIT`, `END`, `ROLLBACK`) is rejected as a script error.
    pub fn apply_scripts(&mut self, scripts: &[&SchemaScript]) -> Result<()> {
        let tx = self.conn.transaction()?;

        // The authorizer must be gone again before the rollback in Drop or the final COMMIT.
        tx.authorizer(Some(deny_transaction_control));
        let applied = scripts.iter().try_for_each(|script| {
            tracing::debug!("Executing {}", script.path.display());
            tx.execute_batch(&script.sql).map_err(|source| Error::ScriptExecution {
                script: script.path.clone(),
                source,
            })
        });
        tx.authorizer(None::<fn(AuthContext<'_>) -> Authorization>);

        applied?;
        tx.commit()?;
        Ok(())
    }

    /// Read back the current schema catalog
    pub fn catalog(&self) -> Result<SchemaCatalog> {
        Ok(SchemaCatalog::read(&self.conn)?)
    }

    /// Release the handle explicitly, surfacing close errors
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::StoreClose(e))
    }
}

fn deny_transaction_control(ctx: AuthContext<'_>) -> Authorization {
    match ctx.action {
        AuthAction::Transaction { .. } => Authorization::Deny,
        _ => Authorization::Allow,
    }
}

/// Reject targets that can never be a single store file
pub fn check_location(path: &Path) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidLocation {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if path.as_os_str().is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.is_dir() {
        return Err(invalid("path is a directory"));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(invalid("parent directory does not exist"));
        }
    }
    Ok(())
}

/// Remove a store file and its sidecars.
///
/// Returns whether the main store file existed. Missing sidecars are ignored.
pub fn remove_store_files(path: &Path) -> Result<bool> {
    let deletion = |reason: String| Error::Deletion {
        path: path.to_path_buf(),
        reason,
    };

    if path.is_dir() {
        return Err(deletion("path is a directory".to_string()));
    }

    let existed = match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(deletion(e.to_string())),
    };

    for suffix in SIDECAR_SUFFIXES {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(suffix);
        let sidecar = PathBuf::from(sidecar);
        match std::fs::remove_file(&sidecar) {
            Ok(()) => tracing::debug!("Removed stale {}", sidecar.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(deletion(format!("{}: {}", sidecar.display(), e))),
        }
    }

    Ok(existed)
}
