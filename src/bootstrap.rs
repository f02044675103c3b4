//! Schema bootstrap - the run-once procedure
//!
//! 1. Load the schema (and seed) script. Nothing on disk is touched if this fails.
//! 2. Validate the target, creating its parent directory when asked to.
//! 3. Clear any prior store at the target when asked to.
//! 4. Open or create the store and run the scripts as one transaction.
//! 5. Commit and close the handle.

use std::path::PathBuf;
use std::time::Instant;
use serde::Serialize;
use crate::{Result, Error};
use crate::script::SchemaScript;
use crate::storage::{check_location, remove_store_files, SchemaObject, SqliteStore};

/// What clearing does when there is nothing to clear
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearPolicy {
    /// A missing store counts as already cleared
    #[default]
    Idempotent,
    /// A missing store is a [`Error::Deletion`]
    Strict,
}

/// Inputs for one bootstrap run
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub target: PathBuf,
    pub schema: PathBuf,
    pub clear_existing: bool,
    pub clear_policy: ClearPolicy,
    pub create_parent: bool,
    pub seed: Option<PathBuf>,
}

impl BootstrapOptions {
    pub fn new(target: impl Into<PathBuf>, schema: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            schema: schema.into(),
            clear_existing: false,
            clear_policy: ClearPolicy::default(),
            create_parent: false,
            seed: None,
        }
    }

    pub fn clear_existing(mut self, clear: bool) -> Self {
        self.clear_existing = clear;
        self
    }

    pub fn clear_policy(mut self, policy: ClearPolicy) -> Self {
        self.clear_policy = policy;
        self
    }

    pub fn create_parent(mut self, create: bool) -> Self {
        self.create_parent = create;
        self
    }

    pub fn seed(mut self, seed: Option<PathBuf>) -> Self {
        self.seed = seed;
        self
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub target: PathBuf,
    pub schema: PathBuf,
    pub schema_digest: String,
    pub seed: Option<PathBuf>,
    pub cleared: bool,
    pub objects: Vec<SchemaObject>,
    pub elapsed_ms: u64,
}

impl BootstrapReport {
    /// First 12 hex digits of the schema digest
    pub fn short_digest(&self) -> &str {
        &self.schema_digest[..12.min(self.schema_digest.len())]
    }
}

/// Create a fresh store at `options.target` from `options.schema`
pub fn bootstrap(options: &BootstrapOptions) -> Result<BootstrapReport> {
    let started = Instant::now();
    let target = &options.target;

    let schema = SchemaScript::load(&options.schema)?;
    let seed = options.seed.as_deref().map(SchemaScript::load).transpose()?;

    tracing::info!("Bootstrapping {} from {}", target.display(), schema.path.display());

    if options.create_parent {
        ensure_parent(target)?;
    }
    check_location(target)?;

    let cleared = if options.clear_existing {
        clear(options)?
    } else {
        false
    };

    let mut store = SqliteStore::open(target)?;

    let mut scripts = vec![&schema];
    scripts.extend(seed.as_ref());
    store.apply_scripts(&scripts)?;

    let catalog = store.catalog()?;

    // Committed at this point; a failed close must not fail the run.
    if let Err(e) = store.close() {
        tracing::warn!("{}", e);
    }

    tracing::info!(
        "Bootstrapped {} ({} schema objects)",
        target.display(),
        catalog.objects.len()
    );

    Ok(BootstrapReport {
        target: target.clone(),
        schema: schema.path.clone(),
        schema_digest: schema.digest.clone(),
        seed: seed.map(|s| s.path),
        cleared,
        objects: catalog.objects,
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

fn ensure_parent(target: &std::path::Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            tracing::debug!("Creating {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| Error::InvalidLocation {
                path: target.to_path_buf(),
                reason: format!("cannot create parent directory: {}", e),
            })?;
        }
    }
    Ok(())
}

fn clear(options: &BootstrapOptions) -> Result<bool> {
    let existed = remove_store_files(&options.target)?;
    if existed {
        tracing::info!("Removed existing store at {}", options.target.display());
    } else if options.clear_policy == ClearPolicy::Strict {
        return Err(Error::Deletion {
            path: options.target.clone(),
            reason: "no existing store to remove".to_string(),
        });
    } else {
        tracing::debug!("Nothing to clear at {}", options.target.display());
    }
    Ok(existed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SchemaCatalog;
    use std::path::Path;

    const USERS_SQL: &str = "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL);";

    fn write(dir: &Path, name: &str, sql: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, sql).unwrap();
        path
    }

    fn read_catalog(target: &Path) -> SchemaCatalog {
        SqliteStore::open_existing(target).unwrap().catalog().unwrap()
    }

    /// Proves nobody still holds the file: a new connection can take the write lock at once.
    fn assert_released(target: &Path) {
        let conn = rusqlite::Connection::open(target).unwrap();
        conn.execute_batch("BEGIN EXCLUSIVE; COMMIT;").unwrap();
        conn.close().unwrap();
    }

    #[test]
    fn test_users_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "create.sql", USERS_SQL);
        let target = dir.path().join("tmp").join("empty.db");

        let options = BootstrapOptions::new(&target, &schema)
            .clear_existing(true)
            .create_parent(true);
        let report = bootstrap(&options).unwrap();
        assert!(!report.cleared);
        assert_eq!(report.objects.len(), 1);

        let catalog = read_catalog(&target);
        assert_eq!(catalog.object_names(), vec!["table:users"]);

        let users = catalog.table("users").unwrap();
        assert_eq!(users.columns.len(), 2);
        assert_eq!(users.rows, 0);

        let id = users.column("id").unwrap();
        assert_eq!(id.decl_type, "INTEGER");
        assert!(id.primary_key);

        let name = users.column("name").unwrap();
        assert_eq!(name.decl_type, "TEXT");
        assert!(name.not_null);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "create.sql", USERS_SQL);
        let target = dir.path().join("store.db");
        let options = BootstrapOptions::new(&target, &schema).clear_existing(true);

        let first = bootstrap(&options).unwrap();
        let first_catalog = read_catalog(&target);
        let second = bootstrap(&options).unwrap();
        let second_catalog = read_catalog(&target);

        assert!(!first.cleared);
        assert!(second.cleared);
        assert_eq!(first_catalog, second_catalog);
    }

    #[test]
    fn test_without_clear_reapplies_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "create.sql", USERS_SQL);
        let target = dir.path().join("store.db");
        let options = BootstrapOptions::new(&target, &schema);

        bootstrap(&options).unwrap();
        let err = bootstrap(&options).unwrap_err();
        assert!(matches!(err, Error::ScriptExecution { .. }));
        assert_eq!(read_catalog(&target).table_names(), vec!["users"]);
        assert_released(&target);
    }

    #[test]
    fn test_schema_fidelity() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(
            dir.path(),
            "create.sql",
            "CREATE TABLE problems (pid TEXT PRIMARY KEY, title TEXT NOT NULL);
             CREATE TABLE records (rid INTEGER PRIMARY KEY, pid TEXT NOT NULL REFERENCES problems(pid));
             CREATE INDEX idx_records_pid ON records(pid);
             CREATE VIEW record_titles AS SELECT r.rid, p.title FROM records r JOIN problems p USING (pid);",
        );
        let target = dir.path().join("store.db");

        bootstrap(&BootstrapOptions::new(&target, &schema)).unwrap();

        let catalog = read_catalog(&target);
        assert_eq!(
            catalog.object_names(),
            vec![
                "index:idx_records_pid",
                "table:problems",
                "table:records",
                "view:record_titles",
            ]
        );
    }

    #[test]
    fn test_bad_script_commits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(
            dir.path(),
            "create.sql",
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             CREATE TABLE sessions (token TEXT PRIMARY KEY);
             CREATE TABLE broken (;",
        );
        let target = dir.path().join("store.db");

        let err = bootstrap(&BootstrapOptions::new(&target, &schema).clear_existing(true)).unwrap_err();
        assert!(matches!(err, Error::ScriptExecution { .. }));

        assert!(read_catalog(&target).is_empty());
        assert_released(&target);
    }

    #[test]
    fn test_missing_script_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("tmp").join("store.db");
        let options = BootstrapOptions::new(&target, dir.path().join("missing.sql"))
            .clear_existing(true)
            .create_parent(true);

        let err = bootstrap(&options).unwrap_err();
        assert!(matches!(err, Error::MissingScript { .. }));
        assert!(!target.exists());
        assert!(!dir.path().join("tmp").exists());
    }

    #[test]
    fn test_missing_script_keeps_existing_store() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "create.sql", USERS_SQL);
        let target = dir.path().join("store.db");
        bootstrap(&BootstrapOptions::new(&target, &schema)).unwrap();

        let options = BootstrapOptions::new(&target, dir.path().join("gone.sql")).clear_existing(true);
        assert!(matches!(bootstrap(&options).unwrap_err(), Error::MissingScript { .. }));
        assert_eq!(read_catalog(&target).table_names(), vec!["users"]);
    }

    #[test]
    fn test_handle_released_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "create.sql", USERS_SQL);
        let target = dir.path().join("store.db");

        bootstrap(&BootstrapOptions::new(&target, &schema)).unwrap();
        assert_released(&target);
        std::fs::remove_file(&target).unwrap();
    }

    #[test]
    fn test_strict_clear_requires_existing_store() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "create.sql", USERS_SQL);
        let target = dir.path().join("store.db");
        let options = BootstrapOptions::new(&target, &schema)
            .clear_existing(true)
            .clear_policy(ClearPolicy::Strict);

        let err = bootstrap(&options).unwrap_err();
        assert!(matches!(err, Error::Deletion { .. }));
        assert!(!target.exists());

        bootstrap(&BootstrapOptions::new(&target, &schema)).unwrap();
        let report = bootstrap(&options).unwrap();
        assert!(report.cleared);
    }

    #[test]
    fn test_commit_inside_script_keeps_run_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(
            dir.path(),
            "create.sql",
            "CREATE TABLE users (id INTEGER PRIMARY KEY); COMMIT; CREATE TABLE broken (;",
        );
        let target = dir.path().join("store.db");

        let err = bootstrap(&BootstrapOptions::new(&target, &schema).clear_existing(true)).unwrap_err();
        assert!(matches!(err, Error::ScriptExecution { .. }));
        assert!(read_catalog(&target).is_empty());
        assert_released(&target);
    }

    #[test]
    fn test_directory_target_is_invalid_location_even_when_clearing() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "create.sql", USERS_SQL);
        let target = dir.path().join("data.db");
        std::fs::create_dir(&target).unwrap();

        let err = bootstrap(&BootstrapOptions::new(&target, &schema).clear_existing(true)).unwrap_err();
        assert!(matches!(err, Error::InvalidLocation { .. }));
        assert!(target.is_dir());
    }

    #[test]
    fn test_report_short_digest() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "create.sql", USERS_SQL);
        let target = dir.path().join("store.db");

        let report = bootstrap(&BootstrapOptions::new(&target, &schema)).unwrap();
        assert_eq!(report.schema_digest.len(), 64);
        assert_eq!(report.short_digest(), &report.schema_digest[..12]);
    }

    #[test]
    fn test_missing_parent_is_invalid_location() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "create.sql", USERS_SQL);
        let target = dir.path().join("deploy").join("data.db");

        let err = bootstrap(&BootstrapOptions::new(&target, &schema)).unwrap_err();
        assert!(matches!(err, Error::InvalidLocation { .. }));
        assert!(!dir.path().join("deploy").exists());
    }

    #[test]
    fn test_empty_script_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "create.sql", "\n\n");
        let target = dir.path().join("store.db");

        let err = bootstrap(&BootstrapOptions::new(&target, &schema)).unwrap_err();
        assert!(matches!(err, Error::EmptyScript(_)));
        assert!(!target.exists());
    }

    #[test]
    fn test_clear_removes_stale_journal() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "create.sql", USERS_SQL);
        let target = dir.path().join("store.db");
        bootstrap(&BootstrapOptions::new(&target, &schema)).unwrap();
        std::fs::write(dir.path().join("store.db-journal"), b"not a journal").unwrap();

        bootstrap(&BootstrapOptions::new(&target, &schema).clear_existing(true)).unwrap();
        assert!(!dir.path().join("store.db-journal").exists());
        assert_eq!(read_catalog(&target).table_names(), vec!["users"]);
    }

    #[test]
    fn test_seed_in_same_commit() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "create.sql", USERS_SQL);
        let seed = write(dir.path(), "seed.sql", "INSERT INTO users (id, name) VALUES (1, 'admin');");
        let target = dir.path().join("store.db");

        let report = bootstrap(&BootstrapOptions::new(&target, &schema).seed(Some(seed.clone()))).unwrap();
        assert_eq!(report.seed.as_deref(), Some(seed.as_path()));
        assert_eq!(read_catalog(&target).table("users").unwrap().rows, 1);
    }

    #[test]
    fn test_failed_seed_rolls_back_schema() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "create.sql", USERS_SQL);
        let seed = write(dir.path(), "seed.sql", "INSERT INTO users (id) VALUES (1);");
        let target = dir.path().join("store.db");

        let err = bootstrap(&BootstrapOptions::new(&target, &schema).seed(Some(seed.clone()))).unwrap_err();
        assert!(matches!(err, Error::ScriptExecution { ref script, .. } if script == &seed));
        assert!(read_catalog(&target).is_empty());
        assert_released(&target);
    }
}
