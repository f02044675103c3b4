use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::bootstrap::{BootstrapOptions, ClearPolicy};
use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BootstrapConfig {
    pub target: Option<PathBuf>,
    pub schema: Option<PathBuf>,
    pub clear_existing: Option<bool>,
    pub strict_clear: Option<bool>,
    pub create_parent: Option<bool>,
    pub seed: Option<PathBuf>,
}

/// Values given on the command line or through the environment.
/// Any `Some` wins over the config file, including `Some(false)`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub target: Option<PathBuf>,
    pub schema: Option<PathBuf>,
    pub clear_existing: Option<bool>,
    pub strict_clear: Option<bool>,
    pub create_parent: Option<bool>,
    pub seed: Option<PathBuf>,
}

/// Collapse a `--flag` / `--no-flag` pair; neither given means "not set here"
pub fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("schema-bootstrap.toml")
}

pub fn default_schema_path() -> PathBuf {
    Path::new("sql").join("create.sql")
}

/// Load the config file. A missing file is only an error when the path was
/// given explicitly.
pub fn load_config(path: Option<&Path>) -> Result<Option<BootstrapConfig>> {
    let explicit = path.is_some();
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        if explicit {
            return Err(Error::Config(format!("config file not found: {}", path.display())));
        }
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: BootstrapConfig = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &BootstrapConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    let contents = toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Template written by `config init`
pub fn template_config() -> BootstrapConfig {
    BootstrapConfig {
        target: Some(Path::new("tmp").join("empty.db")),
        schema: Some(default_schema_path()),
        clear_existing: Some(true),
        strict_clear: Some(false),
        create_parent: Some(true),
        seed: None,
    }
}

/// Merge overrides over the config file over built-in defaults.
///
/// There is no default target: one layer has to name it.
pub fn resolve_options(config: Option<BootstrapConfig>, overrides: Overrides) -> Result<BootstrapOptions> {
    let config = config.unwrap_or_default();

    let target = overrides
        .target
        .or(config.target)
        .ok_or_else(|| Error::Config("no target location given (use --target, SCHEMA_BOOTSTRAP_TARGET or `target` in the config file)".to_string()))?;
    let schema = overrides
        .schema
        .or(config.schema)
        .unwrap_or_else(default_schema_path);

    // Strict clearing implies clearing, unless a higher layer turned clearing off.
    let strict = match (overrides.strict_clear, overrides.clear_existing) {
        (Some(strict), _) => strict,
        (None, Some(false)) => false,
        (None, _) => config.strict_clear.unwrap_or(false),
    };
    let clear_existing = strict || overrides.clear_existing.or(config.clear_existing).unwrap_or(false);
    let create_parent = overrides.create_parent.or(config.create_parent).unwrap_or(false);

    Ok(BootstrapOptions::new(target, schema)
        .clear_existing(clear_existing)
        .clear_policy(if strict { ClearPolicy::Strict } else { ClearPolicy::Idempotent })
        .create_parent(create_parent)
        .seed(overrides.seed.or(config.seed)))
}
