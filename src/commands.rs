use crate::{OutputMode, emit_success};
use owo_colors::OwoColorize;
use schema_bootstrap::config::{self, Overrides};
use schema_bootstrap::ui::{self, Icons};
use schema_bootstrap::{bootstrap, SqliteStore};
use std::path::{Path, PathBuf};

pub fn run_init(output_mode: OutputMode, config_path: Option<&Path>, overrides: Overrides) -> anyhow::Result<()> {
    let file_config = config::load_config(config_path)?;
    let options = config::resolve_options(file_config, overrides)?;

    if output_mode.is_human() {
        ui::header(Icons::ROCKET, "Bootstrapping store");
        ui::info(Icons::DATABASE, "Target", &ui::path(&options.target));
        ui::info(Icons::FILE, "Schema", &ui::path(&options.schema));
        if let Some(seed) = &options.seed {
            ui::info(Icons::FILE, "Seed", &ui::path(seed));
        }
    }

    let report = bootstrap(&options)?;

    if output_mode.is_human() {
        if report.cleared {
            ui::info(Icons::DEL, "Cleared", "previous store removed");
        }
        ui::summary_row("Digest", &ui::digest(report.short_digest()));

        ui::section("Schema objects");
        let table = ui::objects_table(&report.objects);
        if table.is_empty() {
            ui::warn("The schema script created no objects");
        } else if !schema_bootstrap::output::is_quiet() {
            println!("{}", table);
        }

        if !schema_bootstrap::output::is_quiet() {
            println!();
        }
        ui::success(&format!("Store ready at {}", report.target.display()));
        ui::info(Icons::CLOCK, "Elapsed", &format!("{} ms", report.elapsed_ms));
    } else {
        emit_success(output_mode, "init", serde_json::to_value(&report)?)?;
    }
    Ok(())
}

pub fn run_inspect(output_mode: OutputMode, config_path: Option<&Path>, target: Option<PathBuf>) -> anyhow::Result<()> {
    let target = match target {
        Some(t) => t,
        None => config::load_config(config_path)?
            .and_then(|c| c.target)
            .ok_or_else(|| anyhow::anyhow!("no target location given (use --target or `target` in the config file)"))?,
    };

    let store = SqliteStore::open_existing(&target)?;
    let catalog = store.catalog()?;
    store.close()?;

    if !output_mode.is_human() {
        return emit_success(output_mode, "inspect", serde_json::to_value(&catalog)?);
    }

    ui::header(Icons::DATABASE, &ui::path(&target));
    if schema_bootstrap::output::is_quiet() {
        return Ok(());
    }
    print!("{}", catalog);

    if catalog.is_empty() {
        ui::warn("No schema objects found");
        return Ok(());
    }

    ui::section("Objects");
    println!("{}", ui::objects_table(&catalog.objects));

    for table in &catalog.tables {
        ui::section(&format!(" {} ({} rows) ", table.name, table.rows));
        println!("{}", ui::columns_table(table));
    }
    Ok(())
}

pub fn run_config_init(output_mode: OutputMode, path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config::default_config_path);
    let template = config::template_config();
    config::write_config(&path, &template, force)?;

    if output_mode.is_human() {
        ui::success(&format!("Wrote config to {}", path.display()));
        ui::summary_row("Edit", &ui::dim("target, schema, clear_existing, strict_clear, create_parent, seed"));
    } else {
        emit_success(output_mode, "config.init", serde_json::json!({
            "path": path,
            "config": template,
        }))?;
    }
    Ok(())
}

pub fn run_config_show(output_mode: OutputMode, config_path: Option<&Path>) -> anyhow::Result<()> {
    let file_config = config::load_config(config_path)?;
    let loaded = file_config.is_some();
    let overrides = Overrides {
        target: std::env::var_os("SCHEMA_BOOTSTRAP_TARGET").map(PathBuf::from),
        schema: std::env::var_os("SCHEMA_BOOTSTRAP_SCHEMA").map(PathBuf::from),
        ..Default::default()
    };
    let options = config::resolve_options(file_config, overrides)?;

    if output_mode.is_human() {
        ui::header(Icons::INFO, if loaded { "Resolved options (config file loaded)" } else { "Resolved options (no config file)" });
        ui::summary_row("target:", &options.target.display().to_string());
        ui::summary_row("schema:", &options.schema.display().to_string());
        ui::summary_row("clear_existing:", &options.clear_existing.to_string());
        ui::summary_row("clear_policy:", &format!("{:?}", options.clear_policy));
        ui::summary_row("create_parent:", &options.create_parent.to_string());
        ui::summary_row(
            "seed:",
            &options.seed.as_ref().map(|s| s.display().to_string()).unwrap_or_else(|| ui::dim("none")),
        );
    } else {
        emit_success(output_mode, "config.show", serde_json::json!({
            "config_loaded": loaded,
            "target": options.target,
            "schema": options.schema,
            "clear_existing": options.clear_existing,
            "clear_policy": options.clear_policy,
            "create_parent": options.create_parent,
            "seed": options.seed,
        }))?;
    }
    Ok(())
}

pub fn run_version(output_mode: OutputMode) -> anyhow::Result<()> {
    if output_mode.is_human() {
        println!(
            "{} {}",
            "schema-bootstrap".style(ui::theme().heading.clone()),
            format!("Version {}", env!("CARGO_PKG_VERSION")).bold()
        );
    } else {
        let data = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
        });
        emit_success(output_mode, "version", data)?;
    }
    Ok(())
}
