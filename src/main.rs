//! schema-bootstrap CLI - create a fresh SQLite store from a schema script

mod commands;

use clap::{Parser, Subcommand};
use schema_bootstrap::config::{flag_pair, Overrides};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "schema-bootstrap")]
#[command(version)]
#[command(about = "Idempotent SQLite schema bootstrap from a declarative SQL script")]
#[command(long_about = r#"
schema-bootstrap creates a fresh SQLite store at a target location:
  • Optionally removes a stale store (and its journal files) first
  • Runs the schema script as a single all-or-nothing transaction
  • Optionally runs a seed script in the same transaction
  • Always releases the store handle, even on failure

Example usage:
  schema-bootstrap init --target tmp/empty.db --schema sql/create.sql --clear --create-parent
  schema-bootstrap init --target /srv/app/data.db --no-clear
  schema-bootstrap inspect --target tmp/empty.db
  schema-bootstrap config init
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress human-readable output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit a single JSON object instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file (defaults to ./schema-bootstrap.toml if present)
    #[arg(short, long, global = true, env = "SCHEMA_BOOTSTRAP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store and apply the schema script
    Init {
        /// Path of the store file to create
        #[arg(short, long, env = "SCHEMA_BOOTSTRAP_TARGET")]
        target: Option<PathBuf>,

        /// Path to the schema script (defaults to sql/create.sql)
        #[arg(short, long, env = "SCHEMA_BOOTSTRAP_SCHEMA")]
        schema: Option<PathBuf>,

        /// Remove any existing store at the target first
        #[arg(long, overrides_with = "no_clear")]
        clear: bool,

        /// Keep any existing store, even if the config file says to clear
        #[arg(long, overrides_with = "clear")]
        no_clear: bool,

        /// Like --clear, but fail if there is no existing store to remove
        #[arg(long, overrides_with = "no_strict_clear")]
        strict_clear: bool,

        /// Turn off strict clearing set in the config file
        #[arg(long, overrides_with = "strict_clear")]
        no_strict_clear: bool,

        /// Create the target's parent directory if it is missing
        #[arg(long, overrides_with = "no_create_parent")]
        create_parent: bool,

        /// Never create the target's parent directory
        #[arg(long, overrides_with = "create_parent")]
        no_create_parent: bool,

        /// Data script to run in the same transaction after the schema
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Show the schema catalog of an existing store
    Inspect {
        /// Path of the store file to inspect
        #[arg(short, long, env = "SCHEMA_BOOTSTRAP_TARGET")]
        target: Option<PathBuf>,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a template config file
    Init {
        /// Where to write it (defaults to ./schema-bootstrap.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the options an `init` run would use
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

/// Print the JSON envelope for a successful command
pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if output_mode == OutputMode::Json {
        let envelope = serde_json::json!({
            "status": "ok",
            "command": command,
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    Ok(())
}

fn emit_error(command: &str, err: &anyhow::Error) {
    let envelope = serde_json::json!({
        "status": "error",
        "command": command,
        "error": format!("{:#}", err),
    });
    println!("{}", envelope);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };
    if cli.quiet {
        schema_bootstrap::output::set_quiet(true);
    }

    // Initialize logging
    let default_filter = if cli.verbose {
        "debug"
    } else if cli.quiet || !output_mode.is_human() {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.as_deref();
    let (name, result) = match cli.command {
        Commands::Init {
            target,
            schema,
            clear,
            no_clear,
            strict_clear,
            no_strict_clear,
            create_parent,
            no_create_parent,
            seed,
        } => {
            let overrides = Overrides {
                target,
                schema,
                clear_existing: flag_pair(clear, no_clear),
                strict_clear: flag_pair(strict_clear, no_strict_clear),
                create_parent: flag_pair(create_parent, no_create_parent),
                seed,
            };
            ("init", commands::run_init(output_mode, config_path, overrides))
        }
        Commands::Inspect { target } => {
            ("inspect", commands::run_inspect(output_mode, config_path, target))
        }
        Commands::Config { action: ConfigAction::Init { path, force } } => {
            ("config.init", commands::run_config_init(output_mode, path, force))
        }
        Commands::Config { action: ConfigAction::Show } => {
            ("config.show", commands::run_config_show(output_mode, config_path))
        }
        Commands::Version => ("version", commands::run_version(output_mode)),
    };

    if let Err(ref e) = result {
        if output_mode.is_human() {
            schema_bootstrap::ui::error(&format!("{} failed", name));
        } else {
            emit_error(name, e);
        }
    }
    result
}
