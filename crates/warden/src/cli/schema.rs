use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use warden_core::config::WardenConfig;
use warden_core::error::WardenError;
use warden_core::schema::{MigrationRegistry, SchemaState, SchemaStatus};
use warden_runtime::migrations::{register_dialects, PgVersionDriver, SchemaManager};
use warden_runtime::Database;

/// Inspect the database schema version.
#[derive(Parser)]
pub struct SchemaCommand {
    #[command(subcommand)]
    pub action: SchemaAction,

    /// Configuration file path.
    #[arg(short, long, default_value = "warden.toml", global = true)]
    pub config: String,

    /// Migrations root directory (overrides config).
    #[arg(short, long, global = true)]
    pub migrations_dir: Option<PathBuf>,

    /// Dialect to inspect (defaults to the first configured dialect).
    #[arg(short, long, global = true)]
    pub dialect: Option<String>,
}

#[derive(Subcommand)]
pub enum SchemaAction {
    /// Show the database schema state relative to this binary.
    Status {
        /// Print the state as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Exit with an error unless the database is usable as-is.
    Check {
        /// Accept development migrations.
        #[arg(long)]
        allow_dev: bool,
    },

    /// List the migration versions compiled for the dialect.
    Versions,
}

impl SchemaCommand {
    pub async fn execute(self) -> Result<()> {
        dotenvy::dotenv().ok();

        let config_path = Path::new(&self.config);
        if !config_path.exists() {
            anyhow::bail!("Configuration file not found: {}", self.config);
        }

        let mut config = WardenConfig::from_file(config_path)?;
        super::init_tracing(&config.logging.level);
        info!("Loaded configuration from {}", self.config);

        if let Some(dir) = &self.migrations_dir {
            config.migrations.dir = dir.clone();
        }
        let dialect = resolve_dialect(self.dialect.as_deref(), &config.migrations.dialects)?;

        let registry = Arc::new(MigrationRegistry::new());
        register_dialects(
            &registry,
            &config.migrations.dir,
            &config.migrations.dialects,
        )?;

        if let SchemaAction::Versions = self.action {
            print_versions(&registry, &dialect);
            return Ok(());
        }

        let db = Database::from_config(&config.database).await?;
        let driver = PgVersionDriver::new(db.pool().clone(), &config.migrations.version_table)?;
        let manager = SchemaManager::new(registry.clone(), dialect.as_str(), Arc::new(driver))
            .with_version_timeout(config.migrations.version_timeout());

        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Interrupt received, cancelling schema read");
                on_signal.cancel();
            }
        });

        let result = match self.action {
            SchemaAction::Status { json } => manager.state(&cancel).await.map(|state| {
                if json {
                    print_json(&manager, &state)
                } else {
                    print_state(&manager, &state);
                    Ok(())
                }
            }),
            SchemaAction::Check { allow_dev } => {
                let allow_dev = allow_dev || config.migrations.allow_dev;
                manager.check(&cancel, allow_dev).await.map(|state| {
                    println!(
                        "  {} {} schema is current at version {}",
                        style("✓").green(),
                        dialect,
                        state.current_schema_version
                    );
                    Ok(())
                })
            }
            SchemaAction::Versions => Ok(Ok(())),
        };

        db.close().await;

        command_outcome(result)
    }
}

/// Flatten a schema read result and its output step into the command's result.
/// Errors are left for `main` to report.
fn command_outcome(result: std::result::Result<Result<()>, WardenError>) -> Result<()> {
    result?
}

/// Pick the requested dialect, or the first configured one.
fn resolve_dialect(requested: Option<&str>, configured: &[String]) -> Result<String> {
    match requested {
        Some(d) if configured.iter().any(|c| c == d) => Ok(d.to_string()),
        Some(d) => anyhow::bail!(
            "Dialect {} is not configured (configured: {})",
            d,
            configured.join(", ")
        ),
        None => configured
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No dialects configured in [migrations]")),
    }
}

fn print_versions(registry: &MigrationRegistry, dialect: &str) {
    println!();
    println!("  {} Migrations for {}", style("⚒").bold(), style(dialect).cyan());
    println!();

    let Some(state) = registry.get(dialect) else {
        println!("  {} No migrations registered", style("ℹ").blue());
        return;
    };

    for version in state.up_migrations().keys() {
        let down_marker = if state.down(*version).is_some() {
            style("↓").green().to_string()
        } else {
            style("-").dim().to_string()
        };
        println!("    {} {}", down_marker, style(version).cyan());
    }

    println!();
    println!(
        "  {} binary schema version {}{}",
        style("ℹ").blue(),
        state.binary_schema_version(),
        if state.dev_migration() {
            style(" (development)").yellow().to_string()
        } else {
            String::new()
        }
    );
    println!();
}

fn print_state(manager: &SchemaManager, state: &SchemaState) {
    println!();
    println!(
        "  {} Schema status for {}",
        style("⚒").bold(),
        style(manager.dialect()).cyan()
    );
    println!();

    let status = state.status();
    let marker = match status {
        SchemaStatus::Current => style("✓").green(),
        SchemaStatus::Dirty => style("✗").red(),
        SchemaStatus::Uninitialized | SchemaStatus::Behind | SchemaStatus::Ahead => {
            style("○").yellow()
        }
    };
    println!("  {} {}", marker, status);

    if state.initialization_started {
        println!("    database version: {}", state.current_schema_version);
    } else {
        println!("    database version: {}", style("none").dim());
    }
    println!("    binary version:   {}", state.binary_schema_version);
    println!("    dirty:            {}", state.dirty);

    if manager.is_dev_migration() {
        println!();
        println!(
            "  {} built with development migrations",
            style("!").yellow().bold()
        );
    }
    println!();
}

fn print_json(manager: &SchemaManager, state: &SchemaState) -> Result<()> {
    let report = serde_json::json!({
        "dialect": manager.dialect(),
        "dev_migration": manager.is_dev_migration(),
        "status": state.status(),
        "state": state,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialects() -> Vec<String> {
        vec!["postgres".to_string(), "sqlite".to_string()]
    }

    #[test]
    fn test_resolve_default_dialect() {
        assert_eq!(resolve_dialect(None, &dialects()).unwrap(), "postgres");
    }

    #[test]
    fn test_resolve_requested_dialect() {
        assert_eq!(resolve_dialect(Some("sqlite"), &dialects()).unwrap(), "sqlite");
    }

    #[test]
    fn test_command_outcome_keeps_schema_error() {
        let err = command_outcome(Err(WardenError::SchemaDirty { version: 7 })).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WardenError>(),
            Some(WardenError::SchemaDirty { version: 7 })
        ));
        assert_eq!(
            err.to_string(),
            "Database schema is dirty at version 7; a previous migration failed"
        );
    }

    #[test]
    fn test_command_outcome_passes_output_result() {
        assert!(command_outcome(Ok(Ok(()))).is_ok());
        assert!(command_outcome(Ok(Err(anyhow::anyhow!("write failed")))).is_err());
    }

    #[test]
    fn test_resolve_unknown_dialect() {
        assert!(resolve_dialect(Some("mysql"), &dialects()).is_err());
        assert!(resolve_dialect(None, &[]).is_err());
    }
}
