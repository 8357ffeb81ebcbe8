mod schema;

pub use schema::SchemaCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Warden - database schema state for access management deployments
#[derive(Parser)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Inspect the database schema version.
    Schema(SchemaCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Schema(cmd) => cmd.execute().await,
        }
    }
}

/// Initialize tracing; `RUST_LOG` takes precedence over the configured level.
pub(crate) fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok(), default_level))
        .with_writer(std::io::stderr)
        .init();
}

fn log_filter(rust_log: Option<String>, default_level: &str) -> String {
    rust_log
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| default_level.to_string())
}
