use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Migration source and schema version read configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationsConfig {
    /// Root directory holding one subdirectory per dialect.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Dialects this build loads migrations for.
    #[serde(default = "default_dialects")]
    pub dialects: Vec<String>,

    /// Accept development migration sets when checking a database.
    #[serde(default)]
    pub allow_dev: bool,

    /// Table the database records its schema version in.
    #[serde(default = "default_version_table")]
    pub version_table: String,

    /// Upper bound on a single version read, in seconds.
    #[serde(default = "default_version_timeout")]
    pub version_timeout_secs: u64,
}

impl MigrationsConfig {
    pub fn version_timeout(&self) -> Duration {
        Duration::from_secs(self.version_timeout_secs)
    }
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            dialects: default_dialects(),
            allow_dev: false,
            version_table: default_version_table(),
            version_timeout_secs: default_version_timeout(),
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from("migrations")
}

fn default_dialects() -> Vec<String> {
    vec!["postgres".to_string()]
}

fn default_version_table() -> String {
    "schema_migrations".to_string()
}

fn default_version_timeout() -> u64 {
    10
}
