use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use warden_core::error::{Result, WardenError};
use warden_core::schema::{
    compute_state, Dialect, MigrationRegistry, SchemaState, SchemaStatus, VersionDriver,
};

/// Default bound on a single version read.
pub const DEFAULT_VERSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Schema state access for one dialect and one database.
pub struct SchemaManager {
    registry: Arc<MigrationRegistry>,
    dialect: Dialect,
    driver: Arc<dyn VersionDriver>,
    version_timeout: Duration,
}

impl SchemaManager {
    pub fn new(
        registry: Arc<MigrationRegistry>,
        dialect: impl Into<Dialect>,
        driver: Arc<dyn VersionDriver>,
    ) -> Self {
        Self {
            registry,
            dialect: dialect.into(),
            driver,
            version_timeout: DEFAULT_VERSION_TIMEOUT,
        }
    }

    /// Set the upper bound on a single version read.
    pub fn with_version_timeout(mut self, timeout: Duration) -> Self {
        self.version_timeout = timeout;
        self
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn is_dev_migration(&self) -> bool {
        self.registry.is_dev_migration(self.dialect.as_str())
    }

    /// Current schema state of the database.
    pub async fn state(&self, cancel: &CancellationToken) -> Result<SchemaState> {
        let read = compute_state(
            &self.registry,
            cancel,
            self.dialect.as_str(),
            self.driver.as_ref(),
        );

        let state = tokio::time::timeout(self.version_timeout, read)
            .await
            .map_err(|_| {
                WardenError::Timeout(format!(
                    "schema version read for dialect {} exceeded {:?}",
                    self.dialect, self.version_timeout
                ))
            })??;

        debug!(
            dialect = %self.dialect,
            status = %state.status(),
            current = state.current_schema_version,
            binary = state.binary_schema_version,
            "Schema state"
        );
        Ok(state)
    }

    /// Check that the database can be used by this binary as-is.
    ///
    /// Refuses, in order: development migrations unless `allow_dev`, an
    /// uninitialized database, a dirty database, and a version other than
    /// the binary's.
    pub async fn check(&self, cancel: &CancellationToken, allow_dev: bool) -> Result<SchemaState> {
        if self.is_dev_migration() {
            if !allow_dev {
                return Err(WardenError::DevMigration(self.dialect.to_string()));
            }
            warn!(dialect = %self.dialect, "Using development migrations");
        }

        let state = self.state(cancel).await?;
        match state.status() {
            SchemaStatus::Uninitialized => Err(WardenError::SchemaNotInitialized),
            SchemaStatus::Dirty => Err(WardenError::SchemaDirty {
                version: state.current_schema_version,
            }),
            SchemaStatus::Behind | SchemaStatus::Ahead => {
                Err(WardenError::SchemaVersionMismatch {
                    current: state.current_schema_version,
                    binary: state.binary_schema_version,
                })
            }
            SchemaStatus::Current => {
                info!(
                    dialect = %self.dialect,
                    version = state.current_schema_version,
                    "Database schema is current"
                );
                Ok(state)
            }
        }
    }
}
