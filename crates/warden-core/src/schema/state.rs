//! Reconciliation of the binary's migrations against a live database.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::driver::{VersionDriver, NIL_VERSION};
use super::registry::MigrationRegistry;
use crate::error::{Result, WardenError};

/// Point-in-time view of a database schema relative to this binary.
///
/// `dirty` and `current_schema_version` are only meaningful when
/// `initialization_started` is true; otherwise they read `false` and `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SchemaState {
    pub initialization_started: bool,
    pub dirty: bool,
    pub current_schema_version: i64,
    pub binary_schema_version: i64,
}

/// Coarse classification of a [`SchemaState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaStatus {
    /// No version has ever been recorded.
    Uninitialized,
    /// A migration failed partway.
    Dirty,
    /// Database is older than the binary.
    Behind,
    /// Database matches the binary.
    Current,
    /// Database was migrated by a newer binary.
    Ahead,
}

impl SchemaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Dirty => "dirty",
            Self::Behind => "behind",
            Self::Current => "current",
            Self::Ahead => "ahead",
        }
    }
}

impl std::fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SchemaState {
    /// State of a database with no recorded version.
    pub fn uninitialized(binary_schema_version: i64) -> Self {
        Self {
            binary_schema_version,
            ..Default::default()
        }
    }

    /// Dirty wins over any version comparison.
    pub fn status(&self) -> SchemaStatus {
        if !self.initialization_started {
            return SchemaStatus::Uninitialized;
        }
        if self.dirty {
            return SchemaStatus::Dirty;
        }
        match self.current_schema_version.cmp(&self.binary_schema_version) {
            std::cmp::Ordering::Less => SchemaStatus::Behind,
            std::cmp::Ordering::Equal => SchemaStatus::Current,
            std::cmp::Ordering::Greater => SchemaStatus::Ahead,
        }
    }

    pub fn is_current(&self) -> bool {
        self.status() == SchemaStatus::Current
    }
}

/// Compute the schema state of `dialect` as seen through `driver`.
///
/// The binary schema version is always filled in, even for an uninitialized
/// database. Driver errors are returned unchanged and never retried. If
/// `cancel` fires before the driver answers, the pending read is dropped and
/// [`WardenError::Cancelled`] is returned.
pub async fn compute_state<D>(
    registry: &MigrationRegistry,
    cancel: &CancellationToken,
    dialect: &str,
    driver: &D,
) -> Result<SchemaState>
where
    D: VersionDriver + ?Sized,
{
    let mut state = SchemaState::uninitialized(registry.binary_schema_version(dialect));

    let version = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(dialect, "Schema state read cancelled");
            return Err(WardenError::Cancelled(format!(
                "schema state read for dialect {}",
                dialect
            )));
        }
        result = driver.version() => result?,
    };

    if version.version == NIL_VERSION {
        return Ok(state);
    }

    state.initialization_started = true;
    state.current_schema_version = version.version;
    state.dirty = version.dirty;
    Ok(state)
}
