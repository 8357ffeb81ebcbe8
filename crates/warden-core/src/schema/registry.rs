use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use super::dialect::Dialect;
use super::migration::MigrationState;
use crate::error::{Result, WardenError};

/// Registry of the migration sets this binary was built with, by dialect.
///
/// Lifecycle is single-writer then read-only: every dialect is registered
/// during startup, [`seal`](Self::seal) is called, and from then on the
/// registry only answers lookups. Each dialect can be registered once; a
/// second registration is rejected so a dev set can never silently replace a
/// release set (or the reverse).
///
/// Lookups for a dialect that was never registered return zero values
/// (`false`, `0`) rather than an error. Whether a dialect is actually usable is
/// decided where a connection for it is opened.
pub struct MigrationRegistry {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    states: HashMap<Dialect, Arc<MigrationState>>,
    sealed: bool,
}

impl MigrationRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Register the migration state for a dialect.
    pub fn register(&self, dialect: impl Into<Dialect>, state: MigrationState) -> Result<()> {
        let dialect = dialect.into();
        let mut inner = self.write();

        if inner.sealed {
            return Err(WardenError::InvalidState(format!(
                "cannot register dialect {} after the migration registry was sealed",
                dialect
            )));
        }
        if inner.states.contains_key(&dialect) {
            return Err(WardenError::DialectAlreadyRegistered(dialect.to_string()));
        }

        info!(
            dialect = %dialect,
            binary_schema_version = state.binary_schema_version(),
            dev_migration = state.dev_migration(),
            up = state.up_migrations().len(),
            down = state.down_migrations().len(),
            "Registered migrations"
        );
        inner.states.insert(dialect, Arc::new(state));
        Ok(())
    }

    /// End the startup phase. Later registrations fail.
    pub fn seal(&self) {
        let mut inner = self.write();
        if !inner.sealed {
            debug!(dialects = inner.states.len(), "Migration registry sealed");
            inner.sealed = true;
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.read().sealed
    }

    /// Whether the dialect's migrations come from the development tree.
    pub fn is_dev_migration(&self, dialect: &str) -> bool {
        self.read()
            .states
            .get(dialect)
            .map(|s| s.dev_migration())
            .unwrap_or(false)
    }

    /// Highest schema version this binary supports for the dialect.
    pub fn binary_schema_version(&self, dialect: &str) -> i64 {
        self.read()
            .states
            .get(dialect)
            .map(|s| s.binary_schema_version())
            .unwrap_or(0)
    }

    /// Get the full migration state for a dialect.
    pub fn get(&self, dialect: &str) -> Option<Arc<MigrationState>> {
        self.read().states.get(dialect).cloned()
    }

    /// All registered dialects, sorted.
    pub fn dialects(&self) -> Vec<Dialect> {
        let mut dialects: Vec<Dialect> = self.read().states.keys().cloned().collect();
        dialects.sort();
        dialects
    }

    // A panic while holding the lock cannot leave the map half-written
    // (insert is the only mutation), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MigrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
