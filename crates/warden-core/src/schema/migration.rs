use std::collections::BTreeMap;

/// Compiled migration scripts keyed by the version they transition to/from.
pub type MigrationScripts = BTreeMap<i64, Vec<u8>>;

/// What this binary knows about the migrations for one dialect.
///
/// Immutable once built; the registry hands it out behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MigrationState {
    /// True if the scripts came from the development tree, which makes them
    /// unsafe to apply outside development.
    dev_migration: bool,

    /// Highest schema version this binary can migrate to.
    binary_schema_version: i64,

    up_migrations: MigrationScripts,
    down_migrations: MigrationScripts,
}

impl MigrationState {
    /// Build a state whose binary version is the highest up migration.
    /// An empty up set yields version 0.
    pub fn new(dev_migration: bool, up: MigrationScripts, down: MigrationScripts) -> Self {
        let binary_schema_version = up.keys().next_back().copied().unwrap_or(0);
        Self {
            dev_migration,
            binary_schema_version,
            up_migrations: up,
            down_migrations: down,
        }
    }

    /// Build a state with an explicit binary version.
    pub fn with_version(
        dev_migration: bool,
        binary_schema_version: i64,
        up: MigrationScripts,
        down: MigrationScripts,
    ) -> Self {
        Self {
            dev_migration,
            binary_schema_version,
            up_migrations: up,
            down_migrations: down,
        }
    }

    pub fn dev_migration(&self) -> bool {
        self.dev_migration
    }

    pub fn binary_schema_version(&self) -> i64 {
        self.binary_schema_version
    }

    pub fn up_migrations(&self) -> &MigrationScripts {
        &self.up_migrations
    }

    pub fn down_migrations(&self) -> &MigrationScripts {
        &self.down_migrations
    }

    /// Script that migrates up to `version`, if one exists.
    pub fn up(&self, version: i64) -> Option<&[u8]> {
        self.up_migrations.get(&version).map(Vec::as_slice)
    }

    /// Script that migrates down from `version`, if one exists.
    pub fn down(&self, version: i64) -> Option<&[u8]> {
        self.down_migrations.get(&version).map(Vec::as_slice)
    }
}
