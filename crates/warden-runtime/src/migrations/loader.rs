//! Loads migration scripts from disk into [`MigrationState`] values.
//!
//! Layout under the migrations root:
//!
//! ```text
//! migrations/
//!   postgres/
//!     1_init.up.sql
//!     1_init.down.sql
//!     2_roles.up.sql
//!     dev/
//!       3_scopes.up.sql
//! ```
//!
//! Anything under `dev/` marks the whole set as a development migration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use warden_core::error::{Result, WardenError};
use warden_core::schema::{MigrationRegistry, MigrationScripts, MigrationState};

/// Subdirectory holding migrations that are not yet released.
const DEV_DIR: &str = "dev";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Direction {
    Up,
    Down,
}

/// One migration file on disk.
#[derive(Debug)]
struct MigrationFile {
    version: i64,
    direction: Direction,
    path: PathBuf,
}

/// Load the migration state for `dialect` from `root/<dialect>`.
pub fn load_migration_state(root: &Path, dialect: &str) -> Result<MigrationState> {
    let dialect_dir = root.join(dialect);
    if !dialect_dir.is_dir() {
        return Err(WardenError::Config(format!(
            "Migrations directory for dialect {} does not exist: {:?}",
            dialect, dialect_dir
        )));
    }

    let mut files = read_migration_files(&dialect_dir)?;

    let dev_dir = dialect_dir.join(DEV_DIR);
    let mut dev_migration = false;
    if dev_dir.is_dir() {
        let dev_files = read_migration_files(&dev_dir)?;
        if !dev_files.is_empty() {
            warn!(
                dialect,
                count = dev_files.len(),
                "Loaded development migrations; do not use this build in production"
            );
            dev_migration = true;
            files.extend(dev_files);
        }
    }

    let mut up = MigrationScripts::new();
    let mut down = MigrationScripts::new();
    for file in &files {
        let content = std::fs::read(&file.path)?;
        let scripts = match file.direction {
            Direction::Up => &mut up,
            Direction::Down => &mut down,
        };
        scripts.entry(file.version).or_default().extend_from_slice(&content);
    }

    if up.is_empty() {
        return Err(WardenError::InvalidMigration(format!(
            "No up migrations found for dialect {} in {:?}",
            dialect, dialect_dir
        )));
    }

    for version in down.keys() {
        if !up.contains_key(version) {
            warn!(dialect, version, "Down migration has no matching up migration");
        }
    }

    let state = MigrationState::new(dev_migration, up, down);
    debug!(
        dialect,
        binary_schema_version = state.binary_schema_version(),
        files = files.len(),
        "Loaded migrations"
    );
    Ok(state)
}

/// Load every dialect, register it, then seal the registry.
pub fn register_dialects<S: AsRef<str>>(
    registry: &MigrationRegistry,
    root: &Path,
    dialects: &[S],
) -> Result<()> {
    for dialect in dialects {
        let dialect = dialect.as_ref();
        let state = load_migration_state(root, dialect)?;
        registry.register(dialect, state)?;
    }
    registry.seal();
    Ok(())
}

/// Read the `.sql` files directly inside `dir`, sorted by file name so that
/// scripts sharing a version are concatenated in a stable order.
fn read_migration_files(dir: &Path) -> Result<Vec<MigrationFile>> {
    let mut named = BTreeMap::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().map(|e| e == "sql").unwrap_or(false) {
            let name = path
                .file_name()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    WardenError::InvalidMigration(format!("Invalid migration filename: {:?}", path))
                })?
                .to_string();
            named.insert(name, path);
        }
    }

    named
        .into_iter()
        .map(|(name, path)| -> Result<MigrationFile> {
            let (version, direction) = parse_file_name(&name)?;
            Ok(MigrationFile {
                version,
                direction,
                path,
            })
        })
        .collect()
}

/// Parse `<version>_<description>.<up|down>.sql`. The description is optional.
fn parse_file_name(name: &str) -> Result<(i64, Direction)> {
    let invalid = || {
        WardenError::InvalidMigration(format!(
            "Migration file {} must be named <version>_<name>.up.sql or .down.sql",
            name
        ))
    };

    let (stem, direction) = if let Some(stem) = name.strip_suffix(".up.sql") {
        (stem, Direction::Up)
    } else if let Some(stem) = name.strip_suffix(".down.sql") {
        (stem, Direction::Down)
    } else {
        return Err(invalid());
    };

    let digits = stem.split('_').next().unwrap_or_default();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let version = digits.parse::<i64>().map_err(|_| invalid())?;

    Ok((version, direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_parse_file_name() {
        assert_eq!(parse_file_name("1_init.up.sql").unwrap(), (1, Direction::Up));
        assert_eq!(parse_file_name("0012_roles.down.sql").unwrap(), (12, Direction::Down));
        assert_eq!(parse_file_name("3.up.sql").unwrap(), (3, Direction::Up));
        assert!(parse_file_name("init.up.sql").is_err());
        assert!(parse_file_name("1_init.sql").is_err());
        assert!(parse_file_name("-1_init.up.sql").is_err());
    }

    #[test]
    fn test_load_release_migrations() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("postgres");
        write(&dir, "1_init.up.sql", "CREATE TABLE a ();");
        write(&dir, "1_init.down.sql", "DROP TABLE a;");
        write(&dir, "2_roles.up.sql", "CREATE TABLE b ();");
        write(&dir, "README.md", "not a migration");

        let state = load_migration_state(root.path(), "postgres").unwrap();
        assert!(!state.dev_migration());
        assert_eq!(state.binary_schema_version(), 2);
        assert_eq!(state.up(1), Some("CREATE TABLE a ();".as_bytes()));
        assert_eq!(state.down(1), Some("DROP TABLE a;".as_bytes()));
        assert!(state.down(2).is_none());
    }

    #[test]
    fn test_dev_directory_marks_dev_migration() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("postgres");
        write(&dir, "1_init.up.sql", "SELECT 1;");
        write(&dir.join("dev"), "5_scopes.up.sql", "SELECT 5;");

        let state = load_migration_state(root.path(), "postgres").unwrap();
        assert!(state.dev_migration());
        assert_eq!(state.binary_schema_version(), 5);
    }

    #[test]
    fn test_empty_dev_directory_is_release() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("postgres");
        write(&dir, "1_init.up.sql", "SELECT 1;");
        fs::create_dir_all(dir.join("dev")).unwrap();

        let state = load_migration_state(root.path(), "postgres").unwrap();
        assert!(!state.dev_migration());
    }

    #[test]
    fn test_same_version_concatenated_in_name_order() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("postgres");
        write(&dir, "1_b_tables.up.sql", "B;");
        write(&dir, "1_a_types.up.sql", "A;");

        let state = load_migration_state(root.path(), "postgres").unwrap();
        assert_eq!(state.up(1), Some("A;B;".as_bytes()));
    }

    #[test]
    fn test_missing_dialect_dir() {
        let root = TempDir::new().unwrap();
        let result = load_migration_state(root.path(), "postgres");
        assert!(matches!(result, Err(WardenError::Config(_))));
    }

    #[test]
    fn test_no_up_migrations() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("postgres");
        write(&dir, "1_init.down.sql", "DROP TABLE a;");

        let result = load_migration_state(root.path(), "postgres");
        assert!(matches!(result, Err(WardenError::InvalidMigration(_))));
    }

    #[test]
    fn test_malformed_name_rejected() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("postgres");
        write(&dir, "1_init.up.sql", "SELECT 1;");
        write(&dir, "init.sql", "SELECT 2;");

        let result = load_migration_state(root.path(), "postgres");
        assert!(matches!(result, Err(WardenError::InvalidMigration(_))));
    }

    #[test]
    fn test_register_dialects_seals_registry() {
        let root = TempDir::new().unwrap();
        write(&root.path().join("postgres"), "3_init.up.sql", "SELECT 3;");
        write(&root.path().join("sqlite"), "1_init.up.sql", "SELECT 1;");

        let registry = MigrationRegistry::new();
        register_dialects(&registry, root.path(), &["postgres", "sqlite"]).unwrap();

        assert!(registry.is_sealed());
        assert_eq!(registry.binary_schema_version("postgres"), 3);
        assert_eq!(registry.binary_schema_version("sqlite"), 1);
        assert!(!registry.is_dev_migration("postgres"));
    }

    #[test]
    fn test_register_dialects_stops_on_error() {
        let root = TempDir::new().unwrap();
        write(&root.path().join("postgres"), "3_init.up.sql", "SELECT 3;");

        let registry = MigrationRegistry::new();
        let result = register_dialects(&registry, root.path(), &["postgres", "mysql"]);

        assert!(result.is_err());
        assert!(!registry.is_sealed());
        assert_eq!(registry.binary_schema_version("postgres"), 3);
    }
}
