use std::future::Future;
use std::pin::Pin;

use sqlx::PgPool;
use tracing::debug;
use warden_core::error::{Result, WardenError};
use warden_core::schema::{DriverVersion, VersionDriver, NIL_VERSION};

/// Reads the schema version from a PostgreSQL version table.
///
/// The table holds at most one row, `(version BIGINT, dirty BOOLEAN)`, which
/// is the layout golang-migrate and compatible tools write. A missing table
/// and an empty table both mean no version has been recorded.
///
/// The table is resolved with `to_regclass`, so the existence check follows
/// the same `search_path` lookup as the version read.
#[derive(Clone)]
pub struct PgVersionDriver {
    pool: PgPool,
    table: String,
}

impl PgVersionDriver {
    /// Create a driver reading `table`. The name must be a plain lowercase
    /// identifier, so that unquoted SQL refers to the same table.
    pub fn new(pool: PgPool, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_identifier(&table)?;
        Ok(Self { pool, table })
    }

    async fn read_version(&self) -> Result<DriverVersion> {
        let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(&self.table)
            .fetch_one(&self.pool)
            .await?;

        if !exists {
            debug!(table = %self.table, "Version table does not exist");
            return Ok(DriverVersion::nil());
        }

        let sql = format!("SELECT version, dirty FROM {} LIMIT 1", self.table);
        let row: Option<(i64, bool)> = sqlx::query_as(&sql).fetch_optional(&self.pool).await?;

        interpret_row(row)
    }
}

impl VersionDriver for PgVersionDriver {
    fn version(&self) -> Pin<Box<dyn Future<Output = Result<DriverVersion>> + Send + '_>> {
        Box::pin(self.read_version())
    }
}

fn interpret_row(row: Option<(i64, bool)>) -> Result<DriverVersion> {
    match row {
        None => Ok(DriverVersion::nil()),
        Some((version, dirty)) if version == NIL_VERSION => Ok(DriverVersion::new(version, dirty)),
        Some((version, _)) if version < 0 => Err(WardenError::Database(format!(
            "Corrupted schema version record: {}",
            version
        ))),
        Some((version, dirty)) => Ok(DriverVersion::new(version, dirty)),
    }
}

fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {
            chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        _ => false,
    };

    if valid && name.len() <= 63 {
        Ok(())
    } else {
        Err(WardenError::Config(format!(
            "Invalid version table name: {:?}",
            name
        )))
    }
}
