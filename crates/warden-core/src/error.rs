use thiserror::Error;

/// Core error type for Warden operations.
#[derive(Error, Debug)]
pub enum WardenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Dialect already registered: {0}")]
    DialectAlreadyRegistered(String),

    #[error("Invalid migration: {0}")]
    InvalidMigration(String),

    #[error("Dialect {0} uses development migrations, which are unsafe outside development")]
    DevMigration(String),

    #[error("Database schema has not been initialized")]
    SchemaNotInitialized,

    #[error("Database schema is dirty at version {version}; a previous migration failed")]
    SchemaDirty { version: i64 },

    #[error("Database schema version {current} does not match binary schema version {binary}")]
    SchemaVersionMismatch { current: i64, binary: i64 },
}

impl WardenError {
    /// True when the error came from a cancelled context rather than the driver.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WardenError::Cancelled(_))
    }
}

/// Result type alias using WardenError.
pub type Result<T> = std::result::Result<T, WardenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_messages() {
        let err = WardenError::SchemaDirty { version: 7 };
        assert_eq!(
            err.to_string(),
            "Database schema is dirty at version 7; a previous migration failed"
        );

        let err = WardenError::SchemaVersionMismatch {
            current: 3,
            binary: 5,
        };
        assert!(err.to_string().contains("3"));
        assert!(err.to_string().contains("5"));
    }

    #[test]
    fn test_sqlx_error_converts() {
        let err: WardenError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, WardenError::Sql(sqlx::Error::PoolTimedOut)));
    }

    #[test]
    fn test_is_cancelled() {
        assert!(WardenError::Cancelled("compute_state".into()).is_cancelled());
        assert!(!WardenError::Timeout("compute_state".into()).is_cancelled());
    }
}
