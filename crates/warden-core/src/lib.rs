pub mod config;
pub mod error;
pub mod schema;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::WardenConfig;
pub use error::{Result, WardenError};
pub use schema::{
    compute_state, Dialect, DriverVersion, MigrationRegistry, MigrationState, SchemaState,
    SchemaStatus, VersionDriver, NIL_VERSION,
};
