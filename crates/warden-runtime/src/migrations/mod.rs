mod driver;
mod loader;
mod manager;

pub use driver::PgVersionDriver;
pub use loader::{load_migration_state, register_dialects};
pub use manager::{SchemaManager, DEFAULT_VERSION_TIMEOUT};
