mod dialect;
mod driver;
mod migration;
mod registry;
mod state;

pub use dialect::Dialect;
pub use driver::{DriverVersion, VersionDriver, NIL_VERSION};
pub use migration::{MigrationScripts, MigrationState};
pub use registry::MigrationRegistry;
pub use state::{compute_state, SchemaState, SchemaStatus};
