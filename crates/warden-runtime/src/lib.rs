pub mod db;
pub mod migrations;

pub use db::Database;
pub use migrations::{
    load_migration_state, register_dialects, PgVersionDriver, SchemaManager,
};
