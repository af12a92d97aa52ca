//! TOML-based configuration for sift.
//!
//! Supports a config file (sift.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [compiler]
//! dialect = "postgres"
//! soft_delete_column = "deleted_at"   # "" disables soft-delete filtering
//!
//! [schema]
//! path = "${APP_HOME}/schema.toml"
//!
//! [logging]
//! filter = "sift=info"
//!
//! [query_types.users]
//! entity = "users"
//! only = ["name", "email", "age", "role", "created_at"]
//! exclude = ["filter:age", "search:email"]
//! ```

mod settings;

pub use settings::{
    expand_env_vars, CompilerSettings, LoggingSettings, QueryTypeSettings, SchemaSettings,
    Settings, SettingsError,
};
