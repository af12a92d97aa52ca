//! Load a [`Schema`] from a TOML definition file.
//!
//! ```toml
//! [[entities]]
//! name = "users"
//! table = "users"
//! columns = [
//!     { name = "id", type = "integer" },
//!     { name = "name", type = "string" },
//!     { name = "role_id", type = "integer" },
//! ]
//! relationships = [
//!     { name = "role", target = "roles", local = "role_id", remote = "id" },
//! ]
//! ```
//!
//! `table` defaults to the entity name. Column order in the file is the
//! order the catalog and root-only search see.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{Entity, Schema, SchemaError};

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    entities: Vec<EntityDef>,
}

#[derive(Debug, Deserialize)]
struct EntityDef {
    name: String,
    table: Option<String>,
    schema: Option<String>,
    #[serde(default)]
    columns: Vec<super::Column>,
    #[serde(default)]
    relationships: Vec<super::Relationship>,
}

impl From<EntityDef> for Entity {
    fn from(def: EntityDef) -> Self {
        Entity {
            table: def.table.unwrap_or_else(|| def.name.clone()),
            name: def.name,
            schema: def.schema,
            columns: def.columns,
            relationships: def.relationships,
        }
    }
}

/// Parse and validate a schema from TOML text.
pub fn from_toml_str(content: &str) -> Result<Schema, SchemaError> {
    let file: SchemaFile = toml::from_str(content)?;
    Schema::new(file.entities.into_iter().map(Entity::from))
}

/// Read, parse and validate a schema file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Schema, SchemaError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SchemaError::FileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let schema = from_toml_str(&content)?;
    tracing::debug!(path = %path.display(), entities = schema.len(), "loaded schema");
    Ok(schema)
}
