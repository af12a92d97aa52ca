//! The entity graph the compiler works against.
//!
//! Entities, their ordered columns and their named relationships are owned by
//! the data layer; the compiler only reads them through [`Introspect`].
//! [`Schema`] is the in-crate implementation, built programmatically or
//! loaded from a TOML definition file (see [`loader`]).

pub mod loader;
mod types;

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use types::{ColumnType, TypeCategory};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Read access to entity definitions.
///
/// This is the only thing the compiler needs from the data layer.
pub trait Introspect {
    /// Look up an entity by name.
    fn entity(&self, name: &str) -> Option<&Entity>;
}

/// A column of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// A named link from one entity to another.
///
/// Joining follows `target.remote_column = source.local_column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub name: String,
    pub target: String,
    #[serde(rename = "local")]
    pub local_column: String,
    #[serde(rename = "remote")]
    pub remote_column: String,
}

/// A named record type backed by one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// A column or relationship found by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute<'a> {
    Column(&'a Column),
    Relationship(&'a Relationship),
}

impl Entity {
    /// New entity whose table has the same name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            table: name.into(),
            schema: None,
            columns: vec![],
            relationships: vec![],
        }
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Append a column.
    pub fn column(mut self, name: &str, column_type: ColumnType) -> Self {
        self.columns.push(Column {
            name: name.into(),
            column_type,
        });
        self
    }

    /// Append a relationship to `target`, joined on
    /// `target.remote_column = self.local_column`.
    pub fn relationship(
        mut self,
        name: &str,
        target: &str,
        local_column: &str,
        remote_column: &str,
    ) -> Self {
        self.relationships.push(Relationship {
            name: name.into(),
            target: target.into(),
            local_column: local_column.into(),
            remote_column: remote_column.into(),
        });
        self
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn get_relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Find a column or relationship by name.
    pub fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        self.get_column(name)
            .map(Attribute::Column)
            .or_else(|| self.get_relationship(name).map(Attribute::Relationship))
    }

    fn validate(&self) -> Result<(), SchemaError> {
        check_identifier("entity", &self.name)?;
        check_identifier("table", &self.table)?;

        let mut seen = HashSet::new();
        for column in &self.columns {
            check_identifier("column", &column.name)?;
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateAttribute {
                    entity: self.name.clone(),
                    name: column.name.clone(),
                });
            }
        }
        for rel in &self.relationships {
            check_identifier("relationship", &rel.name)?;
            if self.get_column(&rel.name).is_some() {
                return Err(SchemaError::NameClash {
                    entity: self.name.clone(),
                    name: rel.name.clone(),
                });
            }
            if !seen.insert(rel.name.as_str()) {
                return Err(SchemaError::DuplicateAttribute {
                    entity: self.name.clone(),
                    name: rel.name.clone(),
                });
            }
            if self.get_column(&rel.local_column).is_none() {
                return Err(SchemaError::UnknownJoinColumn {
                    entity: self.name.clone(),
                    relationship: rel.name.clone(),
                    column: rel.local_column.clone(),
                });
            }
        }
        Ok(())
    }
}

fn check_identifier(kind: &'static str, name: &str) -> Result<(), SchemaError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

/// Errors found while building or loading a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid {kind} name '{name}': names must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier { kind: &'static str, name: String },

    #[error("Entity '{0}' is defined more than once")]
    DuplicateEntity(String),

    #[error("Entity '{entity}' defines '{name}' more than once")]
    DuplicateAttribute { entity: String, name: String },

    #[error("Entity '{entity}' has a relationship and a column both named '{name}'")]
    NameClash { entity: String, name: String },

    #[error("Relationship '{entity}.{relationship}' targets unknown entity '{target}'")]
    UnknownTarget {
        entity: String,
        relationship: String,
        target: String,
    },

    #[error("Relationship '{entity}.{relationship}' joins on unknown column '{column}'")]
    UnknownJoinColumn {
        entity: String,
        relationship: String,
        column: String,
    },

    #[error("Schema file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read schema file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse schema file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A validated set of entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    entities: BTreeMap<String, Entity>,
}

impl Schema {
    /// Build a schema, checking names and relationship references.
    pub fn new(entities: impl IntoIterator<Item = Entity>) -> Result<Self, SchemaError> {
        let mut map = BTreeMap::new();
        for entity in entities {
            entity.validate()?;
            let name = entity.name.clone();
            if map.insert(name.clone(), entity).is_some() {
                return Err(SchemaError::DuplicateEntity(name));
            }
        }

        for entity in map.values() {
            for rel in &entity.relationships {
                let target = map.get(&rel.target).ok_or_else(|| SchemaError::UnknownTarget {
                    entity: entity.name.clone(),
                    relationship: rel.name.clone(),
                    target: rel.target.clone(),
                })?;
                if target.get_column(&rel.remote_column).is_none() {
                    return Err(SchemaError::UnknownJoinColumn {
                        entity: entity.name.clone(),
                        relationship: rel.name.clone(),
                        column: format!("{}.{}", target.name, rel.remote_column),
                    });
                }
            }
        }

        Ok(Self { entities: map })
    }

    /// All entities, ordered by name.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Introspect for Schema {
    fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }
}
