//! Column types and the categories the compiler reasons about.

use serde::{Deserialize, Serialize};

/// Physical type of a column as declared by the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    String,
    Text,
    /// Database enum; compared through a cast to text.
    Enum,
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    DateTime,
    /// Anything else (JSON, binary, arrays...). Never filterable, sortable
    /// or searchable.
    Other(String),
}

/// Semantic category of a column. Decides which operators apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    String,
    Number,
    Boolean,
    Datetime,
}

impl ColumnType {
    /// Parse a type name. Unknown names become [`ColumnType::Other`].
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "string" | "varchar" | "char" => ColumnType::String,
            "text" => ColumnType::Text,
            "enum" => ColumnType::Enum,
            "integer" | "int" | "bigint" | "smallint" => ColumnType::Integer,
            "float" | "double" | "real" => ColumnType::Float,
            "decimal" | "numeric" => ColumnType::Decimal,
            "boolean" | "bool" => ColumnType::Boolean,
            "date" => ColumnType::Date,
            "datetime" | "timestamp" => ColumnType::DateTime,
            other => ColumnType::Other(other.to_string()),
        }
    }

    /// Canonical type name.
    pub fn name(&self) -> &str {
        match self {
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Enum => "enum",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Other(name) => name,
        }
    }

    /// The category this type belongs to, or `None` when unsupported.
    pub fn category(&self) -> Option<TypeCategory> {
        match self {
            ColumnType::String | ColumnType::Text | ColumnType::Enum => Some(TypeCategory::String),
            ColumnType::Integer | ColumnType::Float | ColumnType::Decimal => {
                Some(TypeCategory::Number)
            }
            ColumnType::Boolean => Some(TypeCategory::Boolean),
            ColumnType::Date | ColumnType::DateTime => Some(TypeCategory::Datetime),
            ColumnType::Other(_) => None,
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, ColumnType::Enum)
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        ColumnType::parse(&s)
    }
}

impl From<ColumnType> for String {
    fn from(t: ColumnType) -> Self {
        t.name().to_string()
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TypeCategory::String => "string",
            TypeCategory::Number => "number",
            TypeCategory::Boolean => "boolean",
            TypeCategory::Datetime => "datetime",
        })
    }
}
