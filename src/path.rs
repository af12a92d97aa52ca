//! Dotted field paths (`role.department.name`).

use crate::error::{CompileError, CompileResult};

/// A dotted path from the root entity: zero or more relationship names
/// followed by a column name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    relations: Vec<String>,
    column: String,
}

impl FieldPath {
    /// Parse `a.b.c`. Every segment must be non-empty.
    pub fn parse(raw: &str) -> CompileResult<Self> {
        let mut segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(CompileError::syntax_at(
                raw,
                format!("Invalid field path '{}': empty path segment", raw),
            ));
        }
        // split always yields at least one item
        let column = segments.pop().unwrap_or_default();
        Ok(Self {
            relations: segments,
            column,
        })
    }

    /// Single-segment path naming a root column.
    pub fn root(column: &str) -> Self {
        Self {
            relations: vec![],
            column: column.into(),
        }
    }

    /// Relationship names, outermost first.
    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    /// The final segment.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn is_nested(&self) -> bool {
        !self.relations.is_empty()
    }

    /// The first segment: a relationship when nested, the column otherwise.
    pub fn head(&self) -> &str {
        self.relations.first().unwrap_or(&self.column)
    }

    /// All segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.relations
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.column.as_str()))
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rel in &self.relations {
            write!(f, "{}.", rel)?;
        }
        f.write_str(&self.column)
    }
}

impl std::str::FromStr for FieldPath {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}
