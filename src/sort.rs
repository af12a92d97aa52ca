//! Sort compilation.
//!
//! Sort keys come either as text (`name:asc,role.name:desc,age`) or as a
//! structured list of `{field, direction}`. Nested paths join through the
//! same registry as filters, so sorting on a relationship a filter already
//! joined adds no new join.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::QueryCatalog;
use crate::error::{Capability, CompileError, CompileResult};
use crate::path::FieldPath;
use crate::resolve::{CompileContext, JoinStrategy};
use crate::sql::OrderByExpr;

/// Sort direction, parsed case-insensitively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            // `name:` is the same as `name`
            "" | "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(CompileError::syntax(format!(
                "Invalid sort direction '{}': expected 'asc' or 'desc'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for SortDirection {
    type Error = CompileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortDirection> for String {
    fn from(dir: SortDirection) -> Self {
        dir.as_str().to_string()
    }
}

/// One requested ordering, as received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// A validated sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub path: FieldPath,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn from_field(field: &SortField) -> CompileResult<Self> {
        Ok(Self {
            path: FieldPath::parse(field.field.trim())?,
            direction: field.direction,
        })
    }
}

/// Parse `field[:direction]` entries separated by commas.
pub fn parse_sort(raw: &str) -> CompileResult<Vec<SortKey>> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| -> CompileResult<SortKey> {
            let (field, direction) = match token.split_once(':') {
                Some((field, dir)) => (
                    field.trim(),
                    dir.parse::<SortDirection>().map_err(|e| at(field, e))?,
                ),
                None => (token, SortDirection::Asc),
            };
            Ok(SortKey {
                path: FieldPath::parse(field)?,
                direction,
            })
        })
        .collect()
}

fn at(field: &str, err: CompileError) -> CompileError {
    match err {
        CompileError::Syntax { message, .. } => CompileError::syntax_at(field.trim(), message),
        other => other,
    }
}

/// Resolve each key and append it to the query's ORDER BY, in order.
pub fn compile_sort(
    ctx: &mut CompileContext<'_>,
    catalog: &QueryCatalog,
    keys: &[SortKey],
) -> CompileResult<()> {
    for key in keys {
        ctx.locate(&key.path)?;
        catalog.check(Capability::Sort, &key.path)?;
        let column = ctx.resolve(&key.path, JoinStrategy::Unkeyed)?;
        if column.column_type.category().is_none() {
            return Err(CompileError::Policy {
                capability: Capability::Sort,
                field: key.path.to_string(),
                operator: None,
            });
        }
        ctx.order_by(match key.direction {
            SortDirection::Asc => OrderByExpr::asc(column.expr),
            SortDirection::Desc => OrderByExpr::desc(column.expr),
        });
    }
    Ok(())
}
