//! Free-text search.
//!
//! Without explicit search fields, the term is matched against the root
//! entity's searchable columns only: text columns by case-insensitive
//! containment, integer columns by equality when the term is all digits,
//! boolean columns when the term is `true` or `false`. No joins are made.
//!
//! With explicit search fields (`name,role.name,role.department.name`), each
//! path is checked for cycles and against the catalog, then resolved with
//! path-keyed joins so two routes to the same entity stay independent. Any
//! join marks the query `DISTINCT`, since to-many joins duplicate rows.

use std::collections::HashSet;

use crate::catalog::QueryCatalog;
use crate::error::{Capability, CompileError, CompileResult};
use crate::filter::operator::contains;
use crate::path::FieldPath;
use crate::resolve::{CompileContext, JoinStrategy, ResolvedColumn};
use crate::schema::{ColumnType, Entity, Introspect};
use crate::sql::{lit_bool, lit_int, Expr, ExprExt};

/// Ordered, deduplicated search paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths(Vec<FieldPath>);

impl SearchPaths {
    /// Parse a comma-separated list. Blank entries are skipped.
    pub fn parse(raw: &str) -> CompileResult<Self> {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let path = FieldPath::parse(entry)?;
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
        Ok(Self(paths))
    }

    pub fn paths(&self) -> &[FieldPath] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<FieldPath> for SearchPaths {
    fn from_iter<T: IntoIterator<Item = FieldPath>>(iter: T) -> Self {
        let mut seen = HashSet::new();
        Self(iter.into_iter().filter(|p| seen.insert(p.clone())).collect())
    }
}

/// Reject a path whose relationships revisit an entity, the root included.
///
/// Only repetition within this one path is detected.
pub fn check_cycle(schema: &dyn Introspect, root: &Entity, path: &FieldPath) -> CompileResult<()> {
    let mut visited = HashSet::from([root.name.as_str()]);
    let mut entity = root;
    for segment in path.relations() {
        // Anything that does not resolve is reported by resolution.
        let Some(target) = entity
            .get_relationship(segment)
            .and_then(|rel| schema.entity(&rel.target))
        else {
            return Ok(());
        };
        if !visited.insert(target.name.as_str()) {
            return Err(CompileError::Cycle {
                path: path.to_string(),
                entity: target.name.clone(),
            });
        }
        entity = target;
    }
    Ok(())
}

/// The predicate matching `term` against one column, if its type is searchable.
pub fn term_predicate(column: &ResolvedColumn, term: &str) -> Option<Expr> {
    match column.column_type {
        ColumnType::String | ColumnType::Text | ColumnType::Enum => Some(contains(column, term)),
        ColumnType::Integer => {
            if term.is_empty() || !term.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            term.parse::<i64>()
                .ok()
                .map(|n| column.expr.clone().eq(lit_int(n)))
        }
        ColumnType::Boolean => match term.to_ascii_lowercase().as_str() {
            "true" => Some(column.expr.clone().eq(lit_bool(true))),
            "false" => Some(column.expr.clone().eq(lit_bool(false))),
            _ => None,
        },
        _ => None,
    }
}

/// Compile a search term into a disjunction over the searched columns.
///
/// Returns `None` for an empty term or when no column can match it.
pub fn compile_search(
    ctx: &mut CompileContext<'_>,
    catalog: &QueryCatalog,
    term: &str,
    fields: Option<&SearchPaths>,
) -> CompileResult<Option<Expr>> {
    if term.is_empty() {
        return Ok(None);
    }

    let predicates = match fields.filter(|f| !f.is_empty()) {
        None => root_predicates(ctx, catalog, term),
        Some(fields) => explicit_predicates(ctx, catalog, term, fields)?,
    };

    tracing::debug!(
        term,
        explicit = fields.is_some_and(|f| !f.is_empty()),
        columns = predicates.len(),
        distinct = ctx.query().distinct,
        "compiled search"
    );
    Ok(Expr::disjunction(predicates))
}

fn root_predicates(ctx: &CompileContext<'_>, catalog: &QueryCatalog, term: &str) -> Vec<Expr> {
    ctx.root()
        .columns
        .iter()
        .filter(|c| catalog.is_searchable(&c.name))
        .filter_map(|c| {
            let column = ResolvedColumn {
                expr: ctx.root_column(&c.name),
                column_type: c.column_type.clone(),
                joined: false,
            };
            term_predicate(&column, term)
        })
        .collect()
}

fn explicit_predicates(
    ctx: &mut CompileContext<'_>,
    catalog: &QueryCatalog,
    term: &str,
    fields: &SearchPaths,
) -> CompileResult<Vec<Expr>> {
    let mut predicates = Vec::new();
    let mut joined = false;

    for path in fields.paths() {
        check_cycle(ctx.schema(), ctx.root(), path)?;
        ctx.locate(path)?;
        catalog.check(Capability::Search, path)?;

        let column = ctx.resolve(path, JoinStrategy::PathKeyed)?;
        if column.column_type.category().is_none() {
            return Err(CompileError::Policy {
                capability: Capability::Search,
                field: path.to_string(),
                operator: None,
            });
        }
        joined |= column.joined;
        predicates.extend(term_predicate(&column, term));
    }

    if joined {
        ctx.mark_distinct();
    }
    Ok(predicates)
}
