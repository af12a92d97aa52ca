//! Path resolution: dotted field paths to column references and joins.
//!
//! Each compilation owns a [`CompileContext`] holding the query under
//! construction and two join registries. Filters and sorts share the
//! [`JoinStrategy::Unkeyed`] registry, so every path that reaches an entity
//! reuses the same join. Explicit search paths use
//! [`JoinStrategy::PathKeyed`], so two routes to the same entity get
//! independent aliases.

use std::collections::HashMap;

use crate::error::{CompileError, CompileResult, ResolutionReason};
use crate::path::FieldPath;
use crate::schema::{Attribute, Column, ColumnType, Entity, Introspect, Relationship};
use crate::sql::{table_col, table_star, Expr, ExprExt, Join, OrderByExpr, Query, TableRef};

/// How joins are keyed for reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinStrategy {
    /// Keyed by target entity: one alias per entity.
    Unkeyed,
    /// Keyed by the relationship path walked plus the target entity.
    PathKeyed,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum JoinKey {
    Entity(String),
    Path(Vec<String>, String),
}

/// Join aliases registered under one strategy.
#[derive(Debug, Clone)]
pub struct JoinRegistry {
    strategy: JoinStrategy,
    aliases: HashMap<JoinKey, String>,
}

impl JoinRegistry {
    pub fn new(strategy: JoinStrategy) -> Self {
        Self {
            strategy,
            aliases: HashMap::new(),
        }
    }

    pub fn strategy(&self) -> JoinStrategy {
        self.strategy
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    fn key(&self, walked: &[String], target: &str) -> JoinKey {
        match self.strategy {
            JoinStrategy::Unkeyed => JoinKey::Entity(target.to_string()),
            JoinStrategy::PathKeyed => JoinKey::Path(walked.to_vec(), target.to_string()),
        }
    }
}

/// A path resolved to a concrete column.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    /// Qualified column reference (`alias.column`).
    pub expr: Expr,
    pub column_type: ColumnType,
    /// Whether reaching the column walked through at least one join.
    pub joined: bool,
}

/// Per-compilation state: the query being built plus its join registries.
pub struct CompileContext<'a> {
    schema: &'a dyn Introspect,
    root: &'a Entity,
    query: Query,
    unkeyed: JoinRegistry,
    path_keyed: JoinRegistry,
    alias_seq: usize,
}

impl<'a> CompileContext<'a> {
    /// Start a `SELECT <root>.* FROM <root>` query.
    pub fn new(schema: &'a dyn Introspect, root: &'a Entity) -> Self {
        let query = Query::new()
            .select(vec![table_star(&root.table)])
            .from(table_ref(root));
        Self {
            schema,
            root,
            query,
            unkeyed: JoinRegistry::new(JoinStrategy::Unkeyed),
            path_keyed: JoinRegistry::new(JoinStrategy::PathKeyed),
            alias_seq: 0,
        }
    }

    pub fn root(&self) -> &'a Entity {
        self.root
    }

    pub fn schema(&self) -> &'a dyn Introspect {
        self.schema
    }

    /// Reference to a column of the root table.
    pub fn root_column(&self, column: &str) -> Expr {
        table_col(&self.root.table, column)
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// AND a predicate into the WHERE clause.
    pub fn add_predicate(&mut self, predicate: Expr) {
        self.query = std::mem::take(&mut self.query).filter(predicate);
    }

    pub fn mark_distinct(&mut self) {
        self.query.distinct = true;
    }

    pub fn order_by(&mut self, item: OrderByExpr) {
        self.query.order_by.push(item);
    }

    pub fn join_count(&self) -> usize {
        self.query.joins.len()
    }

    pub fn registry(&self, strategy: JoinStrategy) -> &JoinRegistry {
        match strategy {
            JoinStrategy::Unkeyed => &self.unkeyed,
            JoinStrategy::PathKeyed => &self.path_keyed,
        }
    }

    /// Finish the query. Under DISTINCT every ordering expression outside
    /// the root table is also selected, as PostgreSQL and SQL Server require.
    pub fn into_query(mut self) -> Query {
        if self.query.distinct {
            let root = self.root.table.as_str();
            for item in &self.query.order_by {
                let on_root =
                    matches!(&item.expr, Expr::Column { table: Some(t), .. } if t == root);
                if !on_root && !self.query.select.contains(&item.expr) {
                    self.query.select.push(item.expr.clone());
                }
            }
        }
        self.query
    }

    /// Check that `path` names a column reachable from the root, without
    /// touching the query.
    pub fn locate(&self, path: &FieldPath) -> CompileResult<&'a Column> {
        let mut entity = self.root;
        for segment in path.relations() {
            entity = step(self.schema, path, entity, segment)?.1;
        }
        leaf(path, entity)
    }

    /// Resolve `path` to a column, creating or reusing joins as needed.
    pub fn resolve(
        &mut self,
        path: &FieldPath,
        strategy: JoinStrategy,
    ) -> CompileResult<ResolvedColumn> {
        let mut entity = self.root;
        let mut reference = self.root.table.clone();
        let mut walked: Vec<String> = Vec::with_capacity(path.relations().len());

        for segment in path.relations() {
            let (rel, target) = step(self.schema, path, entity, segment)?;
            walked.push(rel.name.clone());

            let key = self.registry(strategy).key(&walked, &target.name);
            let existing = self.registry(strategy).aliases.get(&key).cloned();
            let alias = match existing {
                Some(alias) => {
                    tracing::trace!(path = %path, alias = %alias, ?strategy, "reusing join");
                    alias
                }
                None => {
                    self.alias_seq += 1;
                    let alias = format!("{}_{}", target.table, self.alias_seq);
                    let on = table_col(&alias, &rel.remote_column)
                        .eq(table_col(&reference, &rel.local_column));
                    self.query
                        .joins
                        .push(Join::left(table_ref(target).with_alias(&alias), on));
                    tracing::trace!(path = %path, alias = %alias, ?strategy, "created join");
                    let registry = match strategy {
                        JoinStrategy::Unkeyed => &mut self.unkeyed,
                        JoinStrategy::PathKeyed => &mut self.path_keyed,
                    };
                    registry.aliases.insert(key, alias.clone());
                    alias
                }
            };

            entity = target;
            reference = alias;
        }

        let column = leaf(path, entity)?;
        Ok(ResolvedColumn {
            expr: table_col(&reference, &column.name),
            column_type: column.column_type.clone(),
            joined: path.is_nested(),
        })
    }
}

/// Follow one relationship segment from `entity`.
fn step<'a>(
    schema: &'a dyn Introspect,
    path: &FieldPath,
    entity: &'a Entity,
    segment: &str,
) -> CompileResult<(&'a Relationship, &'a Entity)> {
    let rel = match entity.attribute(segment) {
        Some(Attribute::Relationship(rel)) => rel,
        Some(Attribute::Column(_)) => {
            return Err(resolution(path, segment, entity, ResolutionReason::NotARelationship))
        }
        None => return Err(resolution(path, segment, entity, ResolutionReason::Unknown)),
    };
    let target = schema
        .entity(&rel.target)
        .ok_or_else(|| resolution(path, segment, entity, ResolutionReason::MissingTarget))?;
    Ok((rel, target))
}

fn leaf<'a>(path: &FieldPath, entity: &'a Entity) -> CompileResult<&'a Column> {
    match entity.attribute(path.column()) {
        Some(Attribute::Column(column)) => Ok(column),
        Some(Attribute::Relationship(_)) => {
            Err(resolution(path, path.column(), entity, ResolutionReason::NotAColumn))
        }
        None => Err(resolution(path, path.column(), entity, ResolutionReason::Unknown)),
    }
}

fn table_ref(entity: &Entity) -> TableRef {
    let table = TableRef::new(&entity.table);
    match &entity.schema {
        Some(schema) => table.with_schema(schema),
        None => table,
    }
}

fn resolution(
    path: &FieldPath,
    segment: &str,
    entity: &Entity,
    reason: ResolutionReason,
) -> CompileError {
    CompileError::Resolution {
        path: path.to_string(),
        segment: segment.to_string(),
        entity: entity.name.clone(),
        reason,
    }
}
