//! Per-query-type field catalogs.
//!
//! A [`QueryCatalog`] says which fields of an entity may be filtered, sorted
//! and searched, and which operators each filterable field accepts. Catalogs
//! are computed from the schema and a [`QueryType`] and memoized in a
//! [`CatalogRegistry`].

mod policy;
mod registry;

use std::collections::BTreeSet;

use serde::Serialize;

pub use policy::QueryType;
pub use registry::CatalogRegistry;

use crate::error::{Capability, CompileError, CompileResult};
use crate::filter::ComparisonOp;
use crate::path::FieldPath;
use crate::schema::{Introspect, TypeCategory};
use policy::FieldPolicy;

/// Errors building a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Query type '{query_type}' refers to unknown entity '{entity}'")]
    UnknownEntity { query_type: String, entity: String },
}

/// An operator as offered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorInfo {
    pub name: ComparisonOp,
    pub description: &'static str,
}

/// A filterable column with its category and operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub category: TypeCategory,
    pub operators: Vec<OperatorInfo>,
}

impl FieldInfo {
    fn new(name: &str, category: TypeCategory) -> Self {
        Self {
            name: name.to_string(),
            category,
            operators: ComparisonOp::allowed_for(category)
                .iter()
                .map(|&op| OperatorInfo {
                    name: op,
                    description: op.description(category),
                })
                .collect(),
        }
    }

    pub fn allows(&self, op: ComparisonOp) -> bool {
        self.operators.iter().any(|info| info.name == op)
    }
}

/// What a query type exposes for filtering, sorting and searching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryCatalog {
    pub query_type: String,
    pub entity: String,
    #[serde(rename = "filterable_fields")]
    pub filterable: Vec<FieldInfo>,
    #[serde(rename = "sortable_fields")]
    pub sortable: Vec<String>,
    #[serde(rename = "searchable_fields")]
    pub searchable: Vec<String>,
    #[serde(skip)]
    policy: FieldPolicy,
}

impl QueryCatalog {
    /// Compute the catalog for `query_type` against `schema`.
    ///
    /// Names in `only`/`exclude` that match nothing are not an error; they
    /// just leave the corresponding lists empty.
    pub fn build(schema: &dyn Introspect, query_type: &QueryType) -> Result<Self, CatalogError> {
        let entity = schema
            .entity(&query_type.entity)
            .ok_or_else(|| CatalogError::UnknownEntity {
                query_type: query_type.name.clone(),
                entity: query_type.entity.clone(),
            })?;

        let all_fields: BTreeSet<String> = entity
            .columns
            .iter()
            .map(|c| c.name.clone())
            .chain(entity.relationships.iter().map(|r| r.name.clone()))
            .collect();
        let policy = FieldPolicy::new(all_fields, query_type);

        let mut filterable = Vec::new();
        let mut sortable = Vec::new();
        let mut searchable = Vec::new();

        for name in &policy.base {
            let Some(category) = entity.get_column(name).and_then(|c| c.column_type.category())
            else {
                continue;
            };
            if policy.filter.contains(name) {
                filterable.push(FieldInfo::new(name, category));
            }
            if policy.sort.contains(name) {
                sortable.push(name.clone());
            }
            if policy.search.contains(name) {
                searchable.push(name.clone());
            }
        }

        tracing::debug!(
            query_type = %query_type.name,
            entity = %entity.name,
            filterable = filterable.len(),
            sortable = sortable.len(),
            searchable = searchable.len(),
            search_scoped = policy.search_scoped,
            "built query catalog"
        );

        Ok(Self {
            query_type: query_type.name.clone(),
            entity: entity.name.clone(),
            filterable,
            sortable,
            searchable,
            policy,
        })
    }

    /// The filterable column named `name`.
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.filterable.iter().find(|f| f.name == name)
    }

    pub fn is_sortable(&self, name: &str) -> bool {
        self.sortable.iter().any(|s| s == name)
    }

    pub fn is_searchable(&self, name: &str) -> bool {
        self.searchable.iter().any(|s| s == name)
    }

    /// Whether search was restricted with `search:`-scoped entries.
    pub fn search_scoped(&self) -> bool {
        self.policy.search_scoped
    }

    /// Whether `path` may be used for `capability`.
    ///
    /// A root path must name a listed column. A nested path is allowed when
    /// its first relationship survives the capability's only/exclude; the
    /// remaining segments are only checked by resolution.
    pub fn allows(&self, capability: Capability, path: &FieldPath) -> bool {
        if path.is_nested() {
            return self.policy.allows(capability, path.head());
        }
        match capability {
            Capability::Filter => self.field(path.column()).is_some(),
            Capability::Sort => self.is_sortable(path.column()),
            Capability::Search => self.is_searchable(path.column()),
        }
    }

    /// Fail with a policy error when `path` is not allowed for `capability`.
    pub fn check(&self, capability: Capability, path: &FieldPath) -> CompileResult<()> {
        if self.allows(capability, path) {
            Ok(())
        } else {
            Err(CompileError::Policy {
                capability,
                field: path.to_string(),
                operator: None,
            })
        }
    }
}
