use std::sync::Arc;

use dashmap::DashMap;

use super::{CatalogError, QueryCatalog, QueryType};
use crate::schema::Introspect;

/// Memoized catalogs keyed by query-type name.
///
/// Each query type is computed once; concurrent registrations of the same
/// name publish a single value and every caller gets the same `Arc`.
#[derive(Debug, Default)]
pub struct CatalogRegistry {
    catalogs: DashMap<String, Arc<QueryCatalog>>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute (first call) or fetch the catalog for `query_type`.
    pub fn register(
        &self,
        schema: &dyn Introspect,
        query_type: &QueryType,
    ) -> Result<Arc<QueryCatalog>, CatalogError> {
        if let Some(existing) = self.catalogs.get(&query_type.name) {
            return Ok(Arc::clone(existing.value()));
        }
        let entry = self
            .catalogs
            .entry(query_type.name.clone())
            .or_try_insert_with(|| QueryCatalog::build(schema, query_type).map(Arc::new))?;
        Ok(Arc::clone(entry.value()))
    }

    pub fn get(&self, name: &str) -> Option<Arc<QueryCatalog>> {
        self.catalogs.get(name).map(|c| Arc::clone(c.value()))
    }

    /// Registered query-type names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.catalogs.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}
