//! End-to-end compilation from query parameters to SQL.
//!
//! ```text
//! QueryParams → parse → catalog checks → resolve paths → Query → SQL
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sift::catalog::{CatalogRegistry, QueryType};
//! use sift::compile::{CompileOptions, QueryCompiler};
//! use sift::params::QueryParams;
//! use sift::sql::Dialect;
//!
//! let registry = CatalogRegistry::new();
//! let catalog = registry.register(&schema, &QueryType::new("users", "users"))?;
//! let compiler = QueryCompiler::new(&schema, CompileOptions::default().with_dialect(Dialect::Postgres));
//!
//! let params = QueryParams::new()
//!     .with_filters(r#"{"role.name": {"$eq": "admin"}}"#)
//!     .with_sort("name:asc");
//! let output = compiler.compile(&catalog, &params)?;
//! println!("{}", output.sql);
//! ```

use crate::catalog::{CatalogError, QueryCatalog};
use crate::error::CompileResult;
use crate::filter::compile_filter;
use crate::params::QueryParams;
use crate::resolve::CompileContext;
use crate::schema::Introspect;
use crate::search::compile_search;
use crate::sort::compile_sort;
use crate::sql::{Dialect, ExprExt, Query};

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// SQL dialect to generate.
    pub dialect: Dialect,
    /// Rows with this column set are hidden; `None` disables the check.
    pub soft_delete_column: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            soft_delete_column: Some("deleted_at".into()),
        }
    }
}

impl CompileOptions {
    /// Set the SQL dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_soft_delete_column(mut self, column: Option<&str>) -> Self {
        self.soft_delete_column = column.map(str::to_string);
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result of compiling query parameters.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// The generated SQL string.
    pub sql: String,

    /// The SQL query AST, for the caller to paginate or execute.
    pub query: Query,

    /// The dialect used for generation.
    pub dialect: Dialect,

    /// Number of joins added.
    pub joins: usize,
}

// ============================================================================
// Compiler
// ============================================================================

/// Compiles [`QueryParams`] against one schema.
pub struct QueryCompiler<'a> {
    schema: &'a dyn Introspect,
    options: CompileOptions,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(schema: &'a dyn Introspect, options: CompileOptions) -> Self {
        Self { schema, options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile `params` for the query type described by `catalog`.
    ///
    /// Any invalid clause rejects the whole specification.
    pub fn compile(
        &self,
        catalog: &QueryCatalog,
        params: &QueryParams,
    ) -> CompileResult<CompileOutput> {
        let result = self.build(catalog, params);
        if let Err(err) = &result {
            tracing::debug!(
                query_type = %catalog.query_type,
                kind = ?err.kind(),
                field = err.field().unwrap_or_default(),
                "rejected query specification: {}",
                err
            );
        }
        let query = result?;

        let sql = query.to_sql(self.options.dialect);
        let joins = query.joins.len();
        tracing::debug!(
            query_type = %catalog.query_type,
            entity = %catalog.entity,
            joins,
            distinct = query.distinct,
            dialect = %self.options.dialect,
            "compiled query"
        );

        Ok(CompileOutput {
            sql,
            query,
            dialect: self.options.dialect,
            joins,
        })
    }

    fn build(&self, catalog: &QueryCatalog, params: &QueryParams) -> CompileResult<Query> {
        let root = self
            .schema
            .entity(&catalog.entity)
            .ok_or_else(|| CatalogError::UnknownEntity {
                query_type: catalog.query_type.clone(),
                entity: catalog.entity.clone(),
            })?;
        let mut ctx = CompileContext::new(self.schema, root);

        if let Some(column) = self.options.soft_delete_column.as_deref() {
            if root.get_column(column).is_some() {
                let predicate = ctx.root_column(column).is_null();
                ctx.add_predicate(predicate);
            }
        }

        if let Some(tree) = params.filter_tree()? {
            if let Some(predicate) = compile_filter(&mut ctx, catalog, &tree)? {
                ctx.add_predicate(predicate);
            }
        }

        if let Some(term) = params.search.as_deref() {
            let fields = params.search_paths()?;
            if let Some(predicate) = compile_search(&mut ctx, catalog, term, fields.as_ref())? {
                ctx.add_predicate(predicate);
            }
        }

        compile_sort(&mut ctx, catalog, &params.sort_keys()?)?;

        Ok(ctx.into_query())
    }
}
