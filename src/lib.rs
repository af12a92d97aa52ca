//! # sift
//!
//! Compiles declarative filter, sort and search specifications into SQL
//! against a relational entity graph.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │   QueryParams (filters JSON, sort, search, fields)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [filter / sort / search parsers]
//! ┌─────────────────────────────────────────────────────────┐
//! │   FilterNode tree, SortKey list, SearchPaths             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [catalog: allow-lists + operators]
//!                          ▼ [resolve: paths → joins]
//! ┌─────────────────────────────────────────────────────────┐
//! │   sql::Query (WHERE, LEFT OUTER JOINs, ORDER BY)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [dialect]
//!                         SQL
//! ```
//!
//! The entity graph comes from anything implementing
//! [`schema::Introspect`]; [`schema::Schema`] is the built-in implementation.

pub mod catalog;
pub mod compile;
pub mod config;
pub mod error;
pub mod filter;
pub mod params;
pub mod path;
pub mod resolve;
pub mod schema;
pub mod search;
pub mod sort;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{CatalogRegistry, QueryCatalog, QueryType};
    pub use crate::compile::{CompileOptions, CompileOutput, QueryCompiler};
    pub use crate::error::{CompileError, CompileResult, ErrorKind, Rejection};
    pub use crate::filter::{ComparisonOp, FilterNode, LogicalOp};
    pub use crate::params::QueryParams;
    pub use crate::path::FieldPath;
    pub use crate::schema::{ColumnType, Entity, Introspect, Schema, TypeCategory};
    pub use crate::sort::{SortDirection, SortField};
    pub use crate::sql::{Dialect, Query};
}

// Also export at crate root for convenience
pub use compile::{CompileOptions, CompileOutput, QueryCompiler};
pub use error::{CompileError, CompileResult};
pub use sql::Dialect;
