//! SQL generation module.
//!
//! A type-safe builder for the SELECT statements produced by the compiler:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations
//! - [`validate`] - sqlparser round-trip check of emitted SQL

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;
pub mod validate;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect, UnknownDialect};
pub use expr::{
    cast_text, col, func, lit_bool, lit_float, lit_int, lit_str, lit_timestamp, lower,
    table_col, table_star, BinaryOperator, Expr, ExprExt, Literal, UnaryOperator,
};
pub use query::{Join, OrderByExpr, Query, SortDir, TableRef};
pub use token::{Token, TokenStream};
pub use validate::{validate_sql, InvalidSql};
