//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features used by compiled list queries:
//! - ANSI identifier quoting (`"`)
//! - Native boolean type (true/false)
//! - Native `ILIKE`
//! - `TIMESTAMP '...'` typed literals

use super::helpers;
use super::SqlDialect;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn supports_ilike(&self) -> bool {
        true
    }
}
