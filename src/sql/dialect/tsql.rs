//! T-SQL (SQL Server / Azure SQL) dialect.
//!
//! T-SQL differences from ANSI:
//! - Square bracket identifier quoting (`[name]`)
//! - No boolean literals (BIT 1/0)
//! - N'...' prefix for Unicode strings
//! - No `ILIKE`, no `TIMESTAMP '...'` literal

use super::helpers;
use super::SqlDialect;

/// T-SQL (SQL Server) dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        if !s.is_ascii() {
            helpers::quote_string_unicode(s)
        } else {
            helpers::quote_string_single(s)
        }
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn format_constant_predicate(&self, b: bool) -> &'static str {
        // no boolean literals in T-SQL predicates
        if b {
            "1 = 1"
        } else {
            "1 = 0"
        }
    }

    fn text_cast_type(&self) -> &'static str {
        "NVARCHAR(4000)"
    }

    fn format_timestamp_literal(&self, timestamp: &str) -> String {
        helpers::timestamp_iso_t(timestamp)
    }
}
