//! SQLite dialect.
//!
//! SQLite stores datetimes as ISO-8601 text, so timestamps are plain
//! strings and compare lexicographically. `LIKE` is already
//! case-insensitive for ASCII, but `LOWER()` keeps the behaviour uniform.

use super::helpers;
use super::SqlDialect;

/// SQLite dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn text_cast_type(&self) -> &'static str {
        "TEXT"
    }

    fn format_timestamp_literal(&self, timestamp: &str) -> String {
        helpers::timestamp_plain(timestamp)
    }
}
