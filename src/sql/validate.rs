//! Syntax check for emitted SQL.
//!
//! Parses rendered SQL back with sqlparser-rs under the matching dialect.
//! Used by the CLI's `--check` flag and throughout the test suite.

use sqlparser::dialect::{
    DuckDbDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect,
};
use sqlparser::parser::Parser;

use super::dialect::Dialect;

/// Emitted SQL that sqlparser rejects.
#[derive(Debug, thiserror::Error)]
#[error("Invalid SQL for {dialect}: {message}\nSQL: {sql}")]
pub struct InvalidSql {
    pub dialect: Dialect,
    pub message: String,
    pub sql: String,
}

/// Validates that a SQL string is syntactically valid for the given dialect.
///
/// # Example
///
/// ```ignore
/// use sift::sql::{validate_sql, Dialect};
///
/// validate_sql("SELECT * FROM users", Dialect::Postgres).unwrap();
/// ```
pub fn validate_sql(sql: &str, dialect: Dialect) -> Result<(), InvalidSql> {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::DuckDb => Box::new(DuckDbDialect {}),
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::TSql => Box::new(MsSqlDialect {}),
        Dialect::Sqlite => Box::new(SQLiteDialect {}),
    };

    Parser::parse_sql(&*parser_dialect, sql)
        .map(|_| ())
        .map_err(|e| InvalidSql {
            dialect,
            message: e.to_string(),
            sql: sql.to_string(),
        })
}
