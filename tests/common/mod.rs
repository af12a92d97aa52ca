//! Shared fixture: a small company schema.
//!
//! ```text
//! users ──role──▶ roles ──department──▶ departments ──head_role──▶ roles
//!   │ └─department──────────────────────▶ departments
//!   └──manager──▶ users
//! employees ──manager──▶ employees
//! ```

#![allow(dead_code)]

use sift::catalog::{QueryCatalog, QueryType};
use sift::compile::{CompileOptions, CompileOutput, QueryCompiler};
use sift::error::CompileResult;
use sift::params::QueryParams;
use sift::schema::{ColumnType, Entity, Schema};
use sift::sql::Dialect;

pub fn schema() -> Schema {
    Schema::new([
        Entity::new("departments")
            .column("id", ColumnType::Integer)
            .column("name", ColumnType::String)
            .column("code", ColumnType::String)
            .column("head_role_id", ColumnType::Integer)
            .relationship("head_role", "roles", "head_role_id", "id"),
        Entity::new("roles")
            .column("id", ColumnType::Integer)
            .column("name", ColumnType::String)
            .column("level", ColumnType::Integer)
            .column("department_id", ColumnType::Integer)
            .relationship("department", "departments", "department_id", "id"),
        Entity::new("users")
            .column("id", ColumnType::Integer)
            .column("name", ColumnType::String)
            .column("email", ColumnType::String)
            .column("age", ColumnType::Integer)
            .column("status", ColumnType::Enum)
            .column("is_active", ColumnType::Boolean)
            .column("score", ColumnType::Float)
            .column("created_at", ColumnType::DateTime)
            .column("deleted_at", ColumnType::DateTime)
            .column("preferences", ColumnType::Other("jsonb".into()))
            .column("role_id", ColumnType::Integer)
            .column("department_id", ColumnType::Integer)
            .column("manager_id", ColumnType::Integer)
            .relationship("role", "roles", "role_id", "id")
            .relationship("department", "departments", "department_id", "id")
            .relationship("manager", "users", "manager_id", "id"),
        Entity::new("employees")
            .column("id", ColumnType::Integer)
            .column("name", ColumnType::String)
            .column("hired_on", ColumnType::Date)
            .column("manager_id", ColumnType::Integer)
            .relationship("manager", "employees", "manager_id", "id"),
    ])
    .expect("fixture schema is valid")
}

pub fn users() -> QueryType {
    QueryType::new("users", "users")
}

pub fn compile(params: QueryParams) -> CompileResult<CompileOutput> {
    compile_with(users(), Dialect::Postgres, params)
}

pub fn compile_with(
    query_type: QueryType,
    dialect: Dialect,
    params: QueryParams,
) -> CompileResult<CompileOutput> {
    let schema = schema();
    let catalog = QueryCatalog::build(&schema, &query_type).expect("query type is valid");
    let compiler = QueryCompiler::new(&schema, CompileOptions::default().with_dialect(dialect));
    compiler.compile(&catalog, &params)
}

/// The WHERE clause of a rendered query, without the soft-delete prefix.
pub fn where_clause(sql: &str) -> &str {
    let clause = sql
        .split("\nWHERE ")
        .nth(1)
        .map(|rest| rest.split("\nORDER BY ").next().unwrap_or(rest))
        .unwrap_or("");
    let soft_delete = "\"users\".\"deleted_at\" IS NULL";
    if clause == soft_delete {
        return "";
    }
    clause
        .strip_prefix(soft_delete)
        .and_then(|rest| rest.strip_prefix(" AND "))
        .unwrap_or(clause)
}
