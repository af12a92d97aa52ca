#[path = "../common/mod.rs"]
mod common;

use common::{compile, compile_with, schema, users, where_clause};
use sift::catalog::{QueryCatalog, QueryType};
use sift::compile::{CompileOptions, QueryCompiler};
use sift::error::{CompileError, ErrorKind};
use sift::params::QueryParams;
use sift::sql::Dialect;

#[test]
fn test_default_search_scope_for_numeric_term() {
    let output = compile(QueryParams::new().with_search("30")).unwrap();
    let clause = where_clause(&output.sql);

    assert!(clause.contains("\"users\".\"name\" ILIKE '%30%' ESCAPE '!'"));
    assert!(clause.contains("\"users\".\"email\" ILIKE '%30%' ESCAPE '!'"));
    assert!(clause.contains("CAST(\"users\".\"status\" AS VARCHAR) ILIKE '%30%' ESCAPE '!'"));
    assert!(clause.contains("\"users\".\"age\" = 30"));
    assert!(clause.contains("\"users\".\"id\" = 30"));
    assert!(!clause.contains("score"));
    assert!(!clause.contains("created_at"));
    assert!(!clause.contains("is_active"));
    assert_eq!(output.joins, 0);
    assert!(!output.query.distinct);
}

#[test]
fn test_default_search_text_term_skips_integers() {
    let output = compile(QueryParams::new().with_search("ali")).unwrap();
    assert_eq!(
        where_clause(&output.sql),
        "(\"users\".\"name\" ILIKE '%ali%' ESCAPE '!' \
         OR \"users\".\"email\" ILIKE '%ali%' ESCAPE '!' \
         OR CAST(\"users\".\"status\" AS VARCHAR) ILIKE '%ali%' ESCAPE '!')"
    );
}

#[test]
fn test_default_search_boolean_term() {
    let output = compile(QueryParams::new().with_search("False")).unwrap();
    assert!(output.sql.contains("\"users\".\"is_active\" = false"));
}

#[test]
fn test_search_is_anded_with_filters() {
    let output = compile(
        QueryParams::new()
            .with_filters(r#"{"age": {"$gte": 18}}"#)
            .with_search("ali")
            .with_search_fields("name"),
    )
    .unwrap();
    assert_eq!(
        where_clause(&output.sql),
        "\"users\".\"age\" >= 18 AND \"users\".\"name\" ILIKE '%ali%' ESCAPE '!'"
    );
}

#[test]
fn test_empty_search_term_is_no_search() {
    let output = compile(QueryParams::new().with_search("").with_search_fields("role.name")).unwrap();
    assert_eq!(where_clause(&output.sql), "");
    assert_eq!(output.joins, 0);
}

#[test]
fn test_explicit_paths_are_path_keyed() {
    let output = compile(
        QueryParams::new()
            .with_search("sales")
            .with_search_fields("department.name, role.department.name"),
    )
    .unwrap();

    assert_eq!(output.joins, 3);
    assert!(output.sql.contains(
        "LEFT OUTER JOIN \"departments\" AS \"departments_1\" \
         ON \"departments_1\".\"id\" = \"users\".\"department_id\""
    ));
    assert!(output.sql.contains(
        "LEFT OUTER JOIN \"departments\" AS \"departments_3\" \
         ON \"departments_3\".\"id\" = \"roles_2\".\"department_id\""
    ));
    assert_eq!(
        where_clause(&output.sql),
        "(\"departments_1\".\"name\" ILIKE '%sales%' ESCAPE '!' \
         OR \"departments_3\".\"name\" ILIKE '%sales%' ESCAPE '!')"
    );
}

#[test]
fn test_search_joins_do_not_reuse_filter_joins() {
    let output = compile(
        QueryParams::new()
            .with_filters(r#"{"role.level": {"$gt": 1}}"#)
            .with_search("dev")
            .with_search_fields("role.name"),
    )
    .unwrap();
    assert_eq!(output.joins, 2);
    assert!(output.sql.contains("\"roles_1\".\"level\" > 1"));
    assert!(output.sql.contains("\"roles_2\".\"name\" ILIKE '%dev%'"));
}

#[test]
fn test_distinct_only_when_search_joins() {
    let joined = compile(
        QueryParams::new()
            .with_search("x")
            .with_search_fields("name,role.name"),
    )
    .unwrap();
    assert!(joined.sql.starts_with("SELECT DISTINCT\n"));

    let root_only = compile(QueryParams::new().with_search("x").with_search_fields("name")).unwrap();
    assert!(!root_only.query.distinct);

    let filtered = compile(QueryParams::new().with_filters(r#"{"role.name": {"$eq": "x"}}"#))
        .unwrap();
    assert!(!filtered.query.distinct);
}

#[test]
fn test_distinct_selects_joined_sort_columns() {
    let output = compile(
        QueryParams::new()
            .with_search("a")
            .with_search_fields("role.name")
            .with_sort("role.name,name:desc"),
    )
    .unwrap();
    assert!(output.query.distinct);
    assert!(output.sql.starts_with(
        "SELECT DISTINCT\n  \"users\".*,\n  \"roles_2\".\"name\"\nFROM \"users\""
    ));
    assert!(output
        .sql
        .ends_with("ORDER BY \"roles_2\".\"name\" ASC, \"users\".\"name\" DESC"));

    // Root columns are already covered by the star.
    let root_sort = compile(
        QueryParams::new()
            .with_search("a")
            .with_search_fields("role.name")
            .with_sort("name"),
    )
    .unwrap();
    assert_eq!(root_sort.query.select.len(), 1);

    let plain = compile(QueryParams::new().with_sort("role.name")).unwrap();
    assert_eq!(plain.query.select.len(), 1);
}

#[test]
fn test_cycle_through_relationships_rejected() {
    let err = compile(
        QueryParams::new()
            .with_search("x")
            .with_search_fields("role.department.head_role.name"),
    )
    .unwrap_err();
    assert_eq!(
        err,
        CompileError::Cycle {
            path: "role.department.head_role.name".into(),
            entity: "roles".into(),
        }
    );
}

#[test]
fn test_self_reference_counts_root_as_visited() {
    let schema = schema();
    let catalog = QueryCatalog::build(&schema, &QueryType::new("employees", "employees")).unwrap();
    let compiler = QueryCompiler::new(&schema, CompileOptions::default());
    let err = compiler
        .compile(
            &catalog,
            &QueryParams::new()
                .with_search("x")
                .with_search_fields("manager.name"),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cycle);
}

#[test]
fn test_search_field_errors() {
    let kind = |fields: &str| {
        compile(QueryParams::new().with_search("x").with_search_fields(fields))
            .unwrap_err()
            .kind()
    };
    assert_eq!(kind("name,.email"), ErrorKind::Syntax);
    assert_eq!(kind("role.title"), ErrorKind::Resolution);
    assert_eq!(kind("bogus"), ErrorKind::Resolution);
    assert_eq!(kind("role"), ErrorKind::Resolution);
    assert_eq!(kind("preferences"), ErrorKind::Policy);
}

#[test]
fn test_scoped_search_exclusion() {
    let err = compile_with(
        users().exclude(["search:email"]),
        Dialect::Postgres,
        QueryParams::new().with_search("x").with_search_fields("email"),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Field 'email' is not searchable");

    let output = compile_with(
        users().exclude(["search:email"]),
        Dialect::Postgres,
        QueryParams::new().with_search("x"),
    )
    .unwrap();
    assert!(!output.sql.contains("email"));
}
