#[path = "../common/mod.rs"]
mod common;

use common::{compile_with, users};
use insta::assert_snapshot;
use serde_json::json;
use sift::params::QueryParams;
use sift::sql::{validate_sql, Dialect};

fn params() -> QueryParams {
    QueryParams::new()
        .with_filter_tree(json!({
            "created_at": {"$gte": "2024-01-01"},
            "role.name": {"$contains": "ad"}
        }))
        .with_sort("name:desc")
}

#[test]
fn test_compiled_sql_parses_in_every_dialect() {
    let variants = [
        params(),
        QueryParams::new()
            .with_filters(r#"{"$or": [{"is_active": {"$eq": true}}, {"age": {"$in": []}}]}"#)
            .with_search("ops")
            .with_search_fields("name,role.department.name"),
        QueryParams::new()
            .with_filters(r#"{"status": {"$ncontains": "x_y"}, "score": {"$lt": 2.5}}"#)
            .with_search("42"),
    ];

    for dialect in Dialect::ALL {
        for params in &variants {
            let output = compile_with(users(), dialect, params.clone()).unwrap();
            assert_eq!(output.dialect, dialect);
            validate_sql(&output.sql, dialect).unwrap();
        }
    }
}

#[test]
fn test_postgres_rendering() {
    let output = compile_with(users(), Dialect::Postgres, params()).unwrap();
    assert_snapshot!(&output.sql, @r#"
SELECT
  "users".*
FROM "users"
LEFT OUTER JOIN "roles" AS "roles_1" ON "roles_1"."id" = "users"."role_id"
WHERE "users"."deleted_at" IS NULL AND "users"."created_at" >= TIMESTAMP '2024-01-01 00:00:00' AND "roles_1"."name" ILIKE '%ad%' ESCAPE '!'
ORDER BY "users"."name" DESC
"#);
    validate_sql(&output.sql, Dialect::Postgres).unwrap();
}

#[test]
fn test_tsql_rendering() {
    let output = compile_with(users(), Dialect::TSql, params()).unwrap();
    assert_snapshot!(&output.sql, @r#"
SELECT
  [users].*
FROM [users]
LEFT OUTER JOIN [roles] AS [roles_1] ON [roles_1].[id] = [users].[role_id]
WHERE [users].[deleted_at] IS NULL AND [users].[created_at] >= '2024-01-01T00:00:00' AND LOWER([roles_1].[name]) LIKE LOWER('%ad%') ESCAPE '!'
ORDER BY [users].[name] DESC
"#);
    validate_sql(&output.sql, Dialect::TSql).unwrap();
}

#[test]
fn test_enum_cast_follows_dialect() {
    let filters = r#"{"status": {"$contains": "act"}}"#;
    let cast = |dialect| {
        compile_with(users(), dialect, QueryParams::new().with_filters(filters))
            .unwrap()
            .sql
    };
    assert!(cast(Dialect::DuckDb).contains("CAST(\"users\".\"status\" AS VARCHAR) ILIKE"));
    assert!(cast(Dialect::TSql).contains("CAST([users].[status] AS NVARCHAR(4000))"));
    assert!(cast(Dialect::Sqlite).contains("LOWER(CAST(\"users\".\"status\" AS TEXT)) LIKE"));
}

#[test]
fn test_boolean_literals_follow_dialect() {
    let filters = r#"{"is_active": {"$eq": true}}"#;
    let sql = |dialect| {
        compile_with(users(), dialect, QueryParams::new().with_filters(filters))
            .unwrap()
            .sql
    };
    assert!(sql(Dialect::Postgres).contains("\"users\".\"is_active\" = true"));
    assert!(sql(Dialect::TSql).contains("[users].[is_active] = 1"));
}
