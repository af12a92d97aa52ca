#[path = "../common/mod.rs"]
mod common;

use common::{compile, compile_with, users, where_clause};
use serde_json::json;
use sift::error::ErrorKind;
use sift::params::QueryParams;
use sift::sql::Dialect;

fn filter_sql(filters: serde_json::Value) -> String {
    let output = compile(QueryParams::new().with_filter_tree(filters)).unwrap();
    where_clause(&output.sql).to_string()
}

fn filter_kind(filters: &str) -> ErrorKind {
    compile(QueryParams::new().with_filters(filters))
        .unwrap_err()
        .kind()
}

#[test]
fn test_join_reuse_is_idempotent() {
    let output = compile(QueryParams::new().with_filter_tree(json!({
        "$and": [
            {"role.name": {"$eq": "admin"}},
            {"role.level": {"$gte": 3}},
            {"role.name": {"$ne": "guest"}}
        ]
    })))
    .unwrap();

    assert_eq!(output.joins, 1);
    assert_eq!(output.sql.matches("LEFT OUTER JOIN \"roles\"").count(), 1);
    assert_eq!(
        where_clause(&output.sql),
        "\"roles_1\".\"name\" = 'admin' AND \"roles_1\".\"level\" >= 3 \
         AND \"roles_1\".\"name\" <> 'guest'"
    );
}

#[test]
fn test_unkeyed_joins_collapse_routes_to_one_entity() {
    let output = compile(QueryParams::new().with_filter_tree(json!({
        "department.name": {"$eq": "Sales"},
        "role.department.code": {"$eq": "S1"}
    })))
    .unwrap();

    // departments is reached twice but joined once
    assert_eq!(output.joins, 2);
    assert_eq!(output.sql.matches("\"departments\" AS").count(), 1);
}

#[test]
fn test_date_only_equality_widens_to_whole_day() {
    assert_eq!(
        filter_sql(json!({"created_at": {"$eq": "2024-01-15"}})),
        "\"users\".\"created_at\" >= TIMESTAMP '2024-01-15 00:00:00' \
         AND \"users\".\"created_at\" < TIMESTAMP '2024-01-16 00:00:00'"
    );
}

#[test]
fn test_date_only_lte_is_exclusive_next_day() {
    assert_eq!(
        filter_sql(json!({"created_at": {"$lte": "2024-01-15"}})),
        "\"users\".\"created_at\" < TIMESTAMP '2024-01-16 00:00:00'"
    );
}

#[test]
fn test_date_ne_inside_and_keeps_grouping() {
    assert_eq!(
        filter_sql(json!({
            "age": {"$gt": 20},
            "created_at": {"$ne": "2024-01-15"}
        })),
        "\"users\".\"age\" > 20 AND (\"users\".\"created_at\" < TIMESTAMP '2024-01-15 00:00:00' \
         OR \"users\".\"created_at\" >= TIMESTAMP '2024-01-16 00:00:00')"
    );
}

#[test]
fn test_datetime_with_time_is_exact() {
    assert_eq!(
        filter_sql(json!({"created_at": {"$gt": "2024-01-15T08:00:00"}})),
        "\"users\".\"created_at\" > TIMESTAMP '2024-01-15 08:00:00'"
    );
}

#[test]
fn test_empty_string_equality_is_null_check() {
    assert_eq!(
        filter_sql(json!({"email": {"$eq": ""}})),
        "\"users\".\"email\" IS NULL"
    );
    assert_eq!(
        filter_sql(json!({"email": {"$ne": ""}})),
        "\"users\".\"email\" IS NOT NULL"
    );
}

#[test]
fn test_contains_on_enum_casts() {
    assert_eq!(
        filter_sql(json!({"status": {"$contains": "act"}})),
        "CAST(\"users\".\"status\" AS VARCHAR) ILIKE '%act%' ESCAPE '!'"
    );
}

#[test]
fn test_contains_without_ilike() {
    let output = compile_with(
        users(),
        Dialect::MySql,
        QueryParams::new().with_filters(r#"{"name": {"$contains": "50%"}}"#),
    )
    .unwrap();
    assert!(output
        .sql
        .contains("LOWER(`users`.`name`) LIKE LOWER('%50!%%') ESCAPE '!'"));
}

#[test]
fn test_not_and_or_nesting() {
    assert_eq!(
        filter_sql(json!({
            "$not": {
                "$or": [
                    {"status": {"$in": ["banned", "suspended"]}},
                    {"is_active": {"$eq": false}}
                ]
            }
        })),
        "NOT (\"users\".\"status\" IN ('banned', 'suspended') OR \"users\".\"is_active\" = false)"
    );
}

#[test]
fn test_is_any_of() {
    assert_eq!(
        filter_sql(json!({"age": {"$isanyof": [30, 40]}})),
        "\"users\".\"age\" = 30 OR \"users\".\"age\" = 40"
    );
}

#[test]
fn test_filter_errors_are_classified() {
    assert_eq!(filter_kind("not json"), ErrorKind::Syntax);
    assert_eq!(filter_kind(r#"{"$nor": []}"#), ErrorKind::Syntax);
    assert_eq!(filter_kind(r#"{"age": {"$near": 3}}"#), ErrorKind::Syntax);
    assert_eq!(filter_kind(r#"{"age": 3}"#), ErrorKind::OperandType);
    assert_eq!(filter_kind(r#"{"age": {"$in": 3}}"#), ErrorKind::OperandType);
    assert_eq!(filter_kind(r#"{"age": {"$contains": "3"}}"#), ErrorKind::Policy);
    assert_eq!(filter_kind(r#"{"preferences": {"$eq": "x"}}"#), ErrorKind::Policy);
    assert_eq!(filter_kind(r#"{"role.title": {"$eq": "x"}}"#), ErrorKind::Resolution);
    assert_eq!(filter_kind(r#"{"role": {"$eq": "x"}}"#), ErrorKind::Resolution);
    assert_eq!(filter_kind(r#"{"bogus": {"$eq": 1}}"#), ErrorKind::Resolution);
    assert_eq!(filter_kind(r#"{"role.department": {"$eq": 1}}"#), ErrorKind::Resolution);
    assert_eq!(filter_kind(r#"{"created_at": {"$gt": "tomorrow"}}"#), ErrorKind::Syntax);
    assert_eq!(filter_kind(r#"{"created_at": {"$gt": 5}}"#), ErrorKind::OperandType);
}

#[test]
fn test_resolution_error_names_path_segment_and_entity() {
    let err = compile(QueryParams::new().with_filters(r#"{"role.department.title": {"$eq": 1}}"#))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot resolve 'role.department.title': unknown field 'title' on entity 'departments'"
    );
    assert_eq!(err.field(), Some("role.department.title"));
}

#[test]
fn test_null_filter_tree_is_ignored() {
    let output = compile(QueryParams::new().with_filter_tree(serde_json::Value::Null)).unwrap();
    assert_eq!(where_clause(&output.sql), "");
}
