#[path = "../common/mod.rs"]
mod common;

use common::{compile, compile_with, users};
use sift::error::ErrorKind;
use sift::params::QueryParams;
use sift::sort::{SortDirection, SortField};
use sift::sql::Dialect;

fn order_by(sql: &str) -> &str {
    sql.split("\nORDER BY ").nth(1).unwrap_or("")
}

#[test]
fn test_text_sort_in_order() {
    let output = compile(QueryParams::new().with_sort("age:DESC, ,name")).unwrap();
    assert_eq!(
        order_by(&output.sql),
        "\"users\".\"age\" DESC, \"users\".\"name\" ASC"
    );
}

#[test]
fn test_empty_direction_defaults_to_asc() {
    let output = compile(QueryParams::new().with_sort("name:, age : ")).unwrap();
    assert_eq!(
        order_by(&output.sql),
        "\"users\".\"name\" ASC, \"users\".\"age\" ASC"
    );
}

#[test]
fn test_structured_sort() {
    let output = compile(QueryParams::new().with_sort_fields(vec![
        SortField {
            field: "role.department.name".into(),
            direction: SortDirection::Asc,
        },
        SortField {
            field: "created_at".into(),
            direction: SortDirection::Desc,
        },
    ]))
    .unwrap();
    assert_eq!(
        order_by(&output.sql),
        "\"departments_2\".\"name\" ASC, \"users\".\"created_at\" DESC"
    );
    assert_eq!(output.joins, 2);
}

#[test]
fn test_sort_reuses_filter_join() {
    let output = compile(
        QueryParams::new()
            .with_filters(r#"{"role.name": {"$ne": "guest"}}"#)
            .with_sort("role.level:desc"),
    )
    .unwrap();
    assert_eq!(output.joins, 1);
    assert_eq!(order_by(&output.sql), "\"roles_1\".\"level\" DESC");
}

#[test]
fn test_scoped_exclude_round_trip() {
    let restricted = || users().exclude(["filter:age"]);

    let err = compile_with(
        restricted(),
        Dialect::Postgres,
        QueryParams::new().with_filters(r#"{"age": {"$gt": 30}}"#),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Policy);
    assert_eq!(err.field(), Some("age"));

    let output = compile_with(restricted(), Dialect::Postgres, QueryParams::new().with_sort("age"))
        .unwrap();
    assert_eq!(order_by(&output.sql), "\"users\".\"age\" ASC");
}

#[test]
fn test_sort_errors() {
    let kind = |sort: &str| compile(QueryParams::new().with_sort(sort)).unwrap_err().kind();
    assert_eq!(kind("name:up"), ErrorKind::Syntax);
    assert_eq!(kind("role..name"), ErrorKind::Syntax);
    assert_eq!(kind("nickname"), ErrorKind::Resolution);
    assert_eq!(kind("role"), ErrorKind::Resolution);
    assert_eq!(kind("role.nickname"), ErrorKind::Resolution);
    assert_eq!(kind("preferences"), ErrorKind::Policy);
}
