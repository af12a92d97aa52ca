#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{schema, users};
use sift::catalog::{CatalogRegistry, QueryCatalog, QueryType};
use sift::filter::ComparisonOp;
use sift::schema::TypeCategory;

#[test]
fn test_users_catalog() {
    let catalog = QueryCatalog::build(&schema(), &users()).unwrap();
    let filterable: Vec<_> = catalog.filterable.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        filterable,
        vec![
            "age",
            "created_at",
            "deleted_at",
            "department_id",
            "email",
            "id",
            "is_active",
            "manager_id",
            "name",
            "role_id",
            "score",
            "status",
        ]
    );
    assert_eq!(catalog.sortable.len(), filterable.len());
    assert!(!catalog.is_searchable("preferences"));
}

#[test]
fn test_operator_sets_per_category() {
    let catalog = QueryCatalog::build(&schema(), &users()).unwrap();

    let status = catalog.field("status").unwrap();
    assert_eq!(status.category, TypeCategory::String);
    assert!(status.allows(ComparisonOp::Contains));

    let created = catalog.field("created_at").unwrap();
    assert_eq!(created.category, TypeCategory::Datetime);
    assert!(created.allows(ComparisonOp::IsAnyOf));
    assert!(!created.allows(ComparisonOp::Contains));

    let active = catalog.field("is_active").unwrap();
    assert!(!active.allows(ComparisonOp::Gt));
}

#[test]
fn test_datetime_operator_wording() {
    let catalog = QueryCatalog::build(&schema(), &users()).unwrap();
    let json = serde_json::to_value(catalog.field("created_at").unwrap()).unwrap();
    let gt = json["operators"]
        .as_array()
        .unwrap()
        .iter()
        .find(|op| op["name"] == "$gt")
        .unwrap();
    assert_eq!(gt["description"], "After");
    assert_eq!(json["type"], "datetime");
}

#[test]
fn test_only_and_exclude_combine() {
    let qt = QueryType::new("people", "users")
        .only(["name", "email", "age", "sort:age"])
        .exclude(["search:age", "email"]);
    let catalog = QueryCatalog::build(&schema(), &qt).unwrap();
    let filterable: Vec<_> = catalog.filterable.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(filterable, vec!["age", "name"]);
    assert_eq!(catalog.sortable, vec!["age"]);
    assert_eq!(catalog.searchable, vec!["name"]);
    assert!(catalog.search_scoped());
}

#[test]
fn test_registry_shares_catalogs() {
    let schema = schema();
    let registry = CatalogRegistry::new();
    let first = registry.register(&schema, &users()).unwrap();
    let second = registry
        .register(&schema, &QueryType::new("users", "users").exclude(["age"]))
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(second.field("age").is_some());
}
