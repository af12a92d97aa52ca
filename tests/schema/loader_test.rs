use std::path::PathBuf;

use sift::schema::{loader, ColumnType, Introspect, SchemaError, TypeCategory};

fn demo_schema_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/company.toml")
}

#[test]
fn test_load_demo_schema() {
    let schema = loader::from_file(demo_schema_path()).unwrap();
    assert_eq!(schema.len(), 4);

    let users = schema.entity("users").unwrap();
    assert_eq!(users.table, "users");
    assert_eq!(users.columns.len(), 13);
    assert_eq!(users.columns[0].name, "id");
    assert_eq!(
        users.get_column("preferences").unwrap().column_type,
        ColumnType::Other("jsonb".into())
    );
    assert_eq!(users.get_column("preferences").unwrap().column_type.category(), None);
    assert_eq!(
        users.get_column("status").unwrap().column_type.category(),
        Some(TypeCategory::String)
    );

    let manager = users.get_relationship("manager").unwrap();
    assert_eq!(manager.target, "users");
    assert_eq!(manager.local_column, "manager_id");
    assert_eq!(manager.remote_column, "id");
}

#[test]
fn test_table_and_schema_overrides() {
    let schema = loader::from_file(demo_schema_path()).unwrap();
    let employees = schema.entity("employees").unwrap();
    assert_eq!(employees.table, "staff");
    assert_eq!(employees.schema.as_deref(), Some("hr"));
}

#[test]
fn test_entities_are_ordered_by_name() {
    let schema = loader::from_file(demo_schema_path()).unwrap();
    let names: Vec<_> = schema.entities().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["departments", "employees", "roles", "users"]);
}

#[test]
fn test_relationship_to_missing_column_is_rejected() {
    let toml = r#"
[[entities]]
name = "users"
columns = [{ name = "id", type = "integer" }, { name = "role_id", type = "integer" }]
relationships = [{ name = "role", target = "roles", local = "role_id", remote = "uuid" }]

[[entities]]
name = "roles"
columns = [{ name = "id", type = "integer" }]
"#;
    let err = loader::from_toml_str(toml).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownJoinColumn { ref column, .. } if column == "roles.uuid"));
    assert_eq!(
        err.to_string(),
        "Relationship 'users.role' joins on unknown column 'roles.uuid'"
    );
}
