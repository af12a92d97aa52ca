use std::path::PathBuf;

use sift::catalog::QueryCatalog;
use sift::compile::QueryCompiler;
use sift::config::{Settings, SettingsError};
use sift::params::QueryParams;
use sift::schema::loader;
use sift::sql::Dialect;

fn demo(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(file)
}

fn demo_settings() -> Settings {
    Settings::from_file(demo("sift.toml")).unwrap()
}

#[test]
fn test_load_demo_settings() {
    let settings = demo_settings();
    assert_eq!(settings.compiler.dialect, Dialect::Postgres);
    assert_eq!(settings.logging.filter, "sift=info");
    assert_eq!(
        settings.schema_path().unwrap(),
        Some(PathBuf::from("demos/company.toml"))
    );
    let names: Vec<_> = settings.query_types.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["directory", "staff", "users"]);
}

#[test]
fn test_registry_from_demo_files() {
    let settings = demo_settings();
    let schema = loader::from_file(demo("company.toml")).unwrap();
    let registry = settings.registry(&schema).unwrap();
    assert_eq!(registry.names(), vec!["directory", "staff", "users"]);

    let users = registry.get("users").unwrap();
    assert!(users.field("email").is_none());
    assert!(!users.is_sortable("email"));
    assert!(users.is_searchable("email"));
    assert!(users.field("preferences").is_none());

    let directory = registry.get("directory").unwrap();
    let filterable: Vec<_> = directory.filterable.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(filterable, vec!["email", "name"]);
    assert_eq!(directory.searchable, vec!["email", "name"]);
    assert!(directory.search_scoped());
}

#[test]
fn test_compile_with_configured_query_type() {
    let settings = demo_settings();
    let schema = loader::from_file(demo("company.toml")).unwrap();
    let catalog = QueryCatalog::build(&schema, &settings.query_type("staff").unwrap()).unwrap();
    let compiler = QueryCompiler::new(&schema, settings.compile_options());

    let output = compiler
        .compile(
            &catalog,
            &QueryParams::new()
                .with_filters(r#"{"hired_on": {"$gt": "2023-12-31"}}"#)
                .with_sort("manager.name"),
        )
        .unwrap();

    // employees has no deleted_at column, so no soft-delete check
    assert_eq!(
        output.sql,
        "SELECT\n  \"staff\".*\nFROM \"hr\".\"staff\"\n\
         LEFT OUTER JOIN \"hr\".\"staff\" AS \"staff_1\" ON \"staff_1\".\"id\" = \"staff\".\"manager_id\"\n\
         WHERE \"staff\".\"hired_on\" >= TIMESTAMP '2024-01-01 00:00:00'\n\
         ORDER BY \"staff_1\".\"name\" ASC"
    );
}

#[test]
fn test_unknown_query_type() {
    let err = demo_settings().query_type("ghosts").unwrap_err();
    assert!(matches!(err, SettingsError::QueryTypeNotFound(ref n) if n == "ghosts"));
}

#[test]
fn test_missing_config_file() {
    let err = Settings::from_file(demo("missing.toml")).unwrap_err();
    assert!(matches!(err, SettingsError::FileNotFound(_)));
}
