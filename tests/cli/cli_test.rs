use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;

fn sift() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sift");
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"))
        .env_remove("RUST_LOG")
        .env_remove("SIFT_CONFIG")
        .args(["--config", "demos/sift.toml"]);
    cmd
}

#[test]
fn compile_prints_checked_json() {
    let stdout = sift()
        .args(["compile", "--query-type", "users", "--output", "json", "--check"])
        .args(["--filters", r#"{"role.name": {"$eq": "admin"}}"#])
        .args(["--sort", "name:desc"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&stdout).expect("valid json");
    assert_eq!(json["query_type"], "users");
    assert_eq!(json["dialect"], "postgres");
    assert_eq!(json["joins"], 1);
    assert_eq!(json["distinct"], false);
    let sql = json["sql"].as_str().unwrap_or_default();
    assert!(sql.contains("\"roles_1\".\"name\" = 'admin'"));
    assert!(sql.ends_with("ORDER BY \"users\".\"name\" DESC"));
}

#[test]
fn compile_dialect_override() {
    let stdout = sift()
        .args(["compile", "--query-type", "staff", "--dialect", "tsql", "--check"])
        .args(["--filters", r#"{"manager.name": {"$eq": "Bo"}}"#])
        .args(["--search", "ann"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let sql = String::from_utf8(stdout).expect("utf8");
    assert!(sql.starts_with(
        "SELECT\n  [staff].*\nFROM [hr].[staff]\nLEFT OUTER JOIN [hr].[staff] AS [staff_1]"
    ));
    assert!(sql.contains("[staff_1].[name] = 'Bo'"));
    assert!(sql.contains("LOWER([staff].[name]) LIKE LOWER('%ann%') ESCAPE '!'"));
}

#[test]
fn compile_rejection_is_json_on_stderr() {
    let output = sift()
        .args(["compile", "--query-type", "users"])
        .args(["--filters", r#"{"email": {"$eq": "a@b.c"}}"#])
        .assert()
        .failure()
        .get_output()
        .clone();
    assert!(output.stdout.is_empty());
    let json: Value = serde_json::from_slice(&output.stderr).expect("valid json");
    assert_eq!(json["kind"], "policy");
    assert_eq!(json["field"], "email");
    assert_eq!(json["message"], "Field 'email' is not filterable");
}

#[test]
fn compile_unknown_field_is_resolution_rejection() {
    let stderr = sift()
        .args(["compile", "--query-type", "users", "--sort", "nickname"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let json: Value = serde_json::from_slice(&stderr).expect("valid json");
    assert_eq!(json["kind"], "resolution");
    assert_eq!(json["field"], "nickname");
}

#[test]
fn describe_applies_cli_exclusions() {
    let stdout = sift()
        .args(["describe", "--schema", "demos/company.toml", "--entity", "users"])
        .args(["--exclude", "filter:age"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&stdout).expect("valid json");
    let names = |key: &str| -> Vec<String> {
        json[key]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("name").unwrap_or(item).as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };
    assert_eq!(json["entity"], "users");
    assert!(!names("filterable_fields").contains(&"age".to_string()));
    assert!(names("filterable_fields").contains(&"name".to_string()));
    assert!(names("sortable_fields").contains(&"age".to_string()));
}

#[test]
fn describe_needs_a_target() {
    sift().arg("describe").assert().failure();
}

#[test]
fn validate_checks_schema_and_query_types() {
    let stdout = sift()
        .arg("validate")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(
        String::from_utf8(stdout).expect("utf8").trim(),
        "OK: 4 entities, 3 query types"
    );
}

#[test]
fn validate_reports_missing_schema() {
    sift()
        .args(["validate", "--schema", "demos/missing.toml"])
        .assert()
        .failure();
}
