use http::{Method, StatusCode};
use std::io::Write;
use std::sync::Arc;
use trellis::reload::SharedRouter;
use trellis::table::{RouteTable, TableFormat};
use trellis::TableError;

fn write_table(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const TOML_TABLE: &str = r#"
middleware = ["global"]

[[routes]]
method = "get"
path = "files/*path"
name = "files"

[[groups]]
prefix = "admin"
middleware = ["auth"]

[[groups.routes]]
method = "GET"
path = "users/:id"
name = "admin_user"
middleware = ["audit"]
"#;

#[test]
fn test_load_toml_table_from_disk() {
    let file = write_table(".toml", TOML_TABLE);
    let table = RouteTable::load(file.path()).unwrap();
    assert_eq!(table.route_count(), 2);
    let router = table.build().unwrap();

    let result = router.dispatch(&Method::GET, "admin/users/9");
    assert_eq!(result.code, StatusCode::OK);
    assert_eq!(result.middleware, ["global", "auth", "audit"]);

    let files = router.dispatch(&Method::GET, "files/a/b.txt");
    assert_eq!(files.parameters.len(), 2);
    assert_eq!(
        router
            .path_value("files", &serde_json::json!({"path": ["a", "b.txt"]}))
            .unwrap(),
        "files/a/b.txt"
    );
}

#[test]
fn test_load_json_table_from_disk() {
    let file = write_table(
        ".json",
        r#"{"groups": [{"prefix": "v1", "routes": [{"method": "DELETE", "path": "items/:id"}]}]}"#,
    );
    let router = RouteTable::load(file.path()).unwrap().build().unwrap();
    let result = router.dispatch(&Method::GET, "v1/items/3");
    assert_eq!(result.code, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(result.options, [Method::DELETE]);
}

#[test]
fn test_malformed_tables_are_reported() {
    let file = write_table(".yaml", "routes: [ { method: GET, path: 'a', colour: red } ]");
    assert!(matches!(RouteTable::load(file.path()), Err(TableError::Yaml(_))));

    let file = write_table(".yaml", "routes: [ { method: GET, path: 'a/*/b' } ]");
    assert!(matches!(
        RouteTable::load(file.path()).unwrap().build(),
        Err(TableError::Route(trellis::RouteError::InvalidWildcardParameter))
    ));

    assert!(matches!(
        RouteTable::load("/definitely/not/here.yaml"),
        Err(TableError::Io { .. })
    ));
}

#[test]
fn test_reload_swaps_only_on_success() {
    let file = write_table(".yaml", "routes: [ { method: GET, path: old } ]");
    let router = RouteTable::load(file.path()).unwrap().build().unwrap();
    let shared = Arc::new(SharedRouter::new(router));

    std::fs::write(file.path(), "routes: [ { method: GET, path: new } ]").unwrap();
    assert_eq!(shared.reload_from(file.path()).unwrap(), 1);
    assert_eq!(shared.load().dispatch(&Method::GET, "new").code, StatusCode::OK);

    std::fs::write(file.path(), "routes: [ { method: GET, path: ':' } ]").unwrap();
    assert!(shared.reload_from(file.path()).is_err());
    assert_eq!(shared.load().dispatch(&Method::GET, "new").code, StatusCode::OK);
}

#[test]
fn test_tables_round_trip_through_serde() {
    let table = RouteTable::parse(TOML_TABLE, TableFormat::Toml).unwrap();
    let yaml = serde_yaml::to_string(&table).unwrap();
    assert_eq!(RouteTable::parse(&yaml, TableFormat::Yaml).unwrap(), table);
}
