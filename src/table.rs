//! # Route Table Module
//!
//! Declarative route tables: the same registrations [`RouterBuilder`] offers,
//! written as YAML, JSON or TOML.
//!
//! ```yaml
//! middleware: [global]
//! routes:
//!   - { method: GET, path: "", name: home }
//!   - { method: GET, path: "calendar/:year/?month/?day", name: calendar }
//! groups:
//!   - prefix: pages
//!     middleware: [pages]
//!     routes:
//!       - { method: GET, path: "", name: get_pages }
//!       - { method: POST, path: "", name: post_pages, middleware: [pages_post] }
//!     groups:
//!       - prefix: ":id"
//!         middleware: [pages_var]
//!         routes:
//!           - { method: GET, path: "", name: get_pages_id }
//! ```
//!
//! Within a group, its own routes are registered before its nested groups and
//! the group middleware is applied once the whole group has been registered,
//! exactly as a hand-written group body would do it.
//!
//! Handlers are strings: the declared `handler`, else the route `name`, else
//! `"{METHOD} {pattern}"`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{RouteError, TableError};
use crate::router::{join, parse_method, sanitize, Router, RouterBuilder, Scope};

/// Supported table encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
    /// `.toml`
    Toml,
}

impl TableFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(TableError::UnknownFormat(path.display().to_string())),
        }
    }
}

/// One route declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteEntry {
    /// HTTP method, any case
    pub method: String,
    /// Pattern relative to the enclosing group
    #[serde(default)]
    pub path: String,
    /// Handler reference
    #[serde(default)]
    pub handler: Option<String>,
    /// Unique route name for reverse routing
    #[serde(default)]
    pub name: Option<String>,
    /// Route-specific middleware
    #[serde(default)]
    pub middleware: Vec<String>,
}

/// A group declaration; may nest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupEntry {
    /// Prefix joined in front of every pattern in the group
    pub prefix: String,
    /// Middleware prepended to every route in the group
    #[serde(default)]
    pub middleware: Vec<String>,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

/// Whole route table document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteTable {
    /// Global middleware
    #[serde(default)]
    pub middleware: Vec<String>,
    /// Routes at the root scope
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    /// Top-level groups
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

impl RouteTable {
    /// Read and parse a table file; the format follows the extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let format = TableFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&text, format)?;
        info!(
            path = %path.display(),
            routes_count = table.route_count(),
            "Route table loaded"
        );
        Ok(table)
    }

    /// Parse a table from text
    pub fn parse(text: &str, format: TableFormat) -> Result<Self, TableError> {
        let table = match format {
            TableFormat::Yaml => serde_yaml::from_str(text)?,
            TableFormat::Json => serde_json::from_str(text)?,
            TableFormat::Toml => toml::from_str(text)?,
        };
        Ok(table)
    }

    /// Number of route declarations, nested groups included
    #[must_use]
    pub fn route_count(&self) -> usize {
        fn count(group: &GroupEntry) -> usize {
            group.routes.len() + group.groups.iter().map(count).sum::<usize>()
        }
        self.routes.len() + self.groups.iter().map(count).sum::<usize>()
    }

    /// Register everything and freeze the router.
    pub fn build(&self) -> Result<Router<String>, TableError> {
        let mut builder = RouterBuilder::new();
        builder.middleware(self.middleware.iter().cloned());

        for entry in &self.routes {
            let handler = entry.handler_for("");
            builder
                .add(&entry.method, &entry.path, handler, entry.name.as_deref())?
                .middleware(entry.middleware.iter().cloned());
        }
        for group in &self.groups {
            let prefix = sanitize(&group.prefix);
            builder
                .group(&group.prefix, |scope| register_group_body(scope, group, &prefix))?
                .middleware(group.middleware.iter().cloned());
        }

        Ok(builder.build())
    }
}

impl RouteEntry {
    fn handler_for(&self, prefix: &str) -> String {
        if let Some(handler) = self.handler.as_ref().or(self.name.as_ref()) {
            return handler.clone();
        }
        let method = parse_method(&self.method)
            .map(|m| m.to_string())
            .unwrap_or_else(|_| self.method.clone());
        format!("{method} {}", join(prefix, &self.path))
    }
}

fn register_group_body(
    scope: &mut Scope<'_, String>,
    group: &GroupEntry,
    prefix: &str,
) -> Result<(), RouteError> {
    for entry in &group.routes {
        let handler = entry.handler_for(prefix);
        scope
            .add(&entry.method, &entry.path, handler, entry.name.as_deref())?
            .middleware(entry.middleware.iter().cloned());
    }
    for child in &group.groups {
        let child_prefix = join(prefix, &child.prefix);
        scope
            .group(&child.prefix, |nested| {
                register_group_body(nested, child, &child_prefix)
            })?
            .middleware(child.middleware.iter().cloned());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};

    const YAML: &str = r#"
middleware: [global]
routes:
  - { method: get, path: "", name: home }
groups:
  - prefix: pages
    middleware: [pages]
    routes:
      - { method: GET, path: "" }
      - { method: POST, path: "", handler: create, middleware: [pages_post] }
    groups:
      - prefix: ":id"
        middleware: [pages_var]
        routes:
          - { method: GET, path: "", name: get_pages_id, middleware: [pages_var_get] }
"#;

    #[test]
    fn parses_and_builds_yaml() {
        let table = RouteTable::parse(YAML, TableFormat::Yaml).unwrap();
        assert_eq!(table.route_count(), 4);
        let router = table.build().unwrap();

        let home = router.dispatch(&Method::GET, "");
        assert_eq!(home.handler().map(String::as_str), Some("home"));
        assert_eq!(home.middleware, ["global"]);

        let post = router.dispatch(&Method::POST, "pages");
        assert_eq!(post.handler().map(String::as_str), Some("create"));
        assert_eq!(post.middleware, ["global", "pages", "pages_post"]);

        let index = router.dispatch(&Method::GET, "pages");
        assert_eq!(index.handler().map(String::as_str), Some("GET pages"));

        let show = router.dispatch(&Method::GET, "pages/7");
        assert_eq!(show.code, StatusCode::OK);
        assert_eq!(show.middleware, ["global", "pages", "pages_var", "pages_var_get"]);
        assert_eq!(router.path("get_pages_id", &[7]).unwrap(), "pages/7");
    }

    #[test]
    fn parses_toml_and_json() {
        let toml_text = r#"
middleware = ["g"]

[[routes]]
method = "GET"
path = "any/*"
name = "any"
"#;
        let table = RouteTable::parse(toml_text, TableFormat::Toml).unwrap();
        assert_eq!(table.routes[0].name.as_deref(), Some("any"));

        let json_text = r#"{"routes": [{"method": "PUT", "path": "a/:x"}]}"#;
        let table = RouteTable::parse(json_text, TableFormat::Json).unwrap();
        let router = table.build().unwrap();
        assert_eq!(
            router.dispatch(&Method::PUT, "a/1").handler().map(String::as_str),
            Some("PUT a/:x")
        );
    }

    #[test]
    fn surfaces_registration_errors() {
        let json_text = r#"{"routes": [
            {"method": "GET", "path": "a", "name": "x"},
            {"method": "GET", "path": "b", "name": "x"}
        ]}"#;
        let table = RouteTable::parse(json_text, TableFormat::Json).unwrap();
        assert!(matches!(
            table.build(),
            Err(TableError::Route(RouteError::NamedRouteExists(name))) if name == "x"
        ));
    }

    #[test]
    fn rejects_unknown_extensions() {
        assert!(matches!(
            TableFormat::from_path(Path::new("routes.ini")),
            Err(TableError::UnknownFormat(_))
        ));
        assert_eq!(TableFormat::from_path(Path::new("r.YML")).unwrap(), TableFormat::Yaml);
    }
}
