//! # trellis
//!
//! **trellis** matches an incoming `(method, path)` pair against a table of
//! registered URL patterns and returns a dispatch decision: the matched
//! handler with its captured parameters and resolved middleware, or a
//! `404`/`405` outcome. It also rebuilds concrete paths from named routes.
//!
//! The crate never performs I/O on the dispatch path and never runs a handler;
//! a [`Dispatch`] is plain data for the caller to act on.
//!
//! ## Architecture
//!
//! - **[`router`]** - pattern parsing, the segment trie, routes, groups and
//!   dispatch outcomes
//! - **[`table`]** - declarative route tables in YAML, JSON or TOML
//! - **[`reload`]** - atomically swappable routers and table file watching
//! - **[`cli`]** - the `trellis` command-line tool
//! - **[`error`]** - registration, path generation and table errors
//!
//! ```mermaid
//! sequenceDiagram
//!     participant App
//!     participant Builder as RouterBuilder
//!     participant Tree as Segment trie
//!     participant Router
//!
//!     App->>Builder: get / post / group(prefix, body)
//!     Builder->>Tree: classify segments, insert
//!     App->>Builder: Group::middleware(names)
//!     App->>Builder: build()
//!     Builder-->>Router: frozen table
//!     App->>Router: dispatch(GET, "pages/5")
//!     Router->>Tree: depth-first search
//!     Tree-->>Router: first hit per method
//!     Router-->>App: Dispatch { code: 200, parameters, middleware }
//!     App->>Router: path("page", ["5"])
//!     Router-->>App: "pages/5"
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use trellis::RouterBuilder;
//!
//! let mut builder = RouterBuilder::new();
//! builder.middleware(["session"]);
//! builder.get("", "home", Some("home"))?;
//! builder
//!     .group("pages", |g| {
//!         g.get("", "list_pages", Some("pages"))?;
//!         g.get(":id", "show_page", Some("page"))?.middleware(["load_page"]);
//!         g.put(":id", "update_page", None)?;
//!         Ok(())
//!     })?
//!     .middleware(["auth"]);
//! builder.get("calendar/:year/?month/?day", "calendar", Some("calendar"))?;
//! let router = builder.build();
//!
//! let outcome = router.dispatch(&Method::GET, "/pages/42");
//! assert_eq!(outcome.code, StatusCode::OK);
//! assert_eq!(outcome.handler(), Some(&"show_page"));
//! assert_eq!(outcome.parameters[0].as_deref(), Some("42"));
//! assert_eq!(outcome.middleware, ["session", "auth", "load_page"]);
//!
//! let outcome = router.dispatch(&Method::DELETE, "pages/42");
//! assert_eq!(outcome.code, StatusCode::METHOD_NOT_ALLOWED);
//! assert_eq!(outcome.options, [Method::GET, Method::PUT]);
//!
//! assert_eq!(router.path("calendar", &[2020, 12])?, "calendar/2020/12");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Logging
//!
//! Registration and dispatch emit `tracing` events at `debug` level; freezing
//! a router and reloading a table are logged at `info`.

pub mod cli;
pub mod error;
pub mod reload;
pub mod router;
pub mod table;

pub use error::{PathError, RouteError, TableError};
pub use router::{Dispatch, Group, Route, RouteId, RouteMut, Router, RouterBuilder, Scope, Segment};
