//! # Router Module
//!
//! Matches a `(method, path)` pair against registered URL patterns and
//! rebuilds concrete paths from named routes.
//!
//! ## Pattern syntax
//!
//! Patterns are `/`-separated tokens:
//!
//! - `pages` matches the literal text
//! - `:id` captures exactly one segment
//! - `?tab` captures one segment or nothing; only optional segments or a
//!   wildcard may follow it
//! - `*rest` (the name may be omitted) captures every remaining segment and
//!   must be last
//!
//! ## Architecture
//!
//! 1. **Registration**: [`RouterBuilder`] classifies each pattern once into
//!    [`Segment`]s and inserts it into a segment trie. Groups collect the
//!    routes created in their body and prepend middleware to them afterwards.
//!
//! 2. **Freeze**: [`RouterBuilder::build`] hands the tree to an immutable
//!    [`Router`].
//!
//! 3. **Dispatch**: [`Router::dispatch`] walks the trie depth first and
//!    derives a [`Dispatch`] outcome (`200`, `404` or `405`).
//!
//! 4. **Reverse routing**: [`Router::path`] looks up a named route and
//!    substitutes values into its pattern.
//!
//! ## Example
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use trellis::RouterBuilder;
//!
//! let mut builder = RouterBuilder::new();
//! builder.get("any/foo", "foo", None).unwrap();
//! builder.get("any/:var", "var", Some("var")).unwrap();
//! builder.get("any/*", "rest", None).unwrap();
//! let router = builder.build();
//!
//! let m = router.dispatch(&Method::GET, "any/a/b/c");
//! assert_eq!(m.code, StatusCode::OK);
//! assert_eq!(m.handler(), Some(&"rest"));
//! assert_eq!(m.parameters.len(), 3);
//!
//! assert_eq!(router.dispatch(&Method::POST, "any/foo").code, StatusCode::METHOD_NOT_ALLOWED);
//! assert_eq!(router.path("var", &["bar"]).unwrap(), "any/bar");
//! ```

/// Verb shortcuts shared by [`RouterBuilder`] and [`Scope`]; both must
/// provide an `add` method with the same signature.
macro_rules! verb_shortcuts {
    () => {
        verb_shortcuts!(get, GET);
        verb_shortcuts!(post, POST);
        verb_shortcuts!(put, PUT);
        verb_shortcuts!(patch, PATCH);
        verb_shortcuts!(delete, DELETE);
    };
    ($fn_name:ident, $method:ident) => {
        #[doc = concat!("Register a `", stringify!($method), "` route. See `add`.")]
        pub fn $fn_name(
            &mut self,
            pattern: &str,
            handler: H,
            name: Option<&str>,
        ) -> Result<
            $crate::router::RouteMut<'_, H>,
            $crate::error::RouteError,
        > {
            self.add(::http::Method::$method, pattern, handler, name)
        }
    };
}

mod core;
mod group;
mod pattern;
mod route;
mod search;
mod tree;

pub use self::core::{parse_method, RouteMut, Router, RouterBuilder};
pub use group::{Group, Scope};
pub use pattern::{join, sanitize, split, Pattern, Segment};
pub use route::{Route, RouteId};
pub use search::{Dispatch, ParamVec};
