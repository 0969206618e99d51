//! Router core: registration and dispatch.
//!
//! Registration happens on a [`RouterBuilder`], single threaded, before any
//! request is matched. [`RouterBuilder::build`] freezes the table into a
//! [`Router`], which only offers read access: dispatch allocates its own
//! `Search` per call and can run from any number of threads at once.

use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

use super::group::{Closed, Group, Scope};
use super::pattern::{sanitize, split, Pattern};
use super::route::{Route, RouteId};
use super::search::{Dispatch, ParamVec, Search};
use super::tree::Node;
use crate::error::{PathError, RouteError};

/// Parse a method name case-insensitively: `"get"` is [`Method::GET`].
pub fn parse_method(method: &str) -> Result<Method, RouteError> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| RouteError::InvalidMethod(method.to_string()))
}

/// Mutable access to a freshly registered route.
pub struct RouteMut<'a, H> {
    id: RouteId,
    route: &'a mut Route<H>,
}

impl<H> RouteMut<'_, H> {
    /// Handle of the new route
    #[must_use]
    pub fn id(&self) -> RouteId {
        self.id
    }

    /// The route as registered so far
    #[must_use]
    pub fn route(&self) -> &Route<H> {
        self.route
    }

    /// Append route-specific middleware. Group middleware applied later is
    /// placed in front of these names.
    pub fn middleware<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route.append_middleware(names);
        self
    }
}

/// Route table under construction.
///
/// ```
/// use trellis::RouterBuilder;
///
/// let mut builder = RouterBuilder::new();
/// builder.middleware(["g"]);
/// builder
///     .group("pages", |g| {
///         g.group(":id", |g| {
///             g.get("", "show_page", Some("page"))?.middleware(["m"]);
///             Ok(())
///         })?
///         .middleware(["var"]);
///         Ok(())
///     })?
///     .middleware(["pages"]);
///
/// let router = builder.build();
/// let outcome = router.dispatch(&http::Method::GET, "pages/5");
/// assert_eq!(outcome.code, http::StatusCode::OK);
/// assert_eq!(outcome.middleware, ["g", "pages", "var", "m"]);
/// assert_eq!(router.path("page", &["5"])?, "pages/5");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct RouterBuilder<H> {
    tree: Node,
    routes: Vec<Route<H>>,
    names: HashMap<String, RouteId>,
    global: Vec<String>,
}

impl<H> Default for RouterBuilder<H> {
    fn default() -> Self {
        Self {
            tree: Node::default(),
            routes: Vec::new(),
            names: HashMap::new(),
            global: Vec::new(),
        }
    }
}

impl<H> RouterBuilder<H> {
    /// Empty route table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append names to the global middleware, which runs before every
    /// route's own list.
    pub fn middleware<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.global.extend(names.into_iter().map(Into::into));
        self
    }

    /// Register a route at the root scope.
    ///
    /// # Errors
    ///
    /// - [`RouteError::MissingParameterName`], [`RouteError::InvalidOptionalParameter`]
    ///   or [`RouteError::InvalidWildcardParameter`] for a malformed pattern
    /// - [`RouteError::RouteExists`] when the method is already bound to an
    ///   equivalent pattern
    /// - [`RouteError::NamedRouteExists`] when the name is taken
    pub fn add(
        &mut self,
        method: impl AsRef<str>,
        pattern: &str,
        handler: H,
        name: Option<&str>,
    ) -> Result<RouteMut<'_, H>, RouteError> {
        self.register(method.as_ref(), &sanitize(pattern), handler, name)
    }

    verb_shortcuts!();

    /// Register routes under `prefix`. `body` receives the scope to register
    /// through; the returned [`Group`] attaches middleware to all of them.
    pub fn group<F>(&mut self, prefix: &str, body: F) -> Result<Group<'_, H>, RouteError>
    where
        F: FnOnce(&mut Scope<'_, H>) -> Result<(), RouteError>,
    {
        let closed = self.run_scope(sanitize(prefix), body)?;
        Ok(Group {
            prefix: closed.prefix,
            ids: closed.ids,
            routes: &mut self.routes,
        })
    }

    /// Number of routes registered so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// `true` before the first route is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze the table. No route or middleware can change afterwards.
    #[must_use]
    pub fn build(self) -> Router<H> {
        info!(
            routes_count = self.routes.len(),
            named_count = self.names.len(),
            node_count = self.tree.len(),
            global_middleware = ?self.global,
            "Routing table frozen"
        );
        Router {
            tree: self.tree,
            routes: self.routes,
            names: self.names,
            global: self.global,
        }
    }

    pub(crate) fn run_scope<F>(&mut self, prefix: String, body: F) -> Result<Closed, RouteError>
    where
        F: FnOnce(&mut Scope<'_, H>) -> Result<(), RouteError>,
    {
        let mut scope = Scope::new(self, prefix.clone());
        body(&mut scope)?;
        Ok(Closed {
            prefix,
            ids: scope.into_routes(),
        })
    }

    pub(crate) fn routes_mut(&mut self) -> &mut [Route<H>] {
        &mut self.routes
    }

    /// Insert a route for an already sanitized `pattern`.
    pub(crate) fn register(
        &mut self,
        method: &str,
        pattern: &str,
        handler: H,
        name: Option<&str>,
    ) -> Result<RouteMut<'_, H>, RouteError> {
        let method = parse_method(method)?;
        let pattern = Pattern::parse(pattern)?;

        let node = self.tree.build(pattern.segments());
        if node.route_for(&method).is_some() {
            return Err(RouteError::RouteExists {
                method: method.to_string(),
                pattern: pattern.as_str().to_string(),
            });
        }
        if let Some(name) = name {
            if self.names.contains_key(name) {
                return Err(RouteError::NamedRouteExists(name.to_string()));
            }
        }

        let id = RouteId(self.routes.len());
        node.bind(method.clone(), id);
        if let Some(name) = name {
            self.names.insert(name.to_string(), id);
        }

        debug!(
            method = %method,
            pattern = %pattern.as_str(),
            name = ?name,
            route_id = id.0,
            "Route registered"
        );

        self.routes
            .push(Route::new(method, pattern, handler, name.map(str::to_string)));
        let route = &mut self.routes[id.0];
        Ok(RouteMut { id, route })
    }
}

/// Frozen route table.
///
/// `Router<H>` is `Send + Sync` whenever `H` is, and every method takes
/// `&self`.
#[derive(Debug, Clone)]
pub struct Router<H> {
    tree: Node,
    routes: Vec<Route<H>>,
    names: HashMap<String, RouteId>,
    global: Vec<String>,
}

impl<H> Router<H> {
    /// Match `method` and `path` against the table.
    ///
    /// The path is sanitized first (`//pages/5/` is `pages/5`). Lower-case
    /// extension methods are upper-cased. This never fails: a miss is a
    /// `404` or `405` outcome.
    #[must_use]
    pub fn dispatch(&self, method: &Method, path: &str) -> Dispatch<'_, H> {
        let method = parse_method(method.as_str()).unwrap_or_else(|_| method.clone());
        let path = sanitize(path);
        let segments: Vec<&str> = split(&path).collect();

        let mut search = Search::new(method, path.clone());
        self.tree.search(&segments, &mut ParamVec::new(), &mut search);
        let dispatch = search.resolve(&self.routes, &self.global);

        debug!(
            method = %dispatch.method,
            path = %dispatch.path,
            code = dispatch.code.as_u16(),
            route_pattern = ?dispatch.pattern(),
            params = ?dispatch.parameters,
            options = ?dispatch.options,
            "Dispatch resolved"
        );

        dispatch
    }

    /// Generate the path of the route registered as `name`.
    ///
    /// `data` may be a sequence (positional), a map or a struct (by
    /// parameter name). See [`Route::path`].
    pub fn path<T: Serialize + ?Sized>(&self, name: &str, data: &T) -> Result<String, PathError> {
        let value = serde_json::to_value(data)?;
        self.path_value(name, &value)
    }

    /// [`Router::path`] for data that is already a JSON value
    pub fn path_value(&self, name: &str, data: &Value) -> Result<String, PathError> {
        let route = self
            .route_named(name)
            .ok_or_else(|| PathError::NamedRouteUndefined(name.to_string()))?;
        route.path(data)
    }

    /// Route registered under `name`
    #[must_use]
    pub fn route_named(&self, name: &str) -> Option<&Route<H>> {
        self.names.get(name).and_then(|id| self.route(*id))
    }

    /// Route behind a handle
    #[must_use]
    pub fn route(&self, id: RouteId) -> Option<&Route<H>> {
        self.routes.get(id.0)
    }

    /// All routes in registration order
    pub fn routes(&self) -> impl Iterator<Item = &Route<H>> {
        self.routes.iter()
    }

    /// Middleware placed in front of every matched route
    #[must_use]
    pub fn global_middleware(&self) -> &[String] {
        &self.global
    }

    /// Number of routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// `true` when no routes are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Log every registered route at info level.
    pub fn dump_routes(&self) {
        info!(
            routes_count = self.routes.len(),
            global_middleware = ?self.global,
            "Route table"
        );
        for route in &self.routes {
            info!(
                method = %route.method(),
                pattern = %route.pattern(),
                name = ?route.name(),
                middleware = ?route.middleware(),
                "Route"
            );
        }
    }
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        RouterBuilder::new().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn methods_are_case_insensitive() {
        assert_eq!(parse_method("get"), Ok(Method::GET));
        assert_eq!(parse_method("Patch"), Ok(Method::PATCH));
        assert_eq!(parse_method("purge").unwrap().as_str(), "PURGE");
        assert!(matches!(parse_method("bad method"), Err(RouteError::InvalidMethod(_))));
    }

    #[test]
    fn duplicate_method_and_pattern_is_rejected() {
        let mut builder = RouterBuilder::new();
        builder.get("pages/:id", 1, None).unwrap();
        builder.put("pages/:id", 2, None).unwrap();
        let err = builder.get("/pages//:slug/", 3, None).err();
        assert_eq!(
            err,
            Some(RouteError::RouteExists {
                method: "GET".into(),
                pattern: "pages/:slug".into(),
            })
        );
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut builder = RouterBuilder::new();
        builder.get("a", 1, Some("home")).unwrap();
        let err = builder.get("b", 2, Some("home")).err();
        assert_eq!(err, Some(RouteError::NamedRouteExists("home".into())));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn patterns_are_sanitized() {
        let mut builder = RouterBuilder::new();
        builder.add("get", "//pages///about/", 1, Some("about")).unwrap();
        let router = builder.build();
        assert_eq!(router.route_named("about").unwrap().pattern(), "pages/about");
        assert_eq!(router.dispatch(&Method::GET, "/pages/about/").code, StatusCode::OK);
    }

    #[test]
    fn empty_router_always_misses() {
        let router: Router<()> = Router::default();
        assert!(router.is_empty());
        let outcome = router.dispatch(&Method::GET, "");
        assert_eq!(outcome.code, StatusCode::NOT_FOUND);
    }

    #[test]
    fn unknown_name_cannot_generate_a_path() {
        let router: Router<()> = Router::default();
        assert!(matches!(
            router.path("nope", &()),
            Err(PathError::NamedRouteUndefined(name)) if name == "nope"
        ));
    }

    #[test]
    fn frozen_router_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Router<String>>();
    }
}
