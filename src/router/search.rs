//! Per-dispatch accumulator and the outcome derived from it.

use http::{Method, StatusCode};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use smallvec::SmallVec;

use super::route::{Route, RouteId};

/// Maximum number of captures before heap allocation.
/// Most routes capture a handful of segments; only wildcards run long.
const MAX_INLINE_PARAMS: usize = 8;

/// Captured parameters in segment order. `None` marks an optional segment
/// that matched nothing.
pub type ParamVec = SmallVec<[Option<String>; MAX_INLINE_PARAMS]>;

#[derive(Debug, Clone)]
pub(crate) struct Hit {
    pub(crate) method: Method,
    pub(crate) route: RouteId,
    pub(crate) params: ParamVec,
}

/// Everything one dispatch found in the tree.
///
/// Holds at most one hit per method: the first one recorded. The tree walks
/// the most specific branches first, so the first hit is the best one.
#[derive(Debug, Clone)]
pub(crate) struct Search {
    method: Method,
    path: String,
    hits: SmallVec<[Hit; 4]>,
}

impl Search {
    /// Start a search for `method` on the sanitized `path`
    pub(crate) fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            hits: SmallVec::new(),
        }
    }

    pub(crate) fn record(&mut self, method: &Method, route: RouteId, params: &ParamVec) {
        if self.hit(method).is_none() {
            self.hits.push(Hit {
                method: method.clone(),
                route,
                params: params.clone(),
            });
        }
    }

    pub(crate) fn hit(&self, method: &Method) -> Option<&Hit> {
        self.hits.iter().find(|hit| &hit.method == method)
    }

    /// Every method found at the path, in the order first recorded
    pub(crate) fn methods(&self) -> Vec<Method> {
        self.hits.iter().map(|hit| hit.method.clone()).collect()
    }

    /// Derive the dispatch outcome.
    ///
    /// - nothing recorded: `404`
    /// - other methods recorded but not the requested one: `405` with those
    ///   methods as `options`
    /// - requested method recorded: `200` with the route, its captures and
    ///   `global ++ route middleware`
    pub(crate) fn resolve<'r, H>(self, routes: &'r [Route<H>], global: &[String]) -> Dispatch<'r, H> {
        let mut dispatch = Dispatch {
            code: StatusCode::NOT_FOUND,
            method: self.method.clone(),
            path: self.path.clone(),
            route: None,
            parameters: ParamVec::new(),
            middleware: Vec::new(),
            options: Vec::new(),
        };

        if self.hits.is_empty() {
            return dispatch;
        }

        dispatch.code = StatusCode::METHOD_NOT_ALLOWED;
        dispatch.options = self.methods();

        let Some(position) = self.hits.iter().position(|hit| hit.method == self.method) else {
            return dispatch;
        };
        let hit = self.hits.into_iter().nth(position);
        let Some(route) = hit.as_ref().and_then(|hit| routes.get(hit.route.0)) else {
            return dispatch;
        };

        dispatch.code = StatusCode::OK;
        dispatch.route = Some(route);
        dispatch.parameters = hit.map(|hit| hit.params).unwrap_or_default();
        dispatch.middleware = global
            .iter()
            .chain(route.middleware())
            .cloned()
            .collect();
        dispatch
    }
}

/// Read-only outcome of one dispatch.
///
/// Dispatch never fails; unmatched paths and unsupported methods are reported
/// through [`Dispatch::code`].
#[derive(Debug, Clone)]
pub struct Dispatch<'r, H> {
    /// `200`, `404` or `405`
    pub code: StatusCode,
    /// Requested method, upper-cased
    pub method: Method,
    /// Requested path, sanitized
    pub path: String,
    route: Option<&'r Route<H>>,
    /// Captures in segment order (200 only)
    pub parameters: ParamVec,
    /// Global middleware followed by the route's own list (200 only)
    pub middleware: Vec<String>,
    /// Methods registered at the path (405 and 200)
    pub options: Vec<Method>,
}

impl<'r, H> Dispatch<'r, H> {
    /// Matched route (200 only)
    #[must_use]
    pub fn route(&self) -> Option<&'r Route<H>> {
        self.route
    }

    /// Pattern of the matched route
    #[must_use]
    pub fn pattern(&self) -> Option<&'r str> {
        self.route.map(Route::pattern)
    }

    /// Handler of the matched route
    #[must_use]
    pub fn handler(&self) -> Option<&'r H> {
        self.route.map(Route::handler)
    }

    /// Name of the matched route, if it has one
    #[must_use]
    pub fn name(&self) -> Option<&'r str> {
        self.route.and_then(Route::name)
    }

    /// `true` when a route matched method and path
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.code == StatusCode::OK
    }
}

impl<H: Serialize> Serialize for Dispatch<'_, H> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let options: Vec<&str> = self.options.iter().map(Method::as_str).collect();
        let mut state = serializer.serialize_struct("Dispatch", 9)?;
        state.serialize_field("code", &self.code.as_u16())?;
        state.serialize_field("method", self.method.as_str())?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("route", &self.pattern())?;
        state.serialize_field("handler", &self.handler())?;
        state.serialize_field("name", &self.name())?;
        state.serialize_field("parameters", &self.parameters)?;
        state.serialize_field("middleware", &self.middleware)?;
        state.serialize_field("options", &options)?;
        state.end()
    }
}
