//! Registration scopes and retroactive middleware.
//!
//! A [`Scope`] is handed to the body of [`crate::RouterBuilder::group`] (or a
//! nested [`Scope::group`]). Everything registered through it gets the scope
//! prefix, and the ids of those routes are collected. When the body returns,
//! the ids are merged into the enclosing scope and a [`Group`] handle is
//! returned for the caller to attach middleware.
//!
//! [`Group::middleware`] prepends names to every route the group holds. A
//! parent's call always happens after its children's calls have run, so the
//! final order per route reads outermost group first:
//!
//! ```text
//! [global..., outer group..., inner group..., route's own...]
//! ```

use super::core::{RouteMut, RouterBuilder};
use super::pattern::join;
use super::route::{Route, RouteId};
use crate::error::RouteError;

/// Explicit registration context for one group body.
pub struct Scope<'b, H> {
    builder: &'b mut RouterBuilder<H>,
    prefix: String,
    routes: Vec<RouteId>,
}

impl<'b, H> Scope<'b, H> {
    pub(crate) fn new(builder: &'b mut RouterBuilder<H>, prefix: String) -> Self {
        Self {
            builder,
            prefix,
            routes: Vec::new(),
        }
    }

    pub(crate) fn into_routes(self) -> Vec<RouteId> {
        self.routes
    }

    /// Combined prefix of this scope and all enclosing scopes
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Routes registered so far in this scope, nested groups included
    #[must_use]
    pub fn routes(&self) -> &[RouteId] {
        &self.routes
    }

    /// Register a route under this scope's prefix.
    pub fn add(
        &mut self,
        method: impl AsRef<str>,
        pattern: &str,
        handler: H,
        name: Option<&str>,
    ) -> Result<RouteMut<'_, H>, RouteError> {
        let full = join(&self.prefix, pattern);
        let route = self.builder.register(method.as_ref(), &full, handler, name)?;
        self.routes.push(route.id());
        Ok(route)
    }

    verb_shortcuts!();

    /// Open a nested scope. Its routes become part of this scope once `body`
    /// returns.
    pub fn group<F>(&mut self, prefix: &str, body: F) -> Result<Group<'_, H>, RouteError>
    where
        F: FnOnce(&mut Scope<'_, H>) -> Result<(), RouteError>,
    {
        let nested = self.builder.run_scope(join(&self.prefix, prefix), body)?;
        self.routes.extend_from_slice(&nested.ids);
        Ok(Group {
            prefix: nested.prefix,
            ids: nested.ids,
            routes: self.builder.routes_mut(),
        })
    }
}

/// Routes gathered by one finished scope.
pub(crate) struct Closed {
    pub(crate) prefix: String,
    pub(crate) ids: Vec<RouteId>,
}

/// Handle returned once a group body has finished.
pub struct Group<'a, H> {
    pub(crate) prefix: String,
    pub(crate) ids: Vec<RouteId>,
    pub(crate) routes: &'a mut [Route<H>],
}

impl<H> Group<'_, H> {
    /// Full prefix of the group
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Routes created inside the group body, including nested groups
    #[must_use]
    pub fn routes(&self) -> &[RouteId] {
        &self.ids
    }

    /// Prepend `names` to the middleware of every route in the group,
    /// keeping their relative order.
    pub fn middleware<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        for id in &self.ids {
            if let Some(route) = self.routes.get_mut(id.0) {
                route.prepend_middleware(&names);
            }
        }
        self
    }
}
