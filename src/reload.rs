//! # Reload Module
//!
//! A frozen [`Router`] never changes. To pick up a new route table, build a
//! fresh router and swap it in: readers holding the old snapshot finish on
//! it, new dispatches see the new one. No request ever observes a half-built
//! table.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trellis::reload::{watch_table, SharedRouter};
//! use trellis::table::RouteTable;
//!
//! let shared = Arc::new(SharedRouter::new(RouteTable::load("routes.yaml")?.build()?));
//! let _watcher = watch_table("routes.yaml", Arc::clone(&shared))?;
//!
//! let router = shared.load();
//! let outcome = router.dispatch(&http::Method::GET, "pages/5");
//! ```
//!
//! If a changed table fails to load or build, the failure is logged and the
//! previous router stays active.

use arc_swap::ArcSwap;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::TableError;
use crate::router::Router;
use crate::table::RouteTable;

/// Router slot that can be replaced while other threads dispatch.
pub struct SharedRouter<H> {
    current: ArcSwap<Router<H>>,
}

impl<H> SharedRouter<H> {
    /// Wrap an initial router
    #[must_use]
    pub fn new(router: Router<H>) -> Self {
        Self {
            current: ArcSwap::from_pointee(router),
        }
    }

    /// Snapshot of the current router
    #[must_use]
    pub fn load(&self) -> Arc<Router<H>> {
        self.current.load_full()
    }

    /// Replace the router for all subsequent loads
    pub fn store(&self, router: Router<H>) {
        self.current.store(Arc::new(router));
    }
}

impl SharedRouter<String> {
    /// Rebuild from a table file and swap the result in.
    ///
    /// Returns the number of routes in the new router. On error the current
    /// router is left untouched.
    pub fn reload_from(&self, path: impl AsRef<Path>) -> Result<usize, TableError> {
        let router = RouteTable::load(path.as_ref())?.build()?;
        let count = router.len();
        self.store(router);
        info!(
            path = %path.as_ref().display(),
            routes_count = count,
            "hot-reload: route table swapped"
        );
        Ok(count)
    }
}

/// Watch a route table file and reload `shared` whenever it changes.
///
/// Keep the returned watcher alive for as long as reloading should happen.
pub fn watch_table<P>(
    table_path: P,
    shared: Arc<SharedRouter<String>>,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
{
    let path: PathBuf = table_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    if let Err(err) = shared.reload_from(&watch_path) {
                        warn!(
                            path = %watch_path.display(),
                            error = %err,
                            "hot-reload: keeping previous route table"
                        );
                    }
                }
            }
            Err(err) => warn!(error = %err, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::RouterBuilder;
    use http::{Method, StatusCode};

    #[test]
    fn snapshots_survive_a_swap() {
        let mut builder = RouterBuilder::new();
        builder.get("old", "old".to_string(), None).unwrap();
        let shared = SharedRouter::new(builder.build());

        let before = shared.load();

        let mut builder = RouterBuilder::new();
        builder.get("new", "new".to_string(), None).unwrap();
        shared.store(builder.build());

        assert_eq!(before.dispatch(&Method::GET, "old").code, StatusCode::OK);
        let after = shared.load();
        assert_eq!(after.dispatch(&Method::GET, "old").code, StatusCode::NOT_FOUND);
        assert_eq!(after.dispatch(&Method::GET, "new").code, StatusCode::OK);
    }
}
