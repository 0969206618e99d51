//! Segment trie for route matching.
//!
//! Every node owns its exact-text children plus at most one child per
//! parameter kind. Parameter names never shape the tree: `pages/:id` and
//! `pages/:slug` share one node, and the names live only on the routes.
//!
//! ## Matching order
//!
//! At each node the search tries, depth first:
//!
//! 1. the routes bound here, when the path is exhausted
//! 2. the literal child keyed by the next segment
//! 3. the named child, capturing the next segment
//! 4. the optional child, capturing the next segment or a null marker
//! 5. the wildcard child, capturing every remaining segment
//!
//! Steps 4 and 5 run even after the path is exhausted, which is how chained
//! optional segments each bind a null. Because the more specific branches are
//! walked first and the `Search` keeps only the first route recorded per
//! method, literal routes always beat parameter routes without any sorting.

use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;

use super::pattern::Segment;
use super::route::RouteId;
use super::search::{ParamVec, Search};

/// Node in the segment trie
#[derive(Debug, Default, Clone)]
pub(crate) struct Node {
    statics: HashMap<String, Node>,
    named: Option<Box<Node>>,
    optional: Option<Box<Node>>,
    wildcard: Option<Box<Node>>,
    /// Routes ending exactly here, in registration order
    routes: SmallVec<[(Method, RouteId); 4]>,
}

impl Node {
    /// Descend along `segments`, creating children as needed, and return the
    /// terminal node.
    pub(crate) fn build(&mut self, segments: &[Segment]) -> &mut Node {
        let Some((head, tail)) = segments.split_first() else {
            return self;
        };
        let child = match head {
            Segment::Literal(text) => self.statics.entry(text.clone()).or_default(),
            Segment::Named(_) => self.named.get_or_insert_with(Box::default).as_mut(),
            Segment::Optional(_) => self.optional.get_or_insert_with(Box::default).as_mut(),
            Segment::Wildcard(_) => self.wildcard.get_or_insert_with(Box::default).as_mut(),
        };
        child.build(tail)
    }

    /// Route bound to `method` at this node
    pub(crate) fn route_for(&self, method: &Method) -> Option<RouteId> {
        self.routes
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, id)| *id)
    }

    /// Bind `method` at this node. The caller checks for an existing binding.
    pub(crate) fn bind(&mut self, method: Method, id: RouteId) {
        self.routes.push((method, id));
    }

    /// Walk the subtree for `segments`, recording every terminal hit.
    pub(crate) fn search(&self, segments: &[&str], params: &mut ParamVec, search: &mut Search) {
        match segments.split_first() {
            None => self.record(params, search),
            Some((head, tail)) => {
                if let Some(child) = self.statics.get(*head) {
                    child.search(tail, params, search);
                }
                if let Some(child) = &self.named {
                    params.push(Some((*head).to_string()));
                    child.search(tail, params, search);
                    params.pop();
                }
            }
        }

        if let Some(child) = &self.optional {
            let (capture, tail) = match segments.split_first() {
                Some((head, tail)) => (Some((*head).to_string()), tail),
                None => (None, segments),
            };
            params.push(capture);
            child.search(tail, params, search);
            params.pop();
        }

        if let Some(child) = &self.wildcard {
            let depth = params.len();
            params.extend(segments.iter().map(|s| Some((*s).to_string())));
            // A wildcard is always the last segment, so nothing hangs below it.
            child.record(params, search);
            params.truncate(depth);
        }
    }

    fn record(&self, params: &ParamVec, search: &mut Search) {
        for (method, id) in &self.routes {
            search.record(method, *id, params);
        }
    }

    /// Number of nodes in this subtree, including this one
    pub(crate) fn len(&self) -> usize {
        1 + self.statics.values().map(Node::len).sum::<usize>()
            + [&self.named, &self.optional, &self.wildcard]
                .into_iter()
                .flatten()
                .map(|child| child.len())
                .sum::<usize>()
    }
}
