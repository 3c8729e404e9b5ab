//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Find the deepest registered node whose path prefixes the request path
//! - Pick the endpoint for (method, remaining suffix) at that node
//! - Collect matching filters from the root down to that node
//! - Return the chain or an explicit `NotFound`
//!
//! # Design Decisions
//! - Read-only over `&RouteTable` (thread-safe without locks)
//! - Greedy prefix walk with no backtracking to ancestors
//! - Literal endpoint sub-paths are tried before templated ones
//! - Nothing runs here; execution lives in `chain.rs`

use axum::http::Method;

use crate::routing::matcher::PathParams;
use crate::routing::node::{EndpointBinding, FilterBinding, NodeId, PathNode};
use crate::routing::table::RouteTable;

/// A resolved filter chain plus its terminal endpoint.
#[derive(Debug)]
pub struct Route<'t> {
    pub(crate) node: NodeId,
    pub(crate) filters: Vec<&'t FilterBinding>,
    pub(crate) endpoint: &'t EndpointBinding,
    pub(crate) params: PathParams,
}

impl<'t> Route<'t> {
    /// The node the endpoint is registered under.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Filters in execution order: outer node first, then registration order.
    pub fn filters(&self) -> &[&'t FilterBinding] {
        &self.filters
    }

    pub fn endpoint(&self) -> &'t EndpointBinding {
        self.endpoint
    }

    /// Variables captured by a templated endpoint sub-path.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn take_params(&mut self) -> PathParams {
        std::mem::take(&mut self.params)
    }
}

/// Result of a dispatch.
#[derive(Debug)]
pub enum Resolution<'t> {
    Found(Route<'t>),
    NotFound,
}

impl<'t> Resolution<'t> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    pub fn route(self) -> Option<Route<'t>> {
        match self {
            Resolution::Found(route) => Some(route),
            Resolution::NotFound => None,
        }
    }
}

/// Collapse repeated slashes and drop the trailing one. `/` becomes `""`.
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    out
}

impl RouteTable {
    /// Match `(method, path)` to a filter chain and endpoint.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        let path = normalize_path(path);

        let mut trail = vec![NodeId::ROOT];
        let mut current = NodeId::ROOT;
        for segment in path.split('/').skip(1) {
            match self.node(current).child(segment) {
                Some(child) => {
                    current = child;
                    trail.push(child);
                }
                None => break,
            }
        }

        let node = self.node(current);
        let Some((endpoint, params)) = find_endpoint(node, method, suffix_at(node, &path)) else {
            tracing::debug!(method = %method, path = %path, node = %node.full_path(), "No endpoint matched");
            return Resolution::NotFound;
        };

        let filters = trail
            .iter()
            .map(|&id| self.node(id))
            .flat_map(|n| {
                let suffix = suffix_at(n, &path);
                n.filters()
                    .iter()
                    .filter(move |f| f.methods.admits(method) && f.matcher.matches(suffix))
            })
            .collect();

        Resolution::Found(Route {
            node: current,
            filters,
            endpoint,
            params,
        })
    }
}

fn suffix_at<'p>(node: &PathNode, path: &'p str) -> &'p str {
    &path[node.full_path().len()..]
}

fn find_endpoint<'t>(
    node: &'t PathNode,
    method: &Method,
    suffix: &str,
) -> Option<(&'t EndpointBinding, PathParams)> {
    let candidates = || node.endpoints().iter().filter(|e| &e.method == method);
    candidates()
        .filter(|e| e.matcher.is_literal())
        .chain(candidates().filter(|e| !e.matcher.is_literal()))
        .find_map(|e| e.matcher.captures(suffix).map(|params| (e, params)))
}
