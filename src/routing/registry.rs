//! Declarative route registration.
//!
//! # Responsibilities
//! - Resolve or create the node chain for each `path` prefix
//! - Bind endpoints and filters to the current node
//! - Reject duplicate paths/endpoints and any mutation after start
//!
//! # Design Decisions
//! - Nesting is expressed by a [`Scope`] cursor: a registration block is
//!   a plain function of the scope it is given, so the same block can be
//!   applied under any number of prefixes
//! - `path` claims an absolute path exactly once; intermediate nodes made
//!   by multi-segment prefixes stay unclaimed
//! - Nothing is rolled back when a block fails halfway
//!
//! # Example
//! ```
//! use axum::http::Method;
//! use tinyweb::routing::{RouteRegistry, Scope, RegistrationError};
//!
//! fn greeting(p: &mut Scope<'_>) -> Result<(), RegistrationError> {
//!     p.end_point(Method::GET, "/endpoint", |_req, res, _ctx| res.ok("hello"))
//! }
//!
//! let mut registry = RouteRegistry::new();
//! registry.path("/first", greeting).unwrap();
//! registry.path("/second", greeting).unwrap();
//! assert!(registry.table().resolve(&Method::GET, "/second/endpoint").is_found());
//! ```

use std::sync::Arc;

use axum::http::Method;

use crate::http::{Request, RequestContext, Response};
use crate::lifecycle::{Lifecycle, LifecycleError, LifecycleState};
use crate::routing::chain::{Filter, FilterResult};
use crate::routing::dispatch::normalize_path;
use crate::routing::error::{RegistrationError, RegistrationKind};
use crate::routing::matcher::{compile_endpoint, compile_filter};
use crate::routing::node::{EndpointBinding, FilterBinding, MethodFilter, NodeId};
use crate::routing::table::RouteTable;

/// Owner of the route table and the lifecycle gate in front of it.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    lifecycle: Lifecycle,
    table: Arc<RouteTable>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Read access to the tree; still available after stop.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Registration cursor positioned at the root.
    pub fn root(&mut self) -> Scope<'_> {
        Scope {
            registry: self,
            node: NodeId::ROOT,
        }
    }

    pub fn path<F>(&mut self, prefix: &str, block: F) -> Result<(), RegistrationError>
    where
        F: FnOnce(&mut Scope<'_>) -> Result<(), RegistrationError>,
    {
        self.root().path(prefix, block)
    }

    pub fn end_point<F>(&mut self, method: Method, sub_path: &str, handler: F) -> Result<(), RegistrationError>
    where
        F: Fn(&Request, &mut Response, &mut RequestContext) + Send + Sync + 'static,
    {
        self.root().end_point(method, sub_path, handler)
    }

    pub fn filter<F>(&mut self, pattern: &str, handler: F) -> Result<(), RegistrationError>
    where
        F: Fn(&Request, &mut Response, &mut RequestContext) -> FilterResult + Send + Sync + 'static,
    {
        self.root().filter(pattern, handler)
    }

    pub fn method_filter<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<(), RegistrationError>
    where
        F: Fn(&Request, &mut Response, &mut RequestContext) -> FilterResult + Send + Sync + 'static,
    {
        self.root().method_filter(method, pattern, handler)
    }

    /// Transition to `Started` and hand out the now-immutable table.
    pub fn freeze(&mut self) -> Result<Arc<RouteTable>, LifecycleError> {
        self.lifecycle.start()?;
        tracing::debug!(nodes = self.table.len(), "Route table frozen");
        Ok(Arc::clone(&self.table))
    }

    /// Transition to `Stopped`. The table is kept for inspection.
    pub fn mark_stopped(&mut self) -> Result<(), LifecycleError> {
        self.lifecycle.stop()
    }
}

/// A registration cursor: the "current node" of a registration block.
pub struct Scope<'r> {
    registry: &'r mut RouteRegistry,
    node: NodeId,
}

impl Scope<'_> {
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Absolute path of the current node; empty at the root.
    pub fn full_path(&self) -> &str {
        self.registry.table.node(self.node).full_path()
    }

    fn table_mut(&mut self, kind: RegistrationKind) -> Result<&mut RouteTable, RegistrationError> {
        self.registry.lifecycle.ensure_configurable(kind)?;
        Ok(Arc::make_mut(&mut self.registry.table))
    }

    /// Claim `prefix` below the current node and run `block` with it as
    /// the current node.
    pub fn path<F>(&mut self, prefix: &str, block: F) -> Result<(), RegistrationError>
    where
        F: FnOnce(&mut Scope<'_>) -> Result<(), RegistrationError>,
    {
        let parent = self.node;
        let table = self.table_mut(RegistrationKind::Path)?;
        let segments = split_prefix(prefix)?;
        let id = table.ensure_chain(parent, segments);
        let target = table.node_mut(id);
        if target.claimed {
            return Err(RegistrationError::DuplicatePath(target.full_path.clone()));
        }
        target.claimed = true;
        tracing::debug!(path = %target.full_path, "Path registered");

        let mut scope = Scope {
            registry: &mut *self.registry,
            node: id,
        };
        block(&mut scope)
    }

    /// Bind `handler` to (method, sub-path) at the current node.
    pub fn end_point<F>(&mut self, method: Method, sub_path: &str, handler: F) -> Result<(), RegistrationError>
    where
        F: Fn(&Request, &mut Response, &mut RequestContext) + Send + Sync + 'static,
    {
        let id = self.node;
        let table = self.table_mut(RegistrationKind::Endpoint)?;
        let sub_path = normalize_sub_path(sub_path)?;
        let matcher = compile_endpoint(&sub_path)?;

        let node = table.node_mut(id);
        if node.endpoint_for(&method, &sub_path).is_some() {
            return Err(RegistrationError::DuplicateEndpoint {
                path: absolute(node.full_path(), &sub_path),
                method,
            });
        }
        tracing::debug!(method = %method, path = %absolute(node.full_path(), &sub_path), "Endpoint registered");
        node.endpoints.push(EndpointBinding {
            method,
            sub_path,
            matcher: Arc::from(matcher),
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// Append an any-method filter to the current node.
    pub fn filter<F>(&mut self, pattern: &str, handler: F) -> Result<(), RegistrationError>
    where
        F: Fn(&Request, &mut Response, &mut RequestContext) -> FilterResult + Send + Sync + 'static,
    {
        self.add_filter(MethodFilter::Any, pattern, Arc::new(handler))
    }

    /// Append a filter that only applies to `method`.
    pub fn method_filter<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<(), RegistrationError>
    where
        F: Fn(&Request, &mut Response, &mut RequestContext) -> FilterResult + Send + Sync + 'static,
    {
        self.add_filter(MethodFilter::Only(method), pattern, Arc::new(handler))
    }

    fn add_filter(
        &mut self,
        methods: MethodFilter,
        pattern: &str,
        handler: Arc<dyn Filter>,
    ) -> Result<(), RegistrationError> {
        let id = self.node;
        let table = self.table_mut(RegistrationKind::Filter)?;
        let matcher = compile_filter(pattern)?;

        let node = table.node_mut(id);
        tracing::debug!(methods = %methods, node = %node.full_path(), pattern = %pattern, "Filter registered");
        node.filters.push(FilterBinding {
            methods,
            pattern: pattern.to_string(),
            matcher: Arc::from(matcher),
            handler,
        });
        Ok(())
    }
}

/// Split `/a/b/` into `["a", "b"]`, rejecting empty segments.
fn split_prefix(prefix: &str) -> Result<Vec<&str>, RegistrationError> {
    let body = prefix
        .strip_prefix('/')
        .ok_or_else(|| RegistrationError::MissingLeadingSlash(prefix.to_string()))?;
    let body = body.strip_suffix('/').unwrap_or(body);
    if body.is_empty() || body.split('/').any(str::is_empty) {
        return Err(RegistrationError::EmptySegment(prefix.to_string()));
    }
    Ok(body.split('/').collect())
}

/// Normalize an endpoint sub-path. `""` and `"/"` address the node itself;
/// otherwise one trailing slash is tolerated and empty segments are rejected.
fn normalize_sub_path(sub_path: &str) -> Result<String, RegistrationError> {
    if sub_path.is_empty() || sub_path == "/" {
        return Ok(String::new());
    }
    let body = sub_path
        .strip_prefix('/')
        .ok_or_else(|| RegistrationError::MissingLeadingSlash(sub_path.to_string()))?;
    let body = body.strip_suffix('/').unwrap_or(body);
    if body.is_empty() || body.split('/').any(str::is_empty) {
        return Err(RegistrationError::EmptySegment(sub_path.to_string()));
    }
    Ok(normalize_path(sub_path))
}

fn absolute(node_path: &str, sub_path: &str) -> String {
    let path = format!("{}{}", node_path, sub_path);
    if path.is_empty() {
        "/".to_string()
    } else {
        path
    }
}
