//! Registration tree vertices and the bindings they own.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::routing::chain::{Endpoint, Filter};
use crate::routing::matcher::PathMatcher;

/// Index of a node inside its [`RouteTable`](crate::routing::RouteTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node (`/`) of every table.
    pub const ROOT: NodeId = NodeId(0);
}

/// Which request methods a filter applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    Any,
    Only(Method),
}

impl MethodFilter {
    pub fn admits(&self, method: &Method) -> bool {
        match self {
            MethodFilter::Any => true,
            MethodFilter::Only(m) => m == method,
        }
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodFilter::Any => f.write_str("ANY"),
            MethodFilter::Only(m) => write!(f, "{}", m),
        }
    }
}

/// A terminal handler bound to one (method, sub-path) of a node.
#[derive(Clone)]
pub struct EndpointBinding {
    pub(crate) method: Method,
    pub(crate) sub_path: String,
    pub(crate) matcher: Arc<dyn PathMatcher>,
    pub(crate) handler: Arc<dyn Endpoint>,
}

impl EndpointBinding {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Normalized sub-path, relative to the owning node.
    pub fn sub_path(&self) -> &str {
        &self.sub_path
    }
}

impl fmt::Debug for EndpointBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointBinding")
            .field("method", &self.method)
            .field("sub_path", &self.sub_path)
            .finish_non_exhaustive()
    }
}

/// A non-terminal handler with the pattern it applies to.
#[derive(Clone)]
pub struct FilterBinding {
    pub(crate) methods: MethodFilter,
    pub(crate) pattern: String,
    pub(crate) matcher: Arc<dyn PathMatcher>,
    pub(crate) handler: Arc<dyn Filter>,
}

impl FilterBinding {
    pub fn methods(&self) -> &MethodFilter {
        &self.methods
    }

    /// Pattern source as registered.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Debug for FilterBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterBinding")
            .field("methods", &self.methods)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// One path prefix in the registration tree.
#[derive(Debug, Clone)]
pub struct PathNode {
    pub(crate) segment: String,
    pub(crate) full_path: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: BTreeMap<String, NodeId>,
    pub(crate) endpoints: Vec<EndpointBinding>,
    pub(crate) filters: Vec<FilterBinding>,
    /// Set once a `path` call has registered exactly this absolute path.
    pub(crate) claimed: bool,
}

impl PathNode {
    pub(crate) fn root() -> Self {
        Self {
            segment: String::new(),
            full_path: String::new(),
            parent: None,
            children: BTreeMap::new(),
            endpoints: Vec::new(),
            filters: Vec::new(),
            claimed: false,
        }
    }

    pub(crate) fn child_of(parent_id: NodeId, parent: &PathNode, segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            full_path: format!("{}/{}", parent.full_path, segment),
            parent: Some(parent_id),
            children: BTreeMap::new(),
            endpoints: Vec::new(),
            filters: Vec::new(),
            claimed: false,
        }
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// Absolute path of this node; empty for the root.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.children.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn child(&self, segment: &str) -> Option<NodeId> {
        self.children.get(segment).copied()
    }

    pub fn endpoints(&self) -> &[EndpointBinding] {
        &self.endpoints
    }

    pub fn filters(&self) -> &[FilterBinding] {
        &self.filters
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Endpoint bound to the same method and sub-path shape, if any.
    ///
    /// Variable names do not count: `/{id}` and `/{name}` collide.
    pub(crate) fn endpoint_for(&self, method: &Method, sub_path: &str) -> Option<&EndpointBinding> {
        let shape = sub_path_shape(sub_path);
        self.endpoints
            .iter()
            .find(|e| &e.method == method && sub_path_shape(&e.sub_path) == shape)
    }
}

/// `/users/{id}/posts` becomes `/users/{}/posts`.
fn sub_path_shape(sub_path: &str) -> String {
    sub_path
        .split('/')
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') {
                "{}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_filter_admits() {
        assert!(MethodFilter::Any.admits(&Method::POST));
        assert!(MethodFilter::Only(Method::GET).admits(&Method::GET));
        assert!(!MethodFilter::Only(Method::GET).admits(&Method::POST));
    }

    #[test]
    fn shape_erases_variable_names() {
        assert_eq!(sub_path_shape("/users/{id}/posts"), "/users/{}/posts");
        assert_eq!(sub_path_shape("/{a}"), sub_path_shape("/{b}"));
        assert_ne!(sub_path_shape("/{a}"), sub_path_shape("/a"));
        assert_eq!(sub_path_shape(""), "");
    }

    #[test]
    fn child_paths_concatenate() {
        let root = PathNode::root();
        let foo = PathNode::child_of(NodeId::ROOT, &root, "foo");
        let bar = PathNode::child_of(NodeId(1), &foo, "bar");
        assert_eq!(foo.full_path(), "/foo");
        assert_eq!(bar.full_path(), "/foo/bar");
        assert_eq!(bar.segment(), "bar");
        assert_eq!(bar.parent(), Some(NodeId(1)));
    }
}
