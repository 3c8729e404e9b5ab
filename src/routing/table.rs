//! The arena of path nodes built during registration.
//!
//! # Design Decisions
//! - Nodes live in a `Vec` and refer to each other by [`NodeId`]; the
//!   tree only grows, so ids stay valid for the table's lifetime
//! - Immutable after the server starts (shared via `Arc`, no locks)

use axum::http::Method;

use crate::routing::node::{NodeId, PathNode};

/// The registration tree rooted at `/`.
#[derive(Debug, Clone)]
pub struct RouteTable {
    nodes: Vec<PathNode>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            nodes: vec![PathNode::root()],
        }
    }

    pub fn root(&self) -> &PathNode {
        &self.nodes[NodeId::ROOT.0]
    }

    pub fn node(&self, id: NodeId) -> &PathNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut PathNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Look up the node for an absolute path such as `/dupli/cate`.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(NodeId::ROOT, |id, segment| self.node(id).child(segment))
    }

    /// Walk `segments` from `from`, creating missing nodes along the way.
    pub(crate) fn ensure_chain<'s>(
        &mut self,
        from: NodeId,
        segments: impl IntoIterator<Item = &'s str>,
    ) -> NodeId {
        segments.into_iter().fold(from, |id, segment| {
            if let Some(child) = self.node(id).child(segment) {
                return child;
            }
            let child_id = NodeId(self.nodes.len());
            let child = PathNode::child_of(id, self.node(id), segment);
            self.nodes.push(child);
            self.node_mut(id).children.insert(segment.to_string(), child_id);
            child_id
        })
    }

    /// Every endpoint as (method, absolute path), depth-first in segment order.
    pub fn describe(&self) -> Vec<(Method, String)> {
        let mut out = Vec::new();
        self.describe_into(NodeId::ROOT, &mut out);
        out
    }

    fn describe_into(&self, id: NodeId, out: &mut Vec<(Method, String)>) {
        let node = self.node(id);
        for endpoint in node.endpoints() {
            let mut path = format!("{}{}", node.full_path(), endpoint.sub_path());
            if path.is_empty() {
                path.push('/');
            }
            out.push((endpoint.method().clone(), path));
        }
        for (_, child) in node.children() {
            self.describe_into(child, out);
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_chain_reuses_existing_nodes() {
        let mut table = RouteTable::new();
        let cate = table.ensure_chain(NodeId::ROOT, ["dupli", "cate"]);
        let dupli = table.find("/dupli").unwrap();
        assert_eq!(table.ensure_chain(dupli, ["cate"]), cate);
        assert_eq!(table.len(), 3);
        assert_eq!(table.node(cate).full_path(), "/dupli/cate");
        assert_eq!(table.find("/dupli/cate"), Some(cate));
        assert_eq!(table.find("/nope"), None);
        assert_eq!(table.find(""), Some(NodeId::ROOT));
    }

    #[test]
    fn new_table_is_empty() {
        let table = RouteTable::new();
        assert!(table.is_empty());
        assert!(table.describe().is_empty());
    }
}
