//! Knowledge graph module: document model, in-memory store and BFS traversal
//!
//! The graph is loaded once from a JSON document (Hetionet export layout) and
//! is read-only afterwards. Path queries go through [`GraphAlgorithms`].

mod document;
mod store;
mod traversal;

pub use document::{GraphDocument, RawEdge, RawNode};
pub use store::GraphStore;
pub use traversal::{BreadthFirst, GraphAlgorithms};

use serde::{Deserialize, Serialize};

/// Petgraph storage used by [`GraphStore`]
pub type KnowledgeGraph = petgraph::graph::DiGraph<Node, Relation>;

/// Optional attributes attached to a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Page describing the entity
    #[serde(default)]
    pub url: Option<String>,
    /// Search query to use when there is no url, e.g. `Entrez Gene`
    #[serde(default)]
    pub source: Option<String>,
    /// Description shipped with the graph
    #[serde(default)]
    pub description: Option<String>,
}

/// A typed entity in the knowledge graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub identifier: String,
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub data: NodeData,
}

/// A directed, typed edge (source --kind--> target)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub source: String,
    pub target: String,
    /// Relation label, e.g. `treats_CtD`, `binds`
    pub kind: String,
}

/// An ordered, simple walk through the graph (at least two nodes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPath {
    nodes: Vec<String>,
}

impl GraphPath {
    /// Returns `None` for walks shorter than two nodes
    pub fn new(nodes: Vec<String>) -> Option<Self> {
        if nodes.len() < 2 {
            return None;
        }
        Some(Self { nodes })
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Number of edges in the walk
    pub fn hops(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn source(&self) -> &str {
        &self.nodes[0]
    }

    pub fn target(&self) -> &str {
        &self.nodes[self.nodes.len() - 1]
    }

    /// Consecutive (from, to) node pairs
    pub fn segments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }
}

impl std::fmt::Display for GraphPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.nodes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_path_requires_two_nodes() {
        assert!(GraphPath::new(vec![]).is_none());
        assert!(GraphPath::new(vec!["a".into()]).is_none());
        assert!(GraphPath::new(vec!["a".into(), "b".into()]).is_some());
    }

    #[test]
    fn test_graph_path_segments() {
        let path = GraphPath::new(vec!["a".into(), "b".into(), "c".into()]).unwrap();
        let segments: Vec<_> = path.segments().collect();
        assert_eq!(segments, vec![("a", "b"), ("b", "c")]);
        assert_eq!(path.hops(), 2);
        assert_eq!(path.source(), "a");
        assert_eq!(path.target(), "c");
        assert_eq!(path.to_string(), "[a, b, c]");
    }
}
