//! Read-only in-memory knowledge graph

use std::collections::HashMap;
use std::path::Path;

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use super::document::{endpoint_to_string, identifier_to_string};
use super::{BreadthFirst, GraphAlgorithms, GraphDocument, GraphPath, KnowledgeGraph, Node, NodeData, Relation};
use crate::{KgqaError, Result};

/// Directed multi-edge graph with identifier lookup
///
/// Node enumeration order is the document order; it is the tie-break used by
/// retrieval, so it must stay stable for the lifetime of the store.
pub struct GraphStore {
    graph: KnowledgeGraph,
    index: HashMap<String, NodeIndex>,
    algorithms: Box<dyn GraphAlgorithms>,
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .finish()
    }
}

impl GraphStore {
    /// Build a store from a parsed document using breadth-first search
    pub fn load(document: GraphDocument) -> Result<Self> {
        Self::load_with(document, Box::new(BreadthFirst))
    }

    /// Build a store with a custom path algorithm
    pub fn load_with(document: GraphDocument, algorithms: Box<dyn GraphAlgorithms>) -> Result<Self> {
        let mut graph = KnowledgeGraph::with_capacity(document.nodes.len(), document.edges.len());
        let mut index = HashMap::with_capacity(document.nodes.len());

        for (position, raw) in document.nodes.into_iter().enumerate() {
            let identifier = raw
                .identifier
                .as_ref()
                .and_then(identifier_to_string)
                .ok_or_else(|| {
                    KgqaError::GraphLoad(format!("node #{} ({:?}) has no identifier", position, raw.name))
                })?;
            if index.contains_key(&identifier) {
                return Err(KgqaError::GraphLoad(format!("duplicate node identifier: {}", identifier)));
            }
            let idx = graph.add_node(Node {
                identifier: identifier.clone(),
                kind: raw.kind,
                name: raw.name,
                data: raw.data,
            });
            index.insert(identifier, idx);
        }

        for raw in document.edges {
            let source = endpoint_to_string(&raw.source_id)?;
            let target = endpoint_to_string(&raw.target_id)?;
            let from = *index
                .get(&source)
                .ok_or_else(|| KgqaError::GraphLoad(format!("edge references unknown source: {}", source)))?;
            let to = *index
                .get(&target)
                .ok_or_else(|| KgqaError::GraphLoad(format!("edge references unknown target: {}", target)))?;
            graph.add_edge(from, to, Relation { source, target, kind: raw.kind });
        }

        log::info!(
            "Loaded {} nodes and {} edges into the knowledge graph",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self { graph, index, algorithms })
    }

    /// Read and load a JSON graph document from disk
    pub fn load_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::load(GraphDocument::from_json(&json)?)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|idx| &self.graph[*idx])
    }

    pub fn attributes(&self, id: &str) -> Option<&NodeData> {
        self.node(id).map(|n| &n.data)
    }

    /// All nodes in document order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes().map(|n| n.identifier.as_str())
    }

    /// Direct successors, each listed once, in edge insertion order
    pub fn neighbors(&self, id: &str) -> Result<Vec<&str>> {
        let idx = self.lookup(id)?;
        let mut edges: Vec<_> = self.graph.edges(idx).map(|e| (e.id(), e.target())).collect();
        edges.sort_by_key(|(edge, _)| *edge);

        let mut out: Vec<&str> = Vec::with_capacity(edges.len());
        for (_, target) in edges {
            let name = self.graph[target].identifier.as_str();
            if !out.contains(&name) {
                out.push(name);
            }
        }
        Ok(out)
    }

    /// Parallel edges from `a` to `b`, in insertion order
    pub fn edges_between(&self, a: &str, b: &str) -> Vec<&Relation> {
        let (Some(&from), Some(&to)) = (self.index.get(a), self.index.get(b)) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges_connecting(from, to).collect();
        edges.sort_by_key(|e| e.id());
        edges.into_iter().map(|e| e.weight()).collect()
    }

    /// Unknown identifiers are unreachable
    pub fn has_path(&self, source: &str, target: &str) -> bool {
        match (self.index.get(source), self.index.get(target)) {
            (Some(&from), Some(&to)) => self.algorithms.has_path(&self.graph, from, to),
            _ => false,
        }
    }

    /// Minimum-hop path between two distinct nodes, if one exists
    pub fn shortest_path(&self, source: &str, target: &str) -> Option<GraphPath> {
        let from = *self.index.get(source)?;
        let to = *self.index.get(target)?;
        let nodes = self.algorithms.shortest_path(&self.graph, from, to)?;
        GraphPath::new(
            nodes
                .into_iter()
                .map(|idx| self.graph[idx].identifier.clone())
                .collect(),
        )
    }

    fn lookup(&self, id: &str) -> Result<NodeIndex> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| KgqaError::NodeNotFound(id.to_string()))
    }
}
