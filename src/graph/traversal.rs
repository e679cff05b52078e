//! BFS shortest paths over the in-memory knowledge graph

use std::collections::{HashMap, VecDeque};

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use super::KnowledgeGraph;

/// Path queries over a loaded graph
///
/// Kept behind a trait so the store can be tested against scripted answers.
pub trait GraphAlgorithms: Send + Sync {
    /// Whether `to` is reachable from `from` along directed edges
    fn has_path(&self, graph: &KnowledgeGraph, from: NodeIndex, to: NodeIndex) -> bool;

    /// One minimum-hop path from `from` to `to`, endpoints included
    fn shortest_path(
        &self,
        graph: &KnowledgeGraph,
        from: NodeIndex,
        to: NodeIndex,
    ) -> Option<Vec<NodeIndex>>;
}

/// Unweighted breadth-first search
///
/// Out-edges are expanded in insertion order, so among equal-length paths the
/// one reached through earlier edges wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct BreadthFirst;

/// Successors of `node`, following edges in the order they were added
fn successors_in_order(graph: &KnowledgeGraph, node: NodeIndex) -> Vec<NodeIndex> {
    let mut edges: Vec<(EdgeIndex, NodeIndex)> =
        graph.edges(node).map(|e| (e.id(), e.target())).collect();
    edges.sort_by_key(|(id, _)| *id);
    edges.into_iter().map(|(_, target)| target).collect()
}

impl GraphAlgorithms for BreadthFirst {
    fn has_path(&self, graph: &KnowledgeGraph, from: NodeIndex, to: NodeIndex) -> bool {
        petgraph::algo::has_path_connecting(graph, from, to, None)
    }

    fn shortest_path(
        &self,
        graph: &KnowledgeGraph,
        from: NodeIndex,
        to: NodeIndex,
    ) -> Option<Vec<NodeIndex>> {
        if from == to {
            return Some(vec![from]);
        }

        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(from);
        parent.insert(from, from);

        while let Some(node) = queue.pop_front() {
            for next in successors_in_order(graph, node) {
                if parent.contains_key(&next) {
                    continue;
                }
                parent.insert(next, node);
                if next == to {
                    let mut path = vec![to];
                    let mut cursor = to;
                    while cursor != from {
                        cursor = parent[&cursor];
                        path.push(cursor);
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, NodeData, Relation};

    fn node(id: &str) -> Node {
        Node {
            identifier: id.to_string(),
            kind: "Test".to_string(),
            name: id.to_string(),
            data: NodeData::default(),
        }
    }

    fn rel(a: &str, b: &str) -> Relation {
        Relation {
            source: a.to_string(),
            target: b.to_string(),
            kind: "links".to_string(),
        }
    }

    /// a -> b -> c -> d, a -> d2 -> d, c -> a (cycle)
    fn sample() -> (KnowledgeGraph, Vec<NodeIndex>) {
        let mut g = KnowledgeGraph::new();
        let ids: Vec<_> = ["a", "b", "c", "d", "d2"].iter().map(|id| g.add_node(node(id))).collect();
        g.add_edge(ids[0], ids[1], rel("a", "b"));
        g.add_edge(ids[1], ids[2], rel("b", "c"));
        g.add_edge(ids[2], ids[3], rel("c", "d"));
        g.add_edge(ids[0], ids[4], rel("a", "d2"));
        g.add_edge(ids[4], ids[3], rel("d2", "d"));
        g.add_edge(ids[2], ids[0], rel("c", "a"));
        (g, ids)
    }

    #[test]
    fn test_shortest_path_prefers_fewer_hops() {
        let (g, ids) = sample();
        let path = BreadthFirst.shortest_path(&g, ids[0], ids[3]).unwrap();
        assert_eq!(path, vec![ids[0], ids[4], ids[3]]);
    }

    #[test]
    fn test_shortest_path_single_hop() {
        let (g, ids) = sample();
        let path = BreadthFirst.shortest_path(&g, ids[0], ids[1]).unwrap();
        assert_eq!(path, vec![ids[0], ids[1]]);
    }

    #[test]
    fn test_directed_reachability() {
        let (g, ids) = sample();
        assert!(BreadthFirst.has_path(&g, ids[0], ids[3]));
        assert!(!BreadthFirst.has_path(&g, ids[3], ids[0]));
        assert!(BreadthFirst.shortest_path(&g, ids[3], ids[0]).is_none());
    }

    #[test]
    fn test_cycle_terminates() {
        let (g, ids) = sample();
        let path = BreadthFirst.shortest_path(&g, ids[2], ids[1]).unwrap();
        assert_eq!(path, vec![ids[2], ids[0], ids[1]]);
    }

    #[test]
    fn test_equal_length_tie_follows_insertion_order() {
        let mut g = KnowledgeGraph::new();
        let s = g.add_node(node("s"));
        let x = g.add_node(node("x"));
        let y = g.add_node(node("y"));
        let t = g.add_node(node("t"));
        g.add_edge(s, x, rel("s", "x"));
        g.add_edge(s, y, rel("s", "y"));
        g.add_edge(y, t, rel("y", "t"));
        g.add_edge(x, t, rel("x", "t"));
        let path = BreadthFirst.shortest_path(&g, s, t).unwrap();
        assert_eq!(path, vec![s, x, t]);
    }
}
