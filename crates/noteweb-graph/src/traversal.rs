//! Neighborhood traversal and path finding.
//!
//! `get_local_graph` walks outward breadth-first from one node and
//! answers "what is around this note?" for local graph views. For
//! algorithms the index does not provide itself, `to_digraph` exports a
//! petgraph snapshot.

use crate::edge::{Direction, EdgeType, GraphEdge};
use crate::graph::GraphIndex;
use crate::node::{EntityType, GraphNode, NodeId};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// A node reached from the center of a local graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachedNode {
    pub id: NodeId,
    /// Number of edges between the center and this node.
    pub hops: usize,
    /// Type of the edge that first reached this node.
    pub via: EdgeType,
}

/// Breadth-first neighborhood of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalGraph {
    pub center: NodeId,
    /// Reached nodes sorted by hops, then id. Excludes the center.
    pub nodes: Vec<ReachedNode>,
    /// Every edge walked, once each.
    pub edges: Vec<GraphEdge>,
    pub max_depth: usize,
}

impl LocalGraph {
    /// Reached nodes at exactly `hops` from the center.
    pub fn at_depth(&self, hops: usize) -> impl Iterator<Item = &ReachedNode> {
        self.nodes.iter().filter(move |n| n.hops == hops)
    }
}

impl GraphIndex {
    /// Collects everything within `max_depth` hops of `id`.
    ///
    /// `max_depth = 0` means unlimited. An unknown `id` gives an empty
    /// result. Cycles are visited once.
    pub fn get_local_graph(&self, id: &str, max_depth: usize, direction: Direction) -> LocalGraph {
        let center = match self.get_node(id) {
            Some(node) => node.id.clone(),
            None => {
                return LocalGraph {
                    center: NodeId::coerce(EntityType::Note, id),
                    nodes: Vec::new(),
                    edges: Vec::new(),
                    max_depth,
                };
            }
        };

        let effective_depth = if max_depth == 0 {
            usize::MAX
        } else {
            max_depth
        };

        let mut visited: HashSet<NodeId> = HashSet::from([center.clone()]);
        let mut walked: HashSet<&GraphEdge> = HashSet::new();
        let mut edges = Vec::new();
        let mut nodes = Vec::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::from([(center.clone(), 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= effective_depth {
                continue;
            }

            for edge in self.edges_in(current.as_str(), direction) {
                if walked.insert(edge) {
                    edges.push(edge.clone());
                }

                let neighbor = edge.other_end(current.as_str());
                if visited.insert(neighbor.clone()) {
                    nodes.push(ReachedNode {
                        id: neighbor.clone(),
                        hops: depth + 1,
                        via: edge.edge_type,
                    });
                    queue.push_back((neighbor.clone(), depth + 1));
                }
            }
        }

        nodes.sort_by(|a, b| a.hops.cmp(&b.hops).then_with(|| a.id.cmp(&b.id)));

        LocalGraph {
            center,
            nodes,
            edges,
            max_depth,
        }
    }

    /// Builds a petgraph snapshot of the index. Nodes are added in id order.
    pub fn to_digraph(&self) -> (DiGraph<GraphNode, EdgeType>, HashMap<NodeId, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut indexes = HashMap::new();

        let mut ids: Vec<&NodeId> = self.nodes.keys().collect();
        ids.sort();

        for id in ids {
            let index = graph.add_node(self.nodes[id].clone());
            indexes.insert(id.clone(), index);
        }

        for edge in self.export_edges() {
            if let (Some(&from), Some(&to)) = (indexes.get(&edge.from), indexes.get(&edge.to)) {
                graph.add_edge(from, to, edge.edge_type);
            }
        }

        (graph, indexes)
    }

    /// Finds the shortest directed path between two nodes, both included.
    pub fn find_path(&self, from: &str, to: &str) -> Option<Vec<NodeId>> {
        let (graph, indexes) = self.to_digraph();
        let start = *indexes.get(from)?;
        let goal = *indexes.get(to)?;

        let (_, path) = petgraph::algo::astar(
            &graph,
            start,
            |finish| finish == goal,
            |_| 1usize, // weight of 1 for all edges (BFS-like)
            |_| 0,
        )?;

        Some(path.into_iter().map(|idx| graph[idx].id.clone()).collect())
    }
}
