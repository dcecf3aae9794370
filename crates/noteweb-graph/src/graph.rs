//! Core index data structure.
//!
//! `GraphIndex` is a node table plus two adjacency tables, one per
//! direction. Every node has an entry in both tables for as long as it is
//! registered, and an edge is only stored once both endpoints exist, so
//! neither table ever holds a dangling edge.

use crate::edge::{Direction, EdgeType, GraphEdge};
use crate::node::{EntityType, GraphNode, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// The relationship index.
///
/// Owned by whoever builds it; pass it explicitly to every operation.
/// There is no internal locking.
#[derive(Debug, Default, Clone)]
pub struct GraphIndex {
    /// All registered entities.
    pub(crate) nodes: HashMap<NodeId, GraphNode>,

    /// Edges leaving each node, in insertion order.
    pub(crate) outgoing: HashMap<NodeId, Vec<GraphEdge>>,

    /// Edges arriving at each node, in insertion order.
    pub(crate) incoming: HashMap<NodeId, Vec<GraphEdge>>,
}

impl GraphIndex {
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a node.
    ///
    /// Adjacency for an already-known id is left untouched; only the
    /// payload is replaced.
    pub fn add_node(&mut self, node: GraphNode) {
        let id = node.id.clone();
        self.outgoing.entry(id.clone()).or_default();
        self.incoming.entry(id.clone()).or_default();
        self.nodes.insert(id, node);
    }

    /// Adds an edge if both endpoints are registered.
    ///
    /// A missing endpoint is not a fault: the reference simply is not
    /// resolvable yet, and nothing is stored.
    pub fn add_edge(&mut self, edge: GraphEdge) {
        if !self.nodes.contains_key(&edge.from) || !self.nodes.contains_key(&edge.to) {
            return;
        }

        if let Some(list) = self.incoming.get_mut(&edge.to) {
            list.push(edge.clone());
        }
        if let Some(list) = self.outgoing.get_mut(&edge.from) {
            list.push(edge);
        }
    }

    /// Returns true if an edge `from -> to` of the given type is stored.
    pub fn has_edge(&self, from: &str, to: &str, edge_type: EdgeType) -> bool {
        self.outgoing
            .get(from)
            .is_some_and(|list| list.iter().any(|e| e.to == to && e.edge_type == edge_type))
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<GraphNode> {
        self.remove_node_edges(id);
        self.outgoing.remove(id);
        self.incoming.remove(id);
        let removed = self.nodes.remove(id);
        if removed.is_some() {
            debug!("Removed node {}", id);
        }
        removed
    }

    /// Removes every edge touching `id` but keeps the node registered.
    ///
    /// The node's own adjacency entries stay present and become empty.
    pub fn remove_node_edges(&mut self, id: &str) {
        self.remove_edges_where(id, Direction::Both, |_| true);
    }

    /// Removes the edges touching `id` in `direction` that match `predicate`,
    /// from both adjacency tables. Returns how many were removed.
    pub fn remove_edges_where<F>(&mut self, id: &str, direction: Direction, predicate: F) -> usize
    where
        F: Fn(&GraphEdge) -> bool,
    {
        let mut removed: HashSet<GraphEdge> = HashSet::new();
        let mut count = 0;

        let mut take = |list: &mut Vec<GraphEdge>, skip_self_loops: bool| {
            list.retain(|edge| {
                if skip_self_loops && edge.from == edge.to {
                    return true;
                }
                if predicate(edge) {
                    removed.insert(edge.clone());
                    count += 1;
                    false
                } else {
                    true
                }
            });
        };

        if direction.includes_outgoing() {
            if let Some(list) = self.outgoing.get_mut(id) {
                take(list, false);
            }
        }
        if direction.includes_incoming() {
            // Self-loops were already taken from the outgoing side.
            if let Some(list) = self.incoming.get_mut(id) {
                take(list, direction.includes_outgoing());
            }
        }

        if removed.is_empty() {
            return 0;
        }

        // Mirror the removal on the other endpoint of each edge.
        let endpoints: HashSet<NodeId> = removed
            .iter()
            .flat_map(|edge| [edge.from.clone(), edge.to.clone()])
            .collect();

        for endpoint in &endpoints {
            if let Some(list) = self.outgoing.get_mut(endpoint) {
                list.retain(|edge| !removed.contains(edge));
            }
            if let Some(list) = self.incoming.get_mut(endpoint) {
                list.retain(|edge| !removed.contains(edge));
            }
        }

        debug!("Removed {} edges at {} ({})", count, id, direction);
        count
    }

    /// Returns true if a node with this id is registered.
    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Gets a node by id.
    pub fn get_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(Vec::len).sum()
    }

    /// Iterates over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Iterates over all edges.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.outgoing.values().flatten()
    }

    /// Drops everything, e.g. before a full vault reload.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.outgoing.clear();
        self.incoming.clear();
    }

    /// Returns all edges in a stable order for export.
    ///
    /// Sources are sorted by id; each source keeps its insertion order.
    pub fn export_edges(&self) -> Vec<GraphEdge> {
        let mut sources: Vec<&NodeId> = self.outgoing.keys().collect();
        sources.sort();

        sources
            .into_iter()
            .flat_map(|id| self.outgoing[id].iter().cloned())
            .collect()
    }

    /// Removes non-note nodes that no longer carry any relationship:
    /// tags, people and headings nothing points at, and folders that
    /// contain nothing. Repeats until stable so emptied parent folders go
    /// too. Returns the number of nodes removed.
    pub fn prune_orphans(&mut self) -> usize {
        let mut total = 0;

        loop {
            let orphans: Vec<NodeId> = self
                .nodes
                .values()
                .filter(|node| self.is_orphan(node))
                .map(|node| node.id.clone())
                .collect();

            if orphans.is_empty() {
                break;
            }

            for id in &orphans {
                self.remove_node(id.as_str());
            }
            total += orphans.len();
        }

        if total > 0 {
            debug!("Pruned {} orphaned nodes", total);
        }
        total
    }

    fn is_orphan(&self, node: &GraphNode) -> bool {
        let has_outgoing = self.outgoing.get(&node.id).is_some_and(|l| !l.is_empty());
        let has_incoming = self.incoming.get(&node.id).is_some_and(|l| !l.is_empty());

        match node.entity_type {
            EntityType::Note => false,
            EntityType::Folder => !has_outgoing,
            EntityType::Tag | EntityType::Person | EntityType::Heading => {
                !has_outgoing && !has_incoming
            }
        }
    }
}

/// Index statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_type: BTreeMap<EntityType, usize>,
    pub edges_by_type: BTreeMap<EdgeType, usize>,
}

impl GraphIndex {
    /// Returns index statistics.
    pub fn stats(&self) -> GraphStats {
        let mut nodes_by_type = BTreeMap::new();
        for node in self.nodes.values() {
            *nodes_by_type.entry(node.entity_type).or_insert(0) += 1;
        }

        let mut edges_by_type = BTreeMap::new();
        for edge in self.edges() {
            *edges_by_type.entry(edge.edge_type).or_insert(0) += 1;
        }

        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            nodes_by_type,
            edges_by_type,
        }
    }
}
