//! Read-only queries over the index.
//!
//! Nothing here mutates, and nothing fails for an unknown id: the answer
//! is simply empty (or `None`).

use crate::edge::{Direction, EdgeType, GraphEdge};
use crate::graph::GraphIndex;
use crate::node::{normalize_folder, normalize_tag, EntityType, GraphNode, NodeId};
use std::collections::HashSet;

/// Optional filters for `get_neighbors_filtered`. All given filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborFilter {
    /// Only follow edges of these types.
    pub edge_types: Option<Vec<EdgeType>>,
    /// Which adjacency lists to walk.
    pub direction: Direction,
    /// Only return neighbors of these kinds.
    pub entity_types: Option<Vec<EntityType>>,
}

impl NeighborFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge_types(mut self, types: impl IntoIterator<Item = EdgeType>) -> Self {
        self.edge_types = Some(types.into_iter().collect());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn entity_types(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.entity_types = Some(types.into_iter().collect());
        self
    }
}

impl GraphIndex {
    /// Edges leaving `id`, in insertion order.
    pub fn get_outgoing_edges(&self, id: &str) -> &[GraphEdge] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Edges arriving at `id`, in insertion order.
    pub fn get_incoming_edges(&self, id: &str) -> &[GraphEdge] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every node connected to `id` by an edge in either direction, once each.
    pub fn get_neighbors(&self, id: &str) -> Vec<NodeId> {
        self.get_neighbors_filtered(id, &NeighborFilter::default())
    }

    /// Edges of exactly `edge_type` touching `id` in `direction`.
    pub fn get_edges_by_type(
        &self,
        id: &str,
        edge_type: EdgeType,
        direction: Direction,
    ) -> Vec<&GraphEdge> {
        self.edges_in(id, direction)
            .filter(|edge| edge.edge_type == edge_type)
            .collect()
    }

    /// Incoming links and embeds: "what references this note".
    pub fn get_backlinks(&self, id: &str) -> Vec<&GraphEdge> {
        self.get_incoming_edges(id)
            .iter()
            .filter(|edge| edge.edge_type.is_backlink())
            .collect()
    }

    /// Outgoing links and embeds: "what this note references".
    pub fn get_forward_links(&self, id: &str) -> Vec<&GraphEdge> {
        self.get_outgoing_edges(id)
            .iter()
            .filter(|edge| edge.edge_type.is_backlink())
            .collect()
    }

    /// Neighbors of `id` restricted by edge type, direction and the kind of
    /// entity at the far end.
    pub fn get_neighbors_filtered(&self, id: &str, filter: &NeighborFilter) -> Vec<NodeId> {
        let mut seen: HashSet<&NodeId> = HashSet::new();
        let mut result = Vec::new();

        for edge in self.edges_in(id, filter.direction) {
            if let Some(types) = &filter.edge_types {
                if !types.contains(&edge.edge_type) {
                    continue;
                }
            }

            let other = edge.other_end(id);
            if let Some(kinds) = &filter.entity_types {
                match self.entity_type_of(other) {
                    Some(kind) if kinds.contains(&kind) => {}
                    _ => continue,
                }
            }

            if seen.insert(other) {
                result.push(other.clone());
            }
        }

        result
    }

    // ── Tags ────────────────────────────────────────────────────────────────

    /// Notes carrying a tag. Accepts `planning`, `#planning` or `tag:planning`.
    pub fn get_notes_with_tag(&self, tag: &str) -> Vec<NodeId> {
        let id = tag_id(tag);
        self.sources(&id, EdgeType::NoteHasTag)
    }

    /// Tags on a note. Accepts a note id with or without the `note:` prefix.
    pub fn get_tags_for_note(&self, note: &str) -> Vec<NodeId> {
        let id = NodeId::coerce(EntityType::Note, note);
        self.targets(&id, EdgeType::NoteHasTag)
    }

    // ── People ──────────────────────────────────────────────────────────────

    /// Notes mentioning a person. Accepts `Erik`, `@erik` or `person:Erik`;
    /// an exact name wins over a case-insensitive match.
    pub fn get_notes_for_person(&self, person: &str) -> Vec<NodeId> {
        match self.person_id(person) {
            Some(id) => self.sources(&id, EdgeType::NoteMentionsPerson),
            None => Vec::new(),
        }
    }

    /// People mentioned by a note.
    pub fn get_people_for_note(&self, note: &str) -> Vec<NodeId> {
        let id = NodeId::coerce(EntityType::Note, note);
        self.targets(&id, EdgeType::NoteMentionsPerson)
    }

    // ── Folders ─────────────────────────────────────────────────────────────

    /// Notes directly inside a folder.
    pub fn get_notes_in_folder(&self, folder: &str) -> Vec<NodeId> {
        let id = folder_id(folder);
        self.targets(&id, EdgeType::FolderContainsNote)
    }

    /// The folder holding a note, or `None` for notes at the vault root.
    pub fn get_folder_for_note(&self, note: &str) -> Option<NodeId> {
        let id = NodeId::coerce(EntityType::Note, note);
        self.sources(&id, EdgeType::FolderContainsNote)
            .into_iter()
            .next()
    }

    /// Folders directly inside a folder.
    pub fn get_subfolders(&self, folder: &str) -> Vec<NodeId> {
        let id = folder_id(folder);
        self.targets(&id, EdgeType::FolderContainsFolder)
    }

    /// The folder containing a folder, or `None` at the top level.
    pub fn get_parent_folder(&self, folder: &str) -> Option<NodeId> {
        let id = folder_id(folder);
        self.sources(&id, EdgeType::FolderContainsFolder)
            .into_iter()
            .next()
    }

    // ── Search ──────────────────────────────────────────────────────────────

    /// Nodes whose natural key contains `query`, ignoring case, sorted by id.
    pub fn find_nodes(&self, query: &str, entity_type: Option<EntityType>) -> Vec<&GraphNode> {
        let query_lower = query.to_lowercase();
        let mut matches: Vec<&GraphNode> = self
            .nodes
            .values()
            .filter(|node| entity_type.map_or(true, |kind| node.entity_type == kind))
            .filter(|node| node.ref_id.to_lowercase().contains(&query_lower))
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        matches
    }

    // ── Helpers ─────────────────────────────────────────────────────────────

    pub(crate) fn edges_in<'a>(
        &'a self,
        id: &str,
        direction: Direction,
    ) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        let outgoing: &[GraphEdge] = if direction.includes_outgoing() {
            self.get_outgoing_edges(id)
        } else {
            &[]
        };
        let incoming: &[GraphEdge] = if direction.includes_incoming() {
            self.get_incoming_edges(id)
        } else {
            &[]
        };
        outgoing.iter().chain(incoming.iter())
    }

    fn person_id(&self, person: &str) -> Option<NodeId> {
        let name = person.trim();
        let name = name.strip_prefix("person:").unwrap_or(name);
        let name = name.trim().trim_start_matches('@').trim();
        if name.is_empty() {
            return None;
        }

        let exact = NodeId::new(EntityType::Person, name);
        if self.has_node(exact.as_str()) {
            return Some(exact);
        }

        let lowered = name.to_lowercase();
        self.nodes
            .values()
            .filter(|node| node.entity_type == EntityType::Person)
            .filter(|node| node.ref_id.to_lowercase() == lowered)
            .map(|node| node.id.clone())
            .min()
    }

    fn entity_type_of(&self, id: &NodeId) -> Option<EntityType> {
        self.nodes
            .get(id)
            .map(|node| node.entity_type)
            .or_else(|| id.entity_type())
    }

    /// `from` ends of incoming edges of one type.
    fn sources(&self, id: &NodeId, edge_type: EdgeType) -> Vec<NodeId> {
        self.get_incoming_edges(id.as_str())
            .iter()
            .filter(|edge| edge.edge_type == edge_type)
            .map(|edge| edge.from.clone())
            .collect()
    }

    /// `to` ends of outgoing edges of one type.
    fn targets(&self, id: &NodeId, edge_type: EdgeType) -> Vec<NodeId> {
        self.get_outgoing_edges(id.as_str())
            .iter()
            .filter(|edge| edge.edge_type == edge_type)
            .map(|edge| edge.to.clone())
            .collect()
    }
}

fn tag_id(tag: &str) -> NodeId {
    let tag = tag.trim();
    let key = tag.strip_prefix("tag:").unwrap_or(tag);
    NodeId::new(EntityType::Tag, &normalize_tag(key))
}

fn folder_id(folder: &str) -> NodeId {
    let folder = folder.trim();
    let key = folder.strip_prefix("folder:").unwrap_or(folder);
    NodeId::new(EntityType::Folder, &normalize_folder(key))
}
