//! Edge construction from parsed notes.
//!
//! `build_edges_for_note` turns one note's extracted relationships into
//! graph mutations. Every reference goes through a resolver first; a
//! reference that does not resolve produces neither a node nor an edge,
//! so the index only ever reflects confirmed relationships.

use crate::edge::{Direction, EdgeType, GraphEdge};
use crate::error::{GraphError, Result};
use crate::graph::GraphIndex;
use crate::node::{
    heading_ref, normalize_folder, normalize_heading, normalize_tag, EntityType, GraphNode,
    NodeId,
};
use crate::registry::{
    FolderRegistry, HeadingRegistry, NoteRegistry, PeopleRegistry, RegistryConfig, VaultRegistry,
};
use noteweb_core::ParsedNote;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, trace};

/// Edge construction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Also link each folder to its parent with `folder-contains-folder`.
    pub folder_hierarchy: bool,
    /// Emit each `(from, to, type)` at most once per note build.
    pub dedupe_edges: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            folder_hierarchy: true,
            dedupe_edges: true,
        }
    }
}

/// Read-only resolvers handed to the edge builder.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub notes: &'a dyn NoteRegistry,
    pub headings: &'a dyn HeadingRegistry,
    pub people: &'a dyn PeopleRegistry,
    pub folders: &'a dyn FolderRegistry,
    pub options: &'a BuildOptions,
}

impl<'a> BuildContext<'a> {
    /// Uses one registry for all four lookups.
    pub fn from_registry<R>(registry: &'a R, options: &'a BuildOptions) -> Self
    where
        R: NoteRegistry + HeadingRegistry + PeopleRegistry + FolderRegistry,
    {
        Self {
            notes: registry,
            headings: registry,
            people: registry,
            folders: registry,
            options,
        }
    }
}

/// Edges produced by one build call, deduplicated when asked to.
struct EdgeBatch {
    seen: HashSet<GraphEdge>,
    dedupe: bool,
    added: usize,
}

impl EdgeBatch {
    fn new(dedupe: bool) -> Self {
        Self {
            seen: HashSet::new(),
            dedupe,
            added: 0,
        }
    }

    fn push(&mut self, graph: &mut GraphIndex, edge: GraphEdge) {
        if self.dedupe && !self.seen.insert(edge.clone()) {
            return;
        }
        graph.add_edge(edge);
        self.added += 1;
    }
}

impl GraphIndex {
    /// Ensures a node exists for a note id and returns its `NodeId`.
    pub fn ensure_note_node(&mut self, note_id: &str) -> Result<NodeId> {
        self.ensure_node(EntityType::Note, note_id.trim())
    }

    /// Ensures a node exists for a tag. `#Planning` and `planning` are the same tag.
    pub fn ensure_tag_node(&mut self, tag: &str) -> Result<NodeId> {
        self.ensure_node(EntityType::Tag, &normalize_tag(tag))
    }

    /// Ensures a node exists for a person.
    pub fn ensure_person_node(&mut self, name: &str) -> Result<NodeId> {
        self.ensure_node(EntityType::Person, name.trim())
    }

    /// Ensures a node exists for a folder path.
    pub fn ensure_folder_node(&mut self, path: &str) -> Result<NodeId> {
        self.ensure_node(EntityType::Folder, &normalize_folder(path))
    }

    /// Ensures a node exists for a heading inside a note.
    pub fn ensure_heading_node(&mut self, note_id: &str, heading: &str) -> Result<NodeId> {
        let note_id = note_id.trim();
        if note_id.is_empty() || normalize_heading(heading).is_empty() {
            return Err(GraphError::EmptyRefId(EntityType::Heading));
        }
        self.ensure_node(EntityType::Heading, &heading_ref(note_id, heading))
    }

    fn ensure_node(&mut self, entity_type: EntityType, ref_id: &str) -> Result<NodeId> {
        if ref_id.is_empty() {
            return Err(GraphError::EmptyRefId(entity_type));
        }

        let id = NodeId::new(entity_type, ref_id);
        if !self.has_node(id.as_str()) {
            self.add_node(GraphNode::new(entity_type, ref_id));
        }
        Ok(id)
    }

    /// Adds the nodes and edges describing one note's relationships.
    ///
    /// Steps run in a fixed order: folder containment, tags, person
    /// mentions, note links, heading links, embeds. Returns the note's id.
    pub fn build_edges_for_note(
        &mut self,
        note: &ParsedNote,
        ctx: &BuildContext<'_>,
    ) -> Result<NodeId> {
        let note_id = self.ensure_note_node(&note.id)?;
        let mut batch = EdgeBatch::new(ctx.options.dedupe_edges);

        // 1. Folder containment
        if let Some(folder) = note.folder() {
            match self.ensure_folder_node(folder) {
                Ok(folder_id) => {
                    batch.push(
                        self,
                        GraphEdge::new(folder_id, note_id.clone(), EdgeType::FolderContainsNote),
                    );
                    if ctx.options.folder_hierarchy {
                        self.link_folder_chain(folder, ctx.folders);
                    }
                }
                Err(_) => trace!("Skipping blank folder of {}", note.id),
            }
        }

        // 2. Tags
        for tag in &note.all_tags {
            let Ok(tag_id) = self.ensure_tag_node(tag) else {
                debug!("Skipping blank tag in {}", note.id);
                continue;
            };
            batch.push(
                self,
                GraphEdge::new(note_id.clone(), tag_id, EdgeType::NoteHasTag),
            );
        }

        // 3. Person mentions
        for mention in &note.people_mentions {
            if mention.person_name.trim().is_empty() {
                debug!("Skipping blank mention in {}", note.id);
                continue;
            }
            let resolved = ctx.people.resolve_person(&mention.person_name);
            let Some(person_id) = resolved.and_then(|p| self.ensure_person_node(&p).ok()) else {
                trace!("Unresolved mention @{} in {}", mention.person_name, note.id);
                continue;
            };
            batch.push(
                self,
                GraphEdge::new(note_id.clone(), person_id, EdgeType::NoteMentionsPerson),
            );
        }

        // 4. Note links
        for link in note.links.iter().filter(|l| !l.is_same_note()) {
            let resolved = ctx.notes.resolve_note(&link.note_name);
            let Some(target_id) = resolved.and_then(|t| self.ensure_note_node(&t).ok()) else {
                trace!("Unresolved link [[{}]] in {}", link.note_name, note.id);
                continue;
            };
            batch.push(
                self,
                GraphEdge::new(note_id.clone(), target_id, EdgeType::NoteLinksNote),
            );
        }

        // 5. Heading links
        for link in &note.links {
            let Some(heading) = link.heading() else {
                continue;
            };
            let target = if link.is_same_note() {
                Some(note.id.trim().to_string())
            } else {
                ctx.notes.resolve_note(&link.note_name)
            };
            let Some(target) = target.filter(|t| !t.trim().is_empty()) else {
                trace!("Unresolved heading link [[{}#{}]] in {}", link.note_name, heading, note.id);
                continue;
            };
            if !ctx.headings.has_heading(&target, heading) {
                trace!("Unresolved heading [[{}#{}]] in {}", target, heading, note.id);
                continue;
            }
            let Ok(heading_id) = self.ensure_heading_node(&target, heading) else {
                trace!("Skipping blank heading [[{}#{}]] in {}", target, heading, note.id);
                continue;
            };
            if self.ensure_note_node(&target).is_err() {
                continue;
            }
            batch.push(
                self,
                GraphEdge::new(note_id.clone(), heading_id, EdgeType::NoteLinksHeading),
            );
        }

        // 6. Embeds
        for embed in &note.embeds {
            let resolved = ctx.notes.resolve_note(&embed.note_name);
            let Some(target_id) = resolved.and_then(|t| self.ensure_note_node(&t).ok()) else {
                trace!("Unresolved embed ![[{}]] in {}", embed.note_name, note.id);
                continue;
            };
            batch.push(
                self,
                GraphEdge::new(note_id.clone(), target_id, EdgeType::NoteEmbedsNote),
            );
        }

        debug!("Built {} edges for {}", batch.added, note_id);
        Ok(note_id)
    }

    /// Rebuilds one note's relationships after an edit.
    ///
    /// Clears everything the note's own build produced (its outgoing edges
    /// and the folder edge into it) and builds again. Edges other notes
    /// hold into this note are kept.
    pub fn reindex_note(&mut self, note: &ParsedNote, ctx: &BuildContext<'_>) -> Result<NodeId> {
        let note_id = self.ensure_note_node(&note.id)?;
        let id = note_id.as_str();

        self.remove_edges_where(id, Direction::Outgoing, |_| true);
        self.remove_edges_where(id, Direction::Incoming, |edge| {
            edge.edge_type == EdgeType::FolderContainsNote
        });

        self.build_edges_for_note(note, ctx)
    }

    /// Adds any missing `folder-contains-folder` edges from `folder` up to
    /// the top of the hierarchy.
    fn link_folder_chain(&mut self, folder: &str, folders: &dyn FolderRegistry) {
        let mut child = normalize_folder(folder);
        let mut visited = HashSet::from([child.clone()]);

        while let Some(parent) = folders.parent_folder(&child) {
            let parent = normalize_folder(&parent);
            if parent.is_empty() || !visited.insert(parent.clone()) {
                break;
            }

            let (Ok(parent_id), Ok(child_id)) =
                (self.ensure_folder_node(&parent), self.ensure_folder_node(&child))
            else {
                break;
            };
            if !self.has_edge(parent_id.as_str(), child_id.as_str(), EdgeType::FolderContainsFolder)
            {
                self.add_edge(GraphEdge::new(
                    parent_id,
                    child_id,
                    EdgeType::FolderContainsFolder,
                ));
            }
            child = parent;
        }
    }
}

/// Builds a `GraphIndex` for a whole vault.
///
/// Register every note first, then build edges, so links between notes
/// resolve regardless of scan order.
pub struct GraphBuilder {
    graph: GraphIndex,
    registry: VaultRegistry,
    options: BuildOptions,
    pending: VecDeque<ParsedNote>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default(), BuildOptions::default())
    }

    /// Creates a builder with custom registry and build settings.
    pub fn with_config(registry: RegistryConfig, options: BuildOptions) -> Self {
        Self {
            graph: GraphIndex::new(),
            registry: VaultRegistry::with_config(registry),
            options,
            pending: VecDeque::new(),
        }
    }

    /// Builds directly from a parsed corpus.
    pub fn from_notes(
        notes: Vec<ParsedNote>,
        registry: RegistryConfig,
        options: BuildOptions,
    ) -> Result<GraphIndex> {
        let mut builder = Self::with_config(registry, options);
        builder.add_notes(notes);
        builder.build()
    }

    /// Queues a note and registers it with the resolvers.
    pub fn add_note(&mut self, note: ParsedNote) {
        self.registry.register_parsed(&note);
        self.pending.push_back(note);
    }

    /// Queues several notes.
    pub fn add_notes(&mut self, notes: impl IntoIterator<Item = ParsedNote>) {
        for note in notes {
            self.add_note(note);
        }
    }

    /// Read access to the registry built so far.
    pub fn registry(&self) -> &VaultRegistry {
        &self.registry
    }

    /// Builds edges for one queued note at a time; useful for progress
    /// reporting. Returns `None` once every queued note is built.
    pub fn build_next(&mut self) -> Option<Result<NodeId>> {
        let note = self.pending.pop_front()?;
        let ctx = BuildContext::from_registry(&self.registry, &self.options);
        Some(self.graph.build_edges_for_note(&note, &ctx))
    }

    /// Number of notes still waiting for their edges.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Finishes building and returns the index.
    pub fn build(mut self) -> Result<GraphIndex> {
        while let Some(result) = self.build_next() {
            result?;
        }
        debug!(
            "Built index: {} nodes, {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        );
        Ok(self.graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(notes: &[&str]) -> VaultRegistry {
        let mut registry = VaultRegistry::new();
        for id in notes {
            registry.register_note(id);
        }
        registry
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let mut graph = GraphIndex::new();

        let first = graph.ensure_tag_node("planning").unwrap();
        let count = graph.node_count();
        let second = graph.ensure_tag_node("#Planning").unwrap();

        assert_eq!(first, second);
        assert_eq!(graph.node_count(), count);
    }

    #[test]
    fn test_ensure_rejects_blank_keys() {
        let mut graph = GraphIndex::new();

        assert_eq!(
            graph.ensure_note_node("  "),
            Err(GraphError::EmptyRefId(EntityType::Note))
        );
        assert_eq!(
            graph.ensure_tag_node("#"),
            Err(GraphError::EmptyRefId(EntityType::Tag))
        );
        assert_eq!(
            graph.ensure_heading_node("notes/A", " "),
            Err(GraphError::EmptyRefId(EntityType::Heading))
        );
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_ensure_keeps_existing_adjacency() {
        let mut graph = GraphIndex::new();
        let a = graph.ensure_note_node("A").unwrap();
        let b = graph.ensure_note_node("B").unwrap();
        graph.add_edge(GraphEdge::new(a, b, EdgeType::NoteLinksNote));

        graph.ensure_note_node("A").unwrap();

        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_heading_node_ref() {
        let mut graph = GraphIndex::new();
        let id = graph.ensure_heading_node("notes/Target", "Overview").unwrap();
        assert_eq!(id, "heading:notes/Target#overview");
        assert_eq!(
            graph.get_node(id.as_str()).map(|n| n.ref_id.as_str()),
            Some("notes/Target#overview")
        );
    }

    #[test]
    fn test_build_skips_unresolved() {
        let registry = registry_with(&["notes/A"]);
        let options = BuildOptions::default();
        let ctx = BuildContext::from_registry(&registry, &options);

        let note = ParsedNote::new("Inbox", "Inbox.md")
            .with_link("Missing")
            .with_embed("image.png")
            .with_mention("Nobody")
            .with_heading_link("A", "Nowhere");

        let mut graph = GraphIndex::new();
        graph.build_edges_for_note(&note, &ctx).unwrap();

        // Only the source note and the resolved link target exist.
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge("note:Inbox", "note:notes/A", EdgeType::NoteLinksNote));
    }

    #[test]
    fn test_build_dedupes_within_one_call() {
        let registry = registry_with(&["notes/A"]);
        let options = BuildOptions::default();
        let ctx = BuildContext::from_registry(&registry, &options);

        let note = ParsedNote::new("notes/B", "notes/B.md")
            .with_link("A")
            .with_link("notes/A")
            .with_tags(["x", "#X"]);

        let mut graph = GraphIndex::new();
        graph.build_edges_for_note(&note, &ctx).unwrap();

        let out = &graph.outgoing["note:notes/B"];
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_build_without_dedupe_keeps_repeats() {
        let registry = registry_with(&["notes/A"]);
        let options = BuildOptions {
            dedupe_edges: false,
            ..Default::default()
        };
        let ctx = BuildContext::from_registry(&registry, &options);

        let note = ParsedNote::new("B", "B.md").with_link("A").with_link("A");

        let mut graph = GraphIndex::new();
        graph.build_edges_for_note(&note, &ctx).unwrap();

        assert_eq!(graph.incoming["note:notes/A"].len(), 2);
    }

    /// Resolves every reference to a blank key.
    struct BlankRegistry;

    impl NoteRegistry for BlankRegistry {
        fn resolve_note(&self, _name: &str) -> Option<String> {
            Some(String::new())
        }
    }

    impl HeadingRegistry for BlankRegistry {
        fn has_heading(&self, _note_id: &str, _heading: &str) -> bool {
            true
        }
    }

    impl PeopleRegistry for BlankRegistry {
        fn resolve_person(&self, _name: &str) -> Option<String> {
            Some(" ".to_string())
        }
    }

    impl FolderRegistry for BlankRegistry {
        fn parent_folder(&self, _folder: &str) -> Option<String> {
            Some("/".to_string())
        }
    }

    #[test]
    fn test_blank_resolutions_are_skipped() {
        let registry = BlankRegistry;
        let options = BuildOptions::default();
        let ctx = BuildContext::from_registry(&registry, &options);

        let note = ParsedNote::new("A", "d/A.md")
            .with_tags(["t"])
            .with_mention("Erik")
            .with_link("B")
            .with_heading_link("B", "Setup")
            .with_embed("C");

        let mut graph = GraphIndex::new();
        let id = graph.build_edges_for_note(&note, &ctx).unwrap();

        assert_eq!(id, "note:A");
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.has_edge("folder:d", "note:A", EdgeType::FolderContainsNote));
        assert!(graph.has_edge("note:A", "tag:t", EdgeType::NoteHasTag));
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_blank_folder_is_skipped() {
        let registry = VaultRegistry::new();
        let options = BuildOptions::default();
        let ctx = BuildContext::from_registry(&registry, &options);

        let note = ParsedNote::new("Plan", "/ /Plan.md").with_tags(["t"]);

        let mut graph = GraphIndex::new();
        graph.build_edges_for_note(&note, &ctx).unwrap();

        assert!(graph.get_folder_for_note("Plan").is_none());
        assert!(graph.has_edge("note:Plan", "tag:t", EdgeType::NoteHasTag));
    }

    #[test]
    fn test_blank_note_id_still_fails() {
        let registry = VaultRegistry::new();
        let options = BuildOptions::default();
        let ctx = BuildContext::from_registry(&registry, &options);

        let mut graph = GraphIndex::new();
        let result = graph.build_edges_for_note(&ParsedNote::new(" ", "x.md"), &ctx);

        assert_eq!(result, Err(GraphError::EmptyRefId(EntityType::Note)));
    }

    #[test]
    fn test_same_note_heading_link() {
        let mut registry = registry_with(&["notes/A"]);
        registry.register_heading("notes/A", "Setup");
        let options = BuildOptions::default();
        let ctx = BuildContext::from_registry(&registry, &options);

        let note = ParsedNote::new("notes/A", "notes/A.md").with_heading_link("", "Setup");

        let mut graph = GraphIndex::new();
        graph.build_edges_for_note(&note, &ctx).unwrap();

        assert!(graph.has_edge(
            "note:notes/A",
            "heading:notes/A#setup",
            EdgeType::NoteLinksHeading
        ));
        assert!(!graph.has_edge("note:notes/A", "note:notes/A", EdgeType::NoteLinksNote));
    }

    #[test]
    fn test_folder_hierarchy() {
        let registry = VaultRegistry::new();
        let options = BuildOptions::default();
        let ctx = BuildContext::from_registry(&registry, &options);

        let mut graph = GraphIndex::new();
        graph
            .build_edges_for_note(&ParsedNote::new("a/b/c/One", "a/b/c/One.md"), &ctx)
            .unwrap();
        graph
            .build_edges_for_note(&ParsedNote::new("a/b/c/Two", "a/b/c/Two.md"), &ctx)
            .unwrap();

        assert!(graph.has_edge("folder:a", "folder:a/b", EdgeType::FolderContainsFolder));
        assert!(graph.has_edge("folder:a/b", "folder:a/b/c", EdgeType::FolderContainsFolder));
        assert_eq!(graph.outgoing["folder:a"].len(), 1);
        assert_eq!(graph.outgoing["folder:a/b/c"].len(), 2);
    }

    #[test]
    fn test_folder_hierarchy_disabled() {
        let registry = VaultRegistry::new();
        let options = BuildOptions {
            folder_hierarchy: false,
            ..Default::default()
        };
        let ctx = BuildContext::from_registry(&registry, &options);

        let mut graph = GraphIndex::new();
        graph
            .build_edges_for_note(&ParsedNote::new("a/b/One", "a/b/One.md"), &ctx)
            .unwrap();

        assert!(graph.has_node("folder:a/b"));
        assert!(!graph.has_node("folder:a"));
    }

    #[test]
    fn test_reindex_keeps_incoming_links() {
        let registry = registry_with(&["A", "B", "C"]);
        let options = BuildOptions::default();
        let ctx = BuildContext::from_registry(&registry, &options);

        let mut graph = GraphIndex::new();
        let a = ParsedNote::new("A", "dir/A.md").with_link("B");
        let b = ParsedNote::new("B", "B.md").with_link("A");
        graph.build_edges_for_note(&a, &ctx).unwrap();
        graph.build_edges_for_note(&b, &ctx).unwrap();

        let edited = ParsedNote::new("A", "dir/A.md").with_link("C");
        graph.reindex_note(&edited, &ctx).unwrap();

        assert!(!graph.has_edge("note:A", "note:B", EdgeType::NoteLinksNote));
        assert!(graph.has_edge("note:A", "note:C", EdgeType::NoteLinksNote));
        assert!(graph.has_edge("note:B", "note:A", EdgeType::NoteLinksNote));
        assert_eq!(graph.incoming["note:A"].len(), 2);
    }

    #[test]
    fn test_graph_builder_resolves_forward_references() {
        let notes = vec![
            ParsedNote::new("notes/B", "notes/B.md").with_link("A"),
            ParsedNote::new("notes/A", "notes/A.md"),
        ];

        let graph =
            GraphBuilder::from_notes(notes, RegistryConfig::default(), BuildOptions::default())
                .unwrap();

        assert!(graph.has_edge("note:notes/B", "note:notes/A", EdgeType::NoteLinksNote));
    }

    #[test]
    fn test_graph_builder_incremental_progress() {
        let mut builder = GraphBuilder::new();
        builder.add_notes(vec![
            ParsedNote::new("A", "A.md"),
            ParsedNote::new("B", "B.md").with_link("A"),
        ]);
        assert_eq!(builder.pending(), 2);
        assert_eq!(builder.registry().note_count(), 2);

        let first = builder.build_next().unwrap().unwrap();
        assert_eq!(first, "note:A");
        assert_eq!(builder.pending(), 1);

        let graph = builder.build().unwrap();
        assert_eq!(graph.edge_count(), 1);
    }
}
