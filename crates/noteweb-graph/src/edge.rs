//! Edge types for the relationship index.
//!
//! The set of relationship kinds is closed. Adding one means adding a
//! variant here, and every exhaustive match below points at what else
//! has to learn about it.

use crate::node::{EntityType, NodeId};
use serde::{Deserialize, Serialize};

/// The type of relationship between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeType {
    /// Note A contains a wiki link to note B.
    NoteLinksNote,

    /// Note A transcludes note B.
    NoteEmbedsNote,

    /// Note carries a tag.
    NoteHasTag,

    /// Note mentions a known person.
    NoteMentionsPerson,

    /// Note links to a heading inside another (or the same) note.
    NoteLinksHeading,

    /// Folder directly holds a note.
    FolderContainsNote,

    /// Folder directly holds a subfolder.
    FolderContainsFolder,
}

impl EdgeType {
    pub const ALL: [EdgeType; 7] = [
        EdgeType::NoteLinksNote,
        EdgeType::NoteEmbedsNote,
        EdgeType::NoteHasTag,
        EdgeType::NoteMentionsPerson,
        EdgeType::NoteLinksHeading,
        EdgeType::FolderContainsNote,
        EdgeType::FolderContainsFolder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoteLinksNote => "note-links-note",
            Self::NoteEmbedsNote => "note-embeds-note",
            Self::NoteHasTag => "note-has-tag",
            Self::NoteMentionsPerson => "note-mentions-person",
            Self::NoteLinksHeading => "note-links-heading",
            Self::FolderContainsNote => "folder-contains-note",
            Self::FolderContainsFolder => "folder-contains-folder",
        }
    }

    /// Kind of entity at the `from` end.
    pub fn source_entity(&self) -> EntityType {
        match self {
            Self::NoteLinksNote
            | Self::NoteEmbedsNote
            | Self::NoteHasTag
            | Self::NoteMentionsPerson
            | Self::NoteLinksHeading => EntityType::Note,
            Self::FolderContainsNote | Self::FolderContainsFolder => EntityType::Folder,
        }
    }

    /// Kind of entity at the `to` end.
    pub fn target_entity(&self) -> EntityType {
        match self {
            Self::NoteLinksNote | Self::NoteEmbedsNote | Self::FolderContainsNote => {
                EntityType::Note
            }
            Self::NoteHasTag => EntityType::Tag,
            Self::NoteMentionsPerson => EntityType::Person,
            Self::NoteLinksHeading => EntityType::Heading,
            Self::FolderContainsFolder => EntityType::Folder,
        }
    }

    /// Links and embeds both count as "references this note".
    pub fn is_backlink(&self) -> bool {
        match self {
            Self::NoteLinksNote | Self::NoteEmbedsNote => true,
            Self::NoteHasTag
            | Self::NoteMentionsPerson
            | Self::NoteLinksHeading
            | Self::FolderContainsNote
            | Self::FolderContainsFolder => false,
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed, typed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

impl GraphEdge {
    pub fn new(from: NodeId, to: NodeId, edge_type: EdgeType) -> Self {
        Self {
            from,
            to,
            edge_type,
        }
    }

    /// True if either endpoint is `id`.
    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }

    /// The endpoint that is not `id`. For self-loops this is `id` itself.
    pub fn other_end(&self, id: &str) -> &NodeId {
        if self.from == id {
            &self.to
        } else {
            &self.from
        }
    }
}

/// Which adjacency list(s) an operation looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
    #[default]
    Both,
}

impl Direction {
    pub fn includes_outgoing(&self) -> bool {
        matches!(self, Direction::Outgoing | Direction::Both)
    }

    pub fn includes_incoming(&self) -> bool {
        matches!(self, Direction::Incoming | Direction::Both)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Outgoing => write!(f, "outgoing"),
            Direction::Incoming => write!(f, "incoming"),
            Direction::Both => write!(f, "both"),
        }
    }
}
