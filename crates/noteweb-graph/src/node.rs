//! Node identity.
//!
//! Every indexed entity gets a `NodeId` of the form `kind:key`, where the
//! key is the entity's natural key in its own namespace. The id is a pure
//! function of those two parts, so re-indexing the same vault always
//! reproduces the same ids.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// The kind of entity a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Note,
    Tag,
    Person,
    Folder,
    Heading,
}

impl EntityType {
    pub const ALL: [EntityType; 5] = [
        EntityType::Note,
        EntityType::Tag,
        EntityType::Person,
        EntityType::Folder,
        EntityType::Heading,
    ];

    /// The id prefix for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Note => "note",
            EntityType::Tag => "tag",
            EntityType::Person => "person",
            EntityType::Folder => "folder",
            EntityType::Heading => "heading",
        }
    }

    /// Parses an id prefix back into a kind.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == prefix)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Globally unique node identifier: `entityType:refId`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Builds the id for a natural key.
    pub fn new(entity_type: EntityType, ref_id: &str) -> Self {
        Self(format!("{}:{}", entity_type.as_str(), ref_id))
    }

    /// Parses a prefixed id, rejecting unknown kinds and blank keys.
    pub fn parse(value: &str) -> Result<Self> {
        match value.split_once(':') {
            Some((prefix, key))
                if EntityType::from_prefix(prefix).is_some() && !key.trim().is_empty() =>
            {
                Ok(Self(value.to_string()))
            }
            _ => Err(GraphError::MalformedNodeId(value.to_string())),
        }
    }

    /// Accepts either a bare natural key or an id already carrying the
    /// `entity_type` prefix.
    pub fn coerce(entity_type: EntityType, value: &str) -> Self {
        let prefixed = value
            .strip_prefix(entity_type.as_str())
            .is_some_and(|rest| rest.starts_with(':'));
        if prefixed {
            Self(value.to_string())
        } else {
            Self::new(entity_type, value)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The kind encoded in the prefix.
    pub fn entity_type(&self) -> Option<EntityType> {
        self.0
            .split_once(':')
            .and_then(|(prefix, _)| EntityType::from_prefix(prefix))
    }

    /// The natural key after the prefix.
    pub fn ref_id(&self) -> &str {
        self.0.split_once(':').map(|(_, key)| key).unwrap_or(&self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// An entity stored in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub entity_type: EntityType,
    /// Natural key within the entity's namespace.
    pub ref_id: String,
}

impl GraphNode {
    pub fn new(entity_type: EntityType, ref_id: impl Into<String>) -> Self {
        let ref_id = ref_id.into();
        Self {
            id: NodeId::new(entity_type, &ref_id),
            entity_type,
            ref_id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Natural key normalization
// ─────────────────────────────────────────────────────────────────────────────

/// `#Planning ` becomes `planning`.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').trim().to_lowercase()
}

/// `## Next  Steps` becomes `next-steps`.
pub fn normalize_heading(text: &str) -> String {
    text.trim()
        .trim_start_matches('#')
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// `/notes/2025/` becomes `notes/2025`. A path made only of slashes and
/// whitespace becomes empty.
pub fn normalize_folder(path: &str) -> String {
    path.trim_matches(|c: char| c == '/' || c.is_whitespace())
        .to_string()
}

/// Natural key of a heading node: `<noteId>#<normalizedHeading>`.
pub fn heading_ref(note_id: &str, heading: &str) -> String {
    format!("{}#{}", note_id, normalize_heading(heading))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_format() {
        assert_eq!(NodeId::new(EntityType::Note, "notes/Target"), "note:notes/Target");
        assert_eq!(NodeId::new(EntityType::Tag, "planning"), "tag:planning");
        assert_eq!(
            NodeId::new(EntityType::Heading, &heading_ref("notes/Target", "Overview")),
            "heading:notes/Target#overview"
        );
    }

    #[test]
    fn test_node_id_is_pure() {
        let a = NodeId::new(EntityType::Person, "Erik");
        let b = NodeId::new(EntityType::Person, "Erik");
        assert_eq!(a, b);
    }

    #[test]
    fn test_node_id_parts() {
        let id = NodeId::new(EntityType::Folder, "notes/2025");
        assert_eq!(id.entity_type(), Some(EntityType::Folder));
        assert_eq!(id.ref_id(), "notes/2025");
    }

    #[test]
    fn test_coerce_accepts_bare_and_prefixed() {
        assert_eq!(NodeId::coerce(EntityType::Note, "notes/Plan"), "note:notes/Plan");
        assert_eq!(NodeId::coerce(EntityType::Note, "note:notes/Plan"), "note:notes/Plan");
        // "notebook" is not a "note:" prefix
        assert_eq!(NodeId::coerce(EntityType::Note, "notebook"), "note:notebook");
    }

    #[test]
    fn test_parse_validates() {
        assert!(NodeId::parse("tag:planning").is_ok());
        assert_eq!(
            NodeId::parse("widget:x"),
            Err(GraphError::MalformedNodeId("widget:x".to_string()))
        );
        assert!(NodeId::parse("note:").is_err());
        assert!(NodeId::parse("planning").is_err());
    }

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_tag(" #Planning "), "planning");
        assert_eq!(normalize_heading("## Next  Steps "), "next-steps");
        assert_eq!(normalize_folder("/notes/2025/"), "notes/2025");
        assert_eq!(normalize_folder("/ /"), "");
    }

    #[test]
    fn test_graph_node_new() {
        let node = GraphNode::new(EntityType::Tag, "goals");
        assert_eq!(node.id, "tag:goals");
        assert_eq!(node.entity_type, EntityType::Tag);
        assert_eq!(node.ref_id, "goals");
    }
}
