use crate::node::EntityType;
use thiserror::Error;

/// Faults reported by the index.
///
/// Missing nodes are not errors; only malformed identity input is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Empty {0} reference: a {0} node needs a non-blank key")]
    EmptyRefId(EntityType),
    #[error("Malformed node id: {0:?}")]
    MalformedNodeId(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
