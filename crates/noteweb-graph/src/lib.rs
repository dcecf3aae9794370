//! Noteweb Graph - typed relationship index for a knowledge vault
//!
//! This crate keeps a bidirectional index of how notes relate to tags,
//! people, folders, headings and each other. It answers "what links
//! here", "what carries this tag" and "what is in this folder" without
//! rescanning documents.
//!
//! # Architecture
//!
//! The index is three hash maps: the node table, outgoing adjacency and
//! incoming adjacency. On top of it sit:
//! - Identity: deterministic `kind:key` node ids
//! - The edge builder, which resolves a parsed note's references through
//!   registries and records only the ones that resolve
//! - Read-only queries and traversal
//!
//! # Example
//!
//! ```
//! use noteweb_core::ParsedNote;
//! use noteweb_graph::{BuildContext, BuildOptions, GraphIndex, VaultRegistry};
//!
//! let mut registry = VaultRegistry::new();
//! registry.register_note("notes/A");
//!
//! let options = BuildOptions::default();
//! let ctx = BuildContext::from_registry(&registry, &options);
//!
//! let mut graph = GraphIndex::new();
//! let b = ParsedNote::new("notes/B", "notes/B.md").with_link("A");
//! graph.build_edges_for_note(&b, &ctx).unwrap();
//!
//! let backlinks = graph.get_backlinks("note:notes/A");
//! assert_eq!(backlinks[0].from, "note:notes/B");
//! ```

mod builder;
mod edge;
mod error;
mod graph;
mod node;
mod query;
mod registry;
mod traversal;

pub use builder::{BuildContext, BuildOptions, GraphBuilder};
pub use edge::{Direction, EdgeType, GraphEdge};
pub use error::{GraphError, Result};
pub use graph::{GraphIndex, GraphStats};
pub use node::{
    heading_ref, normalize_folder, normalize_heading, normalize_tag, EntityType, GraphNode,
    NodeId,
};
pub use query::NeighborFilter;
pub use registry::{
    FolderRegistry, HeadingRegistry, NoteRegistry, PeopleRegistry, RegistryConfig, VaultRegistry,
};
pub use traversal::{LocalGraph, ReachedNode};
