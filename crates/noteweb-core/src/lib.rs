//! Noteweb Core - the parsed-note contract
//!
//! This crate defines what the vault parser hands to the graph index:
//! one `ParsedNote` per document, describing its tags, links, embeds,
//! person mentions and headings. Parsing itself happens elsewhere.
//!
//! # Example
//!
//! ```
//! use noteweb_core::ParsedNote;
//!
//! let note = ParsedNote::new("notes/2025/Plan", "notes/2025/Plan.md")
//!     .with_tags(["planning", "goals"])
//!     .with_link("Roadmap");
//!
//! assert_eq!(note.folder(), Some("notes/2025"));
//! ```

mod error;
mod loader;
mod note;

pub use error::{LoadError, Result};
pub use loader::{load_notes, parse_notes};
pub use note::{
    parent_folder, ParsedEmbed, ParsedHeading, ParsedLink, ParsedNote, PersonMention,
};
