//! Loading parsed notes produced by the vault parser.
//!
//! The parser writes its output as a JSON array of `ParsedNote` objects.

use crate::error::Result;
use crate::note::ParsedNote;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads a JSON dump of parsed notes from disk.
pub fn load_notes<P: AsRef<Path>>(path: P) -> Result<Vec<ParsedNote>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let notes = parse_notes(&raw)?;
    debug!("Loaded {} parsed notes from {}", notes.len(), path.display());
    Ok(notes)
}

/// Parses a JSON array of parsed notes.
pub fn parse_notes(json: &str) -> Result<Vec<ParsedNote>> {
    Ok(serde_json::from_str(json)?)
}
