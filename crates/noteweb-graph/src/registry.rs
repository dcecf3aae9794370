//! Resolver registries consulted while building edges.
//!
//! The edge builder never guesses what a textual reference points at. It
//! asks one of these registries, and a reference the registry cannot
//! resolve produces nothing. `VaultRegistry` is the in-memory
//! implementation used for whole-vault builds.

use crate::node::{normalize_folder, normalize_heading};
use noteweb_core::{parent_folder, ParsedNote};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Resolves a link target as written to a canonical note id.
pub trait NoteRegistry {
    fn resolve_note(&self, name: &str) -> Option<String>;
}

/// Knows which headings exist in which notes.
pub trait HeadingRegistry {
    fn has_heading(&self, note_id: &str, heading: &str) -> bool;
}

/// Resolves a mentioned name to a canonical person name.
pub trait PeopleRegistry {
    fn resolve_person(&self, name: &str) -> Option<String>;
}

/// Describes the folder hierarchy.
pub trait FolderRegistry {
    /// The folder directly containing `folder`, or `None` at the top.
    fn parent_folder(&self, folder: &str) -> Option<String>;
}

/// Settings for `VaultRegistry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Notes under this folder are people (`people/Erik` is person `Erik`).
    pub people_folder: Option<String>,
    /// Match note titles and person names ignoring case.
    pub case_insensitive: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            people_folder: Some("people".to_string()),
            case_insensitive: true,
        }
    }
}

/// In-memory registry implementing every resolver.
///
/// Notes are reachable by id, by id without `.md`, and by title.
#[derive(Debug, Default, Clone)]
pub struct VaultRegistry {
    /// Lookup key -> note id.
    notes_by_key: HashMap<String, String>,

    /// Note id -> normalized headings in that note.
    headings_by_note: HashMap<String, HashSet<String>>,

    /// Lookup key -> canonical person name.
    people_by_key: HashMap<String, String>,

    config: RegistryConfig,
}

impl VaultRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with custom settings.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Builds a registry from a parsed corpus: every note, its headings,
    /// and people from the configured people folder.
    pub fn from_notes(notes: &[ParsedNote], config: RegistryConfig) -> Self {
        let mut registry = Self::with_config(config);
        for note in notes {
            registry.register_parsed(note);
        }
        registry
    }

    /// Registers one parsed note: its id and title, its headings, and the
    /// person it describes if it lives in the people folder.
    pub fn register_parsed(&mut self, note: &ParsedNote) {
        self.register_note(&note.id);
        self.register_title(note.title(), &note.id);

        for heading in &note.headings {
            self.register_heading(&note.id, &heading.raw_text);
        }

        if self.is_person_note(note) {
            self.register_person(note.title());
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Registers a note under its id and under the id without `.md`.
    ///
    /// An exact id always wins over an earlier title of the same text.
    pub fn register_note(&mut self, note_id: &str) {
        let key = self.key(note_id);
        self.notes_by_key.insert(key, note_id.to_string());

        if let Some(stem) = note_id.strip_suffix(".md") {
            let key = self.key(stem);
            self.notes_by_key.insert(key, note_id.to_string());
        }
        if let Some((_, name)) = note_id.rsplit_once('/') {
            let name = name.strip_suffix(".md").unwrap_or(name);
            self.register_title(name, note_id);
        }
    }

    /// Registers an additional name for a note. First registration wins.
    pub fn register_title(&mut self, title: &str, note_id: &str) {
        if title.trim().is_empty() {
            return;
        }
        let key = self.key(title);
        self.notes_by_key
            .entry(key)
            .or_insert_with(|| note_id.to_string());
    }

    /// Registers a heading inside a note.
    pub fn register_heading(&mut self, note_id: &str, heading: &str) {
        let normalized = normalize_heading(heading);
        if normalized.is_empty() {
            return;
        }
        self.headings_by_note
            .entry(note_id.to_string())
            .or_default()
            .insert(normalized);
    }

    /// Registers a person under their canonical name.
    pub fn register_person(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let key = self.key(name);
        self.people_by_key.insert(key, name.to_string());
    }

    /// Returns the number of distinct notes reachable through the registry.
    pub fn note_count(&self) -> usize {
        self.notes_by_key.values().collect::<HashSet<_>>().len()
    }

    fn is_person_note(&self, note: &ParsedNote) -> bool {
        let Some(people) = self.config.people_folder.as_deref() else {
            return false;
        };
        let people = normalize_folder(people);
        match note.folder() {
            Some(folder) => {
                let folder = normalize_folder(folder);
                folder == people || folder.starts_with(&format!("{}/", people))
            }
            None => false,
        }
    }

    fn key(&self, value: &str) -> String {
        let value = value.trim().trim_start_matches('@').trim();
        if self.config.case_insensitive {
            value.to_lowercase()
        } else {
            value.to_string()
        }
    }
}

impl NoteRegistry for VaultRegistry {
    fn resolve_note(&self, name: &str) -> Option<String> {
        let key = self.key(name);
        self.notes_by_key.get(&key).cloned().or_else(|| {
            let stem = key.strip_suffix(".md")?;
            self.notes_by_key.get(stem).cloned()
        })
    }
}

impl HeadingRegistry for VaultRegistry {
    fn has_heading(&self, note_id: &str, heading: &str) -> bool {
        self.headings_by_note
            .get(note_id)
            .is_some_and(|headings| headings.contains(&normalize_heading(heading)))
    }
}

impl PeopleRegistry for VaultRegistry {
    fn resolve_person(&self, name: &str) -> Option<String> {
        self.people_by_key.get(&self.key(name)).cloned()
    }
}

impl FolderRegistry for VaultRegistry {
    fn parent_folder(&self, folder: &str) -> Option<String> {
        parent_folder(&normalize_folder(folder)).map(str::to_string)
    }
}
