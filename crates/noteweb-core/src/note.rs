//! Parsed note descriptions.
//!
//! A `ParsedNote` is what the markdown parser extracts from one document:
//! its identity, tags, outgoing references and heading outline. The graph
//! index consumes these as-is; nothing in this crate parses text.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// A wiki-style link, optionally pointing at a heading inside the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLink {
    /// The target as written (`[[Target]]` gives `Target`).
    /// Blank for same-note heading links like `[[#Overview]]`.
    pub note_name: String,
    /// Text after `#` in `[[Target#Overview]]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_text: Option<String>,
}

impl ParsedLink {
    /// Creates a plain link to a note.
    pub fn new(note_name: impl Into<String>) -> Self {
        Self {
            note_name: note_name.into(),
            heading_text: None,
        }
    }

    /// Creates a link to a heading inside a note.
    pub fn to_heading(note_name: impl Into<String>, heading: impl Into<String>) -> Self {
        Self {
            note_name: note_name.into(),
            heading_text: Some(heading.into()),
        }
    }

    /// The heading fragment, if one was written and is not blank.
    pub fn heading(&self) -> Option<&str> {
        self.heading_text
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }

    /// True for `[[#Heading]]` style links that target the linking note itself.
    pub fn is_same_note(&self) -> bool {
        self.note_name.trim().is_empty()
    }
}

/// A transclusion (`![[Target]]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEmbed {
    pub note_name: String,
}

/// An `@Name` mention of a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonMention {
    pub person_name: String,
}

/// A heading in the note's own outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedHeading {
    /// 1 for `#`, 2 for `##`, and so on.
    pub level: u8,
    /// Heading text without the leading hashes.
    pub raw_text: String,
    /// Line number (1-based) in the source document.
    pub line: u32,
}

/// The parser's structured extraction of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedNote {
    /// Vault-relative note id, e.g. `notes/Target`.
    pub id: String,
    /// Vault-relative file path, e.g. `notes/Target.md`.
    pub path: String,
    /// Title from front matter, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Inline and front-matter tags combined.
    #[serde(default)]
    pub all_tags: Vec<String>,
    #[serde(default)]
    pub links: Vec<ParsedLink>,
    #[serde(default)]
    pub embeds: Vec<ParsedEmbed>,
    #[serde(default)]
    pub people_mentions: Vec<PersonMention>,
    #[serde(default)]
    pub headings: Vec<ParsedHeading>,
}

// ─────────────────────────────────────────────────────────────────────────────
// ParsedNote
// ─────────────────────────────────────────────────────────────────────────────

impl ParsedNote {
    /// Creates a note with no extracted content.
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Sets the front-matter title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Adds tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.all_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Adds a plain wiki link.
    pub fn with_link(mut self, note_name: impl Into<String>) -> Self {
        self.links.push(ParsedLink::new(note_name));
        self
    }

    /// Adds a wiki link with a heading fragment.
    pub fn with_heading_link(
        mut self,
        note_name: impl Into<String>,
        heading: impl Into<String>,
    ) -> Self {
        self.links.push(ParsedLink::to_heading(note_name, heading));
        self
    }

    /// Adds an embed.
    pub fn with_embed(mut self, note_name: impl Into<String>) -> Self {
        self.embeds.push(ParsedEmbed {
            note_name: note_name.into(),
        });
        self
    }

    /// Adds a person mention.
    pub fn with_mention(mut self, person_name: impl Into<String>) -> Self {
        self.people_mentions.push(PersonMention {
            person_name: person_name.into(),
        });
        self
    }

    /// Adds a heading to the note's outline.
    pub fn with_heading(mut self, level: u8, raw_text: impl Into<String>, line: u32) -> Self {
        self.headings.push(ParsedHeading {
            level,
            raw_text: raw_text.into(),
            line,
        });
        self
    }

    /// The folder holding this note, or `None` for notes at the vault root.
    pub fn folder(&self) -> Option<&str> {
        parent_folder(&self.path)
    }

    /// Display title: front matter first, then the last segment of the id.
    pub fn title(&self) -> &str {
        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            return title;
        }
        let name = self.id.rsplit('/').next().unwrap_or(&self.id);
        name.strip_suffix(".md").unwrap_or(name)
    }
}

/// Returns the parent folder of a vault-relative path.
///
/// `notes/2025/Plan.md` gives `notes/2025`; `Plan.md` gives `None`.
pub fn parent_folder(path: &str) -> Option<&str> {
    let trimmed = path.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => Some(parent),
        _ => None,
    }
}
