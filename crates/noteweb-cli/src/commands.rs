//! CLI command implementations.

use crate::config::{NotewebConfig, CONFIG_DIR};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use noteweb_core::load_notes;
use noteweb_graph::{Direction, EntityType, GraphBuilder, GraphIndex, NodeId};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Where the parsed notes and the config come from.
pub struct Vault {
    notes: PathBuf,
    config: Option<PathBuf>,
}

impl Vault {
    pub fn new(notes: PathBuf, config: Option<PathBuf>) -> Self {
        Self { notes, config }
    }

    pub fn config(&self) -> Result<NotewebConfig> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => NotewebConfig::path_in(Path::new(".")),
        };
        Ok(NotewebConfig::load(&path)?)
    }

    /// Loads the notes dump and builds the index, showing progress.
    pub fn build(&self) -> Result<GraphIndex> {
        let config = self.config()?;
        let notes = load_notes(&self.notes)
            .map_err(|e| format!("{}: {}", self.notes.display(), e))?;

        let mut builder = GraphBuilder::with_config(config.registry, config.build);
        builder.add_notes(notes);

        let progress = ProgressBar::new(builder.pending() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("=> "),
        );

        while let Some(result) = builder.build_next() {
            let id = result?;
            progress.set_message(id.ref_id().to_string());
            progress.inc(1);
        }
        progress.finish_and_clear();

        let graph = builder.build()?;
        debug!(
            "Index ready: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

/// Initialize Noteweb in a directory.
pub fn init(path: &Path) -> Result<()> {
    let config_path = NotewebConfig::path_in(path);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    NotewebConfig::default().save(&config_path)?;

    println!(
        "{} Initialized Noteweb in {}",
        "✓".green(),
        path.join(CONFIG_DIR).display()
    );
    println!(
        "  Run {} to see the index",
        "noteweb --notes <dump.json> stats".cyan()
    );

    Ok(())
}

/// Show index statistics.
pub fn stats(vault: &Vault, json: bool) -> Result<()> {
    let graph = vault.build()?;
    let stats = graph.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Noteweb Stats".cyan().bold());
    println!();
    println!("  {} {}", "Nodes:".dimmed(), stats.node_count);
    for (kind, count) in &stats.nodes_by_type {
        println!("    {:<10} {}", kind.to_string(), count);
    }
    println!("  {} {}", "Edges:".dimmed(), stats.edge_count);
    for (kind, count) in &stats.edges_by_type {
        println!("    {:<22} {}", kind.to_string(), count);
    }

    Ok(())
}

/// Notes linking to or embedding a note.
pub fn backlinks(vault: &Vault, note: &str, json: bool) -> Result<()> {
    let graph = vault.build()?;
    let id = NodeId::coerce(EntityType::Note, note);
    require_node(&graph, &id)?;

    let backlinks = graph.get_backlinks(id.as_str());

    if json {
        println!("{}", serde_json::to_string_pretty(&backlinks)?);
        return Ok(());
    }

    if backlinks.is_empty() {
        println!("No backlinks to {}", id.ref_id().cyan());
        return Ok(());
    }

    println!("{} backlinks to {}:\n", backlinks.len(), id.ref_id().cyan());
    for edge in backlinks {
        println!(
            "  {} {}",
            edge.from.ref_id(),
            format!("({})", edge.edge_type).dimmed()
        );
    }

    Ok(())
}

/// Notes a note links to or embeds.
pub fn links(vault: &Vault, note: &str) -> Result<()> {
    let graph = vault.build()?;
    let id = NodeId::coerce(EntityType::Note, note);
    require_node(&graph, &id)?;

    let links = graph.get_forward_links(id.as_str());
    if links.is_empty() {
        println!("{} links to no other notes", id.ref_id().cyan());
        return Ok(());
    }

    println!("{} links from {}:\n", links.len(), id.ref_id().cyan());
    for edge in links {
        println!(
            "  {} {}",
            edge.to.ref_id(),
            format!("({})", edge.edge_type).dimmed()
        );
    }

    Ok(())
}

/// Tags on a note.
pub fn tags(vault: &Vault, note: &str) -> Result<()> {
    let graph = vault.build()?;
    let id = NodeId::coerce(EntityType::Note, note);
    require_node(&graph, &id)?;

    print_ids(
        &format!("Tags on {}", id.ref_id()),
        &graph.get_tags_for_note(id.as_str()),
    );
    Ok(())
}

/// Notes carrying a tag.
pub fn tagged(vault: &Vault, tag: &str) -> Result<()> {
    let graph = vault.build()?;
    print_ids(
        &format!("Notes tagged #{}", tag.trim_start_matches('#')),
        &graph.get_notes_with_tag(tag),
    );
    Ok(())
}

/// Notes mentioning a person.
pub fn mentions(vault: &Vault, person: &str) -> Result<()> {
    let graph = vault.build()?;
    print_ids(
        &format!("Notes mentioning {}", person),
        &graph.get_notes_for_person(person),
    );
    Ok(())
}

/// Notes and subfolders inside a folder.
pub fn folder(vault: &Vault, folder: &str) -> Result<()> {
    let graph = vault.build()?;
    let id = NodeId::coerce(EntityType::Folder, folder.trim_matches('/'));
    require_node(&graph, &id)?;

    if let Some(parent) = graph.get_parent_folder(id.as_str()) {
        println!("{} {}", "Parent:".dimmed(), parent.ref_id());
    }
    print_ids("Subfolders", &graph.get_subfolders(id.as_str()));
    print_ids("Notes", &graph.get_notes_in_folder(id.as_str()));
    Ok(())
}

/// Everything within `depth` hops of a node.
pub fn local(
    vault: &Vault,
    id: &str,
    depth: usize,
    direction: Direction,
    json: bool,
) -> Result<()> {
    let graph = vault.build()?;
    let id = any_node_id(id);
    require_node(&graph, &id)?;

    let local = graph.get_local_graph(id.as_str(), depth, direction);

    if json {
        println!("{}", serde_json::to_string_pretty(&local)?);
        return Ok(());
    }

    println!(
        "{} {} ({} nodes, {} edges, direction: {})",
        "Around".cyan().bold(),
        local.center.to_string().cyan(),
        local.nodes.len(),
        local.edges.len(),
        direction
    );
    println!();

    let mut hops = 0;
    for node in &local.nodes {
        if node.hops != hops {
            hops = node.hops;
            let label = if hops == 1 { "hop" } else { "hops" };
            println!("{}", format!("{} {}:", hops, label).yellow());
        }
        println!("  • {} {}", node.id, format!("via {}", node.via).dimmed());
    }

    Ok(())
}

/// Shortest directed path between two nodes.
pub fn path(vault: &Vault, from: &str, to: &str) -> Result<()> {
    let graph = vault.build()?;
    let from = any_node_id(from);
    let to = any_node_id(to);
    require_node(&graph, &from)?;
    require_node(&graph, &to)?;

    match graph.find_path(from.as_str(), to.as_str()) {
        Some(path) => {
            let hops = path.len().saturating_sub(1);
            let arrow = " → ".dimmed().to_string();
            let rendered: Vec<String> = path.iter().map(NodeId::to_string).collect();
            println!("{} ({} hops)", rendered.join(arrow.as_str()), hops);
        }
        None => println!(
            "No path from {} to {}",
            from.as_str().cyan(),
            to.as_str().cyan()
        ),
    }

    Ok(())
}

/// Find nodes by name.
pub fn search(vault: &Vault, query: &str, kind: Option<&str>, limit: usize) -> Result<()> {
    let kind = match kind {
        Some(kind) => Some(
            EntityType::from_prefix(kind).ok_or_else(|| format!("Unknown kind '{}'", kind))?,
        ),
        None => None,
    };

    let graph = vault.build()?;
    let matches = graph.find_nodes(query, kind);

    if matches.is_empty() {
        println!("No matches found for \"{}\"", query);
        return Ok(());
    }

    println!("Found {} matches:\n", matches.len());
    for node in matches.iter().take(limit) {
        println!(
            "  {} {}",
            node.entity_type.to_string().yellow(),
            node.ref_id.cyan()
        );
    }
    if matches.len() > limit {
        println!("  ... and {} more", matches.len() - limit);
    }

    Ok(())
}

/// Export the index to JSON.
pub fn export(vault: &Vault, output: &Path) -> Result<()> {
    let graph = vault.build()?;
    export_graph(&graph, output)
}

fn export_graph(graph: &GraphIndex, path: &Path) -> Result<()> {
    let mut nodes: Vec<_> = graph.nodes().collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));

    let export = serde_json::json!({
        "version": "1.0",
        "stats": graph.stats(),
        "nodes": nodes,
        "edges": graph.export_edges()
    });

    fs::write(path, serde_json::to_string_pretty(&export)?)?;
    println!("{} Exported to {}", "✓".green(), path.display());

    Ok(())
}

/// A prefixed id of any kind, or a note id when no kind is given.
fn any_node_id(value: &str) -> NodeId {
    NodeId::parse(value).unwrap_or_else(|_| NodeId::new(EntityType::Note, value))
}

fn require_node(graph: &GraphIndex, id: &NodeId) -> Result<()> {
    if graph.has_node(id.as_str()) {
        Ok(())
    } else {
        Err(format!("'{}' not found in index", id).into())
    }
}

fn print_ids(title: &str, ids: &[NodeId]) {
    println!("{} ({})", title.cyan(), ids.len());
    for id in ids {
        println!("  • {}", id.ref_id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DUMP: &str = r#"[
        {"id": "notes/A", "path": "notes/A.md", "allTags": ["planning"]},
        {"id": "notes/B", "path": "notes/B.md", "links": [{"noteName": "A"}]},
        {"id": "people/Erik", "path": "people/Erik.md"},
        {"id": "Inbox", "path": "Inbox.md", "peopleMentions": [{"personName": "Erik"}]}
    ]"#;

    fn vault_in(dir: &Path) -> Vault {
        let notes = dir.join("notes.json");
        fs::write(&notes, DUMP).unwrap();
        Vault::new(notes, Some(NotewebConfig::path_in(dir)))
    }

    #[test]
    fn test_vault_build() {
        let dir = tempdir().unwrap();
        let graph = vault_in(dir.path()).build().unwrap();

        assert_eq!(graph.get_backlinks("note:notes/A").len(), 1);
        assert_eq!(graph.get_notes_with_tag("planning"), vec!["note:notes/A"]);
        assert_eq!(graph.get_notes_for_person("Erik"), vec!["note:Inbox"]);
        assert!(graph.get_folder_for_note("Inbox").is_none());
    }

    #[test]
    fn test_vault_build_honors_config() {
        let dir = tempdir().unwrap();
        let vault = vault_in(dir.path());

        let mut config = NotewebConfig::default();
        config.registry.people_folder = None;
        config.save(&NotewebConfig::path_in(dir.path())).unwrap();

        let graph = vault.build().unwrap();
        assert!(graph.get_notes_for_person("Erik").is_empty());
    }

    #[test]
    fn test_missing_dump_is_an_error() {
        let dir = tempdir().unwrap();
        let vault = Vault::new(dir.path().join("missing.json"), None);
        assert!(vault.build().is_err());
    }

    #[test]
    fn test_init_writes_config() {
        let dir = tempdir().unwrap();
        init(dir.path()).unwrap();

        let config = NotewebConfig::load(&NotewebConfig::path_in(dir.path())).unwrap();
        assert_eq!(config, NotewebConfig::default());

        // Second run leaves the file alone.
        init(dir.path()).unwrap();
    }

    #[test]
    fn test_export_writes_nodes_and_edges() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("graph.json");
        export(&vault_in(dir.path()), &output).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["stats"]["node_count"], value["nodes"].as_array().unwrap().len());
        assert!(value["edges"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["type"] == "note-links-note"));
    }

    #[test]
    fn test_any_node_id() {
        assert_eq!(any_node_id("tag:planning"), "tag:planning");
        assert_eq!(any_node_id("notes/A"), "note:notes/A");
        assert_eq!(any_node_id("note:notes/A"), "note:notes/A");
    }

    #[test]
    fn test_require_node() {
        let graph = GraphIndex::new();
        assert!(require_node(&graph, &NodeId::new(EntityType::Note, "A")).is_err());
    }
}
