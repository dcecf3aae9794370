//! Noteweb CLI - Command-line interface for Noteweb
//!
//! Builds the relationship index from a parser dump and answers questions
//! about it: backlinks, tags, mentions, folders and neighborhoods.

use clap::{Parser, Subcommand};
use colored::Colorize;
use noteweb_graph::Direction;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::Vault;

#[derive(Parser)]
#[command(name = "noteweb")]
#[command(author = "Noteweb Contributors")]
#[command(version)]
#[command(about = "Relationship index for Markdown vaults", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON dump of parsed notes
    #[arg(short, long, global = true, default_value = "notes.json")]
    notes: PathBuf,

    /// Config file (defaults to .noteweb/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Noteweb in a directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show index statistics
    Stats {
        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Notes linking to or embedding a note
    Backlinks {
        note: String,

        #[arg(long)]
        json: bool,
    },

    /// Notes a note links to or embeds
    Links { note: String },

    /// Tags on a note
    Tags { note: String },

    /// Notes carrying a tag
    Tagged { tag: String },

    /// Notes mentioning a person
    Mentions { person: String },

    /// Notes and subfolders inside a folder
    Folder { folder: String },

    /// Everything within a few hops of a node
    Local {
        /// Node id (`note:` is assumed when no kind is given)
        id: String,

        /// Maximum hops (0 for unlimited)
        #[arg(short, long, default_value = "2")]
        depth: usize,

        /// Edge direction to follow: both, outgoing or incoming
        #[arg(long, default_value = "both", value_parser = parse_direction)]
        direction: Direction,

        #[arg(long)]
        json: bool,
    },

    /// Shortest directed path between two nodes
    Path { from: String, to: String },

    /// Find nodes by name
    Search {
        query: String,

        /// Restrict to one kind: note, tag, person, folder or heading
        #[arg(short, long)]
        kind: Option<String>,

        /// Maximum results to return
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Export the index to JSON
    Export {
        /// Output file
        #[arg(short, long, default_value = "noteweb-graph.json")]
        output: PathBuf,
    },
}

fn parse_direction(value: &str) -> Result<Direction, String> {
    match value {
        "both" => Ok(Direction::Both),
        "outgoing" | "out" => Ok(Direction::Outgoing),
        "incoming" | "in" => Ok(Direction::Incoming),
        other => Err(format!("unknown direction '{}'", other)),
    }
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let vault = Vault::new(cli.notes, cli.config);

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Stats { json } => commands::stats(&vault, json),
        Commands::Backlinks { note, json } => commands::backlinks(&vault, &note, json),
        Commands::Links { note } => commands::links(&vault, &note),
        Commands::Tags { note } => commands::tags(&vault, &note),
        Commands::Tagged { tag } => commands::tagged(&vault, &tag),
        Commands::Mentions { person } => commands::mentions(&vault, &person),
        Commands::Folder { folder } => commands::folder(&vault, &folder),
        Commands::Local {
            id,
            depth,
            direction,
            json,
        } => commands::local(&vault, &id, depth, direction, json),
        Commands::Path { from, to } => commands::path(&vault, &from, &to),
        Commands::Search { query, kind, limit } => {
            commands::search(&vault, &query, kind.as_deref(), limit)
        }
        Commands::Export { output } => commands::export(&vault, &output),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_local() {
        let cli = Cli::parse_from([
            "noteweb",
            "--notes",
            "dump.json",
            "local",
            "notes/A",
            "--depth",
            "3",
            "--direction",
            "in",
        ]);

        assert_eq!(cli.notes, PathBuf::from("dump.json"));
        match cli.command {
            Commands::Local {
                id,
                depth,
                direction,
                json,
            } => {
                assert_eq!(id, "notes/A");
                assert_eq!(depth, 3);
                assert_eq!(direction, Direction::Incoming);
                assert!(!json);
            }
            _ => panic!("expected local"),
        }
    }

    #[test]
    fn test_parse_direction_rejects_unknown() {
        assert!(parse_direction("sideways").is_err());
    }
}
