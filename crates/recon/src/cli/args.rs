//! Command-line argument structures and enums

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "recon")]
#[command(version)]
#[command(about = "A block-structured note editor with wiki-style links", long_about = None)]
pub struct Cli {
    /// Override the data directory holding documents and tabs
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new document
    New {
        /// Title for the document (default: config's default_title)
        title: Option<String>,
    },

    /// List open tabs and their documents
    #[command(alias = "ls")]
    List,

    /// Show a document's blocks
    Show {
        /// Document id or exact title ("." for the first tab)
        document: String,

        /// Print the document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename a document
    Title {
        /// Document id or exact title
        document: String,

        /// New title
        title: String,
    },

    /// Add a block to a document
    Add {
        /// Document id or exact title
        document: String,

        /// Block text
        content: String,

        /// Block type
        #[arg(short = 't', long = "type", value_enum, default_value_t = BlockKind::Paragraph)]
        kind: BlockKind,

        /// Header level (1-3)
        #[arg(short, long)]
        level: Option<u8>,

        /// Insert after this block (number or id); appends otherwise
        #[arg(short, long)]
        after: Option<String>,

        /// Insert before the first block
        #[arg(long, conflicts_with = "after")]
        first: bool,
    },

    /// Replace a block's text
    Edit {
        /// Document id or exact title
        document: String,

        /// Block number (1-based) or id
        block: String,

        /// New text
        content: String,
    },

    /// Press Enter inside a block
    Split {
        /// Document id or exact title
        document: String,

        /// Block number (1-based) or id
        block: String,

        /// Caret position, in characters
        cursor: usize,

        /// Selected range to delete first, as START:END
        #[arg(short, long, value_parser = parse_range)]
        selection: Option<(usize, usize)>,

        /// Modified Enter: open an empty block without cutting
        #[arg(short, long)]
        forced: bool,
    },

    /// Delete a block
    #[command(alias = "rm")]
    Delete {
        /// Document id or exact title
        document: String,

        /// Block number (1-based) or id
        block: String,
    },

    /// Flip a checkbox
    Check {
        /// Document id or exact title
        document: String,

        /// Block number (1-based) or id
        block: String,
    },

    /// Apply a slash command to a block (header1, bullet, code, ...)
    Convert {
        /// Document id or exact title
        document: String,

        /// Block number (1-based) or id
        block: String,

        /// Command id, or a query matched against command labels
        command: String,
    },

    /// Turn a block into a page or URL link
    Link {
        /// Document id or exact title
        document: String,

        /// Block number (1-based) or id
        block: String,

        /// Link to the page with this title (created if missing)
        #[arg(long, group = "target")]
        page: Option<String>,

        /// Link to this URL
        #[arg(long, group = "target")]
        url: Option<String>,
    },

    /// Close a document's tab and delete the document
    Close {
        /// Document id or exact title
        document: String,
    },

    /// Open a document in a tab and show it
    Open {
        /// Document id or exact title
        document: String,
    },

    /// Follow a [[link]] by title, creating the document if needed
    Follow {
        /// Link target title
        title: String,
    },

    /// List documents linking to a title
    Backlinks {
        /// Exact title
        title: String,
    },

    /// Resolve a route such as /doc/{id}
    Route {
        /// Route path
        path: String,
    },

    /// Execute a raw JSON command ("-" reads stdin)
    Exec {
        /// Command JSON, e.g. {"type":"ListDocuments"}
        json: String,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,

    /// Write a config file with default values (honours --data-dir)
    Init,

    /// Set a configuration value
    Set {
        /// One of: data_dir, default_title, storage_prefix
        key: String,

        /// New value
        value: String,
    },
}

/// Block types accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BlockKind {
    Paragraph,
    Header,
    Bullet,
    Checkbox,
    Code,
}

fn parse_range(value: &str) -> Result<(usize, usize), String> {
    let (start, end) = value
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{}'", value))?;
    let start = start
        .trim()
        .parse()
        .map_err(|e| format!("invalid start '{}': {}", start, e))?;
    let end = end
        .trim()
        .parse()
        .map_err(|e| format!("invalid end '{}': {}", end, e))?;
    Ok((start, end))
}
