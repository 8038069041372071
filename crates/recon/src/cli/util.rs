//! Shared utilities for CLI commands

use std::path::PathBuf;

use recon_core::block::LinkType;
use recon_core::config::Config;
use recon_core::document::Document;
use recon_core::link_parser::link_titles;
use recon_core::storage::{DirectoryStore, KeyValueStore};
use recon_core::{Block, BlockId, BlockType, DocumentId, DocumentStore};

use crate::cli::CliStore;

/// Load the config, printing the error on failure
pub fn load_config() -> Option<Config> {
    match Config::load() {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("✗ Error loading config: {}", e);
            eprintln!("  Fix or remove the file, or run 'recon config init'");
            None
        }
    }
}

/// Open the store in the configured (or overridden) data directory
pub fn open_store(data_dir: Option<PathBuf>) -> Option<CliStore> {
    let mut config = load_config()?;
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }

    let storage = match DirectoryStore::open(&config.data_dir) {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!(
                "✗ Cannot open data directory {}: {}",
                config.data_dir.display(),
                e
            );
            return None;
        }
    };

    log::debug!("Opening store in {}", config.data_dir.display());
    match DocumentStore::load(storage, &config) {
        Ok(store) => Some(store),
        Err(e) => {
            eprintln!("✗ Error loading documents: {}", e);
            None
        }
    }
}

/// Resolve a document reference: an id, an exact title, or "." for the
/// first tab. Prints an error when nothing matches.
pub fn resolve_document<S: KeyValueStore>(
    store: &DocumentStore<S>,
    reference: &str,
) -> Option<DocumentId> {
    if reference == "." {
        return store.default_document();
    }

    let id = DocumentId::from(reference);
    if store.contains(&id) {
        return Some(id);
    }

    let matches = store.documents_by_title(reference);
    if matches.len() > 1 {
        eprintln!(
            "⚠ {} documents are titled '{}', using {}",
            matches.len(),
            reference,
            matches[0]
        );
    }
    match matches.into_iter().next() {
        Some(id) => Some(id),
        None => {
            eprintln!("✗ No document with id or title '{}'", reference);
            None
        }
    }
}

/// Resolve a block reference: a 1-based position or a block id.
pub fn resolve_block<S: KeyValueStore>(
    store: &DocumentStore<S>,
    doc: &DocumentId,
    reference: &str,
) -> Option<BlockId> {
    let document = store.document(doc)?;

    if let Ok(position) = reference.parse::<usize>()
        && let Some(block) = position.checked_sub(1).and_then(|i| document.blocks.get(i))
    {
        return Some(block.id.clone());
    }

    let id = BlockId::from(reference);
    if document.block(&id).is_some() {
        return Some(id);
    }

    eprintln!(
        "✗ No block '{}' in '{}' ({} blocks)",
        reference,
        document.display_title(),
        document.blocks.len()
    );
    None
}

/// Resolve both references at once.
pub fn resolve_target<S: KeyValueStore>(
    store: &DocumentStore<S>,
    document: &str,
    block: &str,
) -> Option<(DocumentId, BlockId)> {
    let doc = resolve_document(store, document)?;
    let block = resolve_block(store, &doc, block)?;
    Some((doc, block))
}

/// One line of text for a block, prefixed by its kind.
pub fn format_block(block: &Block) -> String {
    match block.block_type {
        BlockType::Paragraph => block.content.clone(),
        BlockType::Header => format!(
            "{} {}",
            "#".repeat(block.header_level() as usize),
            block.content
        ),
        BlockType::BulletList => format!("• {}", block.content),
        BlockType::Checkbox => {
            let mark = if block.is_checked() { "x" } else { " " };
            format!("[{}] {}", mark, block.content)
        }
        BlockType::Code => format!("```\n{}\n```", block.content),
        BlockType::Link => match (block.link_type, block.link_value.as_deref()) {
            (Some(LinkType::Page), Some(target)) if !target.is_empty() => {
                format!("→ {} [[{}]]", block.link_display_text(), target)
            }
            (Some(LinkType::Url), Some(url)) if !url.is_empty() => {
                format!("→ {} <{}>", block.link_display_text(), url)
            }
            _ => format!("→ ({})", block.link_display_text()),
        },
    }
}

/// Print a document with numbered blocks and its outgoing links.
pub fn print_document(doc: &Document) {
    println!("{}", doc.display_title());
    println!("{}", "=".repeat(doc.display_title().chars().count()));
    println!("id: {}", doc.id);

    if doc.blocks.is_empty() {
        println!("\n(no blocks)");
        return;
    }

    println!();
    let width = doc.blocks.len().to_string().len();
    for (i, block) in doc.blocks.iter().enumerate() {
        let text = format_block(block);
        let mut lines = text.lines();
        println!("{:>width$}  {}", i + 1, lines.next().unwrap_or(""), width = width);
        for line in lines {
            println!("{:>width$}  {}", "", line, width = width);
        }
    }

    let mut links: Vec<String> = Vec::new();
    for block in &doc.blocks {
        if let Some(target) = block.page_target()
            && !links.iter().any(|l| l == target)
        {
            links.push(target.to_string());
        }
        for title in link_titles(&block.content) {
            if !links.contains(&title) {
                links.push(title);
            }
        }
    }
    if !links.is_empty() {
        println!("\nLinks: {}", links.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DocumentStore<recon_core::storage::InMemoryStore> {
        DocumentStore::in_memory()
    }

    #[test]
    fn test_resolve_document_by_id_title_and_dot() {
        let mut store = store();
        let first = store.tabs()[0].clone();
        let plan = store.create_document(Some("Plan"));

        assert_eq!(resolve_document(&store, plan.as_str()), Some(plan.clone()));
        assert_eq!(resolve_document(&store, "Plan"), Some(plan));
        assert_eq!(resolve_document(&store, "."), Some(first));
        assert_eq!(resolve_document(&store, "Nothing"), None);
    }

    #[test]
    fn test_resolve_block_by_position_and_id() {
        let mut store = store();
        let doc = store.create_document(Some("Doc"));
        let a = store.append_block(&doc, Block::paragraph("a")).unwrap();
        let b = store.append_block(&doc, Block::paragraph("b")).unwrap();

        assert_eq!(resolve_block(&store, &doc, "1"), Some(a));
        assert_eq!(resolve_block(&store, &doc, b.as_str()), Some(b));
        assert_eq!(resolve_block(&store, &doc, "0"), None);
        assert_eq!(resolve_block(&store, &doc, "3"), None);
    }

    #[test]
    fn test_format_block() {
        assert_eq!(format_block(&Block::header(2, "Intro")), "## Intro");
        assert_eq!(format_block(&Block::checkbox("todo")), "[ ] todo");

        let mut link = Block::link(LinkType::Page);
        assert_eq!(format_block(&link), "→ (Select a page...)");
        link.link_value = Some("Plan".to_string());
        link.content = "Plan".to_string();
        assert_eq!(format_block(&link), "→ Plan [[Plan]]");
    }
}
