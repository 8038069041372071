//! Block command handlers (add, edit, split, delete, check, convert, link)

use recon_core::block::BlockPatch;
use recon_core::link_parser::is_valid_title;
use recon_core::protocol::{
    CommandOutcome, EnterRequest, SlashCommand, SplitOutcome, filter_commands,
};
use recon_core::{Block, BlockId, BlockType, Command, DocumentId, LinkType, Response};

use crate::cli::CliStore;
use crate::cli::args::BlockKind;
use crate::cli::util::{format_block, resolve_block, resolve_document, resolve_target};

impl From<BlockKind> for BlockType {
    fn from(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Paragraph => BlockType::Paragraph,
            BlockKind::Header => BlockType::Header,
            BlockKind::Bullet => BlockType::BulletList,
            BlockKind::Checkbox => BlockType::Checkbox,
            BlockKind::Code => BlockType::Code,
        }
    }
}

/// Handle the 'add' command
pub fn handle_add(
    store: &mut CliStore,
    document: &str,
    content: String,
    kind: BlockKind,
    level: Option<u8>,
    after: Option<String>,
    first: bool,
) -> bool {
    let Some(doc) = resolve_document(store, document) else {
        return false;
    };
    let after = match after {
        Some(reference) => match resolve_block(store, &doc, &reference) {
            Some(id) => Some(id),
            None => return false,
        },
        None => None,
    };

    let block_type = BlockType::from(kind);
    let mut block = Block::new(block_type, content);
    block.set_type(block_type, level);

    let command = if first {
        Command::PrependBlock {
            document: doc,
            block,
        }
    } else {
        Command::AddBlock {
            document: doc,
            after,
            block,
        }
    };

    match store.execute(command) {
        Ok(Response::BlockId(id)) => {
            println!("✓ Added block {}", id);
            true
        }
        Ok(other) => {
            eprintln!("✗ Unexpected response: {:?}", other);
            false
        }
        Err(e) => {
            eprintln!("✗ Error adding block: {}", e);
            false
        }
    }
}

/// Handle the 'edit' command
pub fn handle_edit(store: &mut CliStore, document: &str, block: &str, content: String) -> bool {
    let Some((doc, block)) = resolve_target(store, document, block) else {
        return false;
    };
    match store.execute(Command::UpdateBlock {
        document: doc,
        block,
        patch: BlockPatch::content(content),
    }) {
        Ok(Response::Bool(true)) => {
            println!("✓ Updated");
            true
        }
        Ok(_) => {
            eprintln!("✗ Block was not updated");
            false
        }
        Err(e) => {
            eprintln!("✗ Error updating block: {}", e);
            false
        }
    }
}

/// Handle the 'split' command
pub fn handle_split(
    store: &mut CliStore,
    document: &str,
    block: &str,
    cursor: usize,
    selection: Option<(usize, usize)>,
    forced: bool,
) -> bool {
    let Some((doc, block)) = resolve_target(store, document, block) else {
        return false;
    };

    let mut request = if forced {
        EnterRequest::forced(cursor)
    } else {
        EnterRequest::at(cursor)
    };
    if let Some((start, end)) = selection {
        request = request.with_selection(start, end);
    }

    match store.execute(Command::SplitBlock {
        document: doc.clone(),
        block,
        request,
    }) {
        Ok(Response::Split(SplitOutcome::Split { block })) => {
            match store.block(&doc, &block) {
                Some(created) => println!("✓ New block {}: {}", block, format_block(created)),
                None => println!("✓ New block {}", block),
            }
            true
        }
        Ok(Response::Split(SplitOutcome::Newline { cursor })) => {
            println!("✓ Inserted newline, caret at {}", cursor);
            true
        }
        Ok(other) => {
            eprintln!("✗ Unexpected response: {:?}", other);
            false
        }
        Err(e) => {
            eprintln!("✗ Error splitting block: {}", e);
            false
        }
    }
}

/// Handle the 'delete' command
pub fn handle_delete(store: &mut CliStore, document: &str, block: &str) -> bool {
    let Some((doc, block)) = resolve_target(store, document, block) else {
        return false;
    };
    match store.execute(Command::DeleteBlock {
        document: doc,
        block: block.clone(),
    }) {
        Ok(Response::Bool(true)) => {
            println!("✓ Deleted block {}", block);
            true
        }
        Ok(_) => {
            eprintln!("✗ Block was not deleted");
            false
        }
        Err(e) => {
            eprintln!("✗ Error deleting block: {}", e);
            false
        }
    }
}

/// Handle the 'check' command
pub fn handle_check(store: &mut CliStore, document: &str, block: &str) -> bool {
    let Some((doc, block)) = resolve_target(store, document, block) else {
        return false;
    };
    match store.execute(Command::ToggleCheckbox {
        document: doc,
        block,
    }) {
        Ok(Response::Bool(checked)) => {
            println!("✓ {}", if checked { "Checked" } else { "Unchecked" });
            true
        }
        Ok(other) => {
            eprintln!("✗ Unexpected response: {:?}", other);
            false
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            false
        }
    }
}

/// Handle the 'convert' command
pub fn handle_convert(store: &mut CliStore, document: &str, block: &str, query: &str) -> bool {
    let command = match SlashCommand::parse(query) {
        Some(command) => command,
        None => match filter_commands(query).first() {
            Some(command) => *command,
            None => {
                let ids: Vec<&str> = SlashCommand::ALL.iter().map(|c| c.id()).collect();
                eprintln!("✗ No command matches '{}'", query);
                eprintln!("  Available: {}", ids.join(", "));
                return false;
            }
        },
    };

    if command == SlashCommand::Link {
        eprintln!("✗ Use 'recon link' with --page or --url to create links");
        return false;
    }

    let Some((doc, block)) = resolve_target(store, document, block) else {
        return false;
    };
    match store.execute(Command::ApplyCommand {
        document: doc.clone(),
        target: Some(block),
        command,
    }) {
        Ok(Response::Command(
            CommandOutcome::Converted { block } | CommandOutcome::Created { block },
        )) => {
            if let Some(converted) = store.block(&doc, &block) {
                println!("✓ {}: {}", command.label(), format_block(converted));
            }
            true
        }
        Ok(other) => {
            eprintln!("✗ Unexpected response: {:?}", other);
            false
        }
        Err(e) => {
            eprintln!("✗ Error converting block: {}", e);
            false
        }
    }
}

/// Handle the 'link' command
pub fn handle_link(
    store: &mut CliStore,
    document: &str,
    block: &str,
    page: Option<String>,
    url: Option<String>,
) -> bool {
    if let Some(title) = &page
        && !is_valid_title(title)
    {
        eprintln!("✗ Invalid page title '{}': must be non-empty without '[' or ']'", title);
        return false;
    }

    let Some((doc, block)) = resolve_target(store, document, block) else {
        return false;
    };

    let link_type = if url.is_some() {
        LinkType::Url
    } else {
        LinkType::Page
    };

    match link_block(store, doc, block, link_type, page, url) {
        Ok(Response::PageLink(link)) => {
            if link.created {
                println!("✓ Linked to new page {}", link.target);
            } else {
                println!("✓ Linked to page {}", link.target);
            }
            true
        }
        Ok(Response::Ok) => {
            println!("✓ Linked to URL");
            true
        }
        Ok(Response::BlockId(id)) => {
            println!("✓ Block {} is waiting for a {} target", id, link_type);
            true
        }
        Ok(other) => {
            eprintln!("✗ Unexpected response: {:?}", other);
            false
        }
        Err(e) => {
            eprintln!("✗ Error creating link: {}", e);
            false
        }
    }
}

/// Select the link type, then point the block at its target when one was
/// given.
fn link_block(
    store: &mut CliStore,
    doc: DocumentId,
    block: BlockId,
    link_type: LinkType,
    page: Option<String>,
    url: Option<String>,
) -> recon_core::Result<Response> {
    let block = match store.execute(Command::SelectLinkType {
        document: doc.clone(),
        block: Some(block),
        link_type,
    })? {
        Response::BlockId(id) => id,
        other => return Ok(other),
    };

    match (page, url) {
        (Some(title), _) => store.execute(Command::ResolvePageLink {
            document: doc,
            block,
            title,
        }),
        (None, Some(url)) => store.execute(Command::SetUrlLink {
            document: doc,
            block,
            url,
        }),
        (None, None) => Ok(Response::BlockId(block)),
    }
}
