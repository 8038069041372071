//! Block mutation protocol.
//!
//! The editing rules layered over [`DocumentStore`]: what Enter, Backspace and
//! the arrow keys do to a document's block sequence, how slash commands
//! convert a block's type, and how a link block moves from "awaiting type" to
//! a resolved target.
//!
//! Cursor offsets and selections are counted in characters, not bytes, and are
//! clamped to the content. They are plain inputs; nothing here queries UI
//! state.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::block::{Block, BlockId, BlockType, LinkState, LinkType};
use crate::document::{Document, DocumentId};
use crate::link_parser::is_valid_title;
use crate::storage::KeyValueStore;
use crate::store::DocumentStore;

// ============================================================================
// Requests and outcomes
// ============================================================================

/// A text selection inside a block, in characters. `start` may exceed `end`
/// for backwards selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Selection {
    /// Anchor offset
    pub start: usize,
    /// Focus offset
    pub end: usize,
}

impl Selection {
    /// A selection between two offsets.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Whether nothing is selected.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    fn ordered(&self) -> (usize, usize) {
        (self.start.min(self.end), self.start.max(self.end))
    }
}

/// An Enter keypress inside a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnterRequest {
    /// Caret offset
    pub cursor: usize,
    /// Selected range, deleted before anything else
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub selection: Option<Selection>,
    /// Modified Enter (Ctrl/Cmd): always open a new empty block
    #[serde(default)]
    pub forced: bool,
}

impl EnterRequest {
    /// Plain Enter at `cursor`.
    pub fn at(cursor: usize) -> Self {
        Self {
            cursor,
            ..Self::default()
        }
    }

    /// Modified Enter at `cursor`.
    pub fn forced(cursor: usize) -> Self {
        Self {
            cursor,
            selection: None,
            forced: true,
        }
    }

    /// Attach a selection.
    pub fn with_selection(mut self, start: usize, end: usize) -> Self {
        self.selection = Some(Selection::new(start, end));
        self
    }
}

/// What an Enter did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitOutcome {
    /// A block was inserted after the current one and should take focus
    Split {
        /// The new block
        block: BlockId,
    },
    /// A newline was inserted inside a code block
    Newline {
        /// Caret offset after the newline
        cursor: usize,
    },
}

/// A Backspace keypress inside a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BackspaceRequest {
    /// Caret offset
    pub cursor: usize,
    /// Selected range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub selection: Option<Selection>,
}

impl BackspaceRequest {
    /// Backspace at `cursor` with nothing selected.
    pub fn at(cursor: usize) -> Self {
        Self {
            cursor,
            selection: None,
        }
    }

    /// Attach a selection.
    pub fn with_selection(mut self, start: usize, end: usize) -> Self {
        self.selection = Some(Selection::new(start, end));
        self
    }
}

/// What a Backspace did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackspaceOutcome {
    /// The selected text was removed
    DeletedText {
        /// Caret offset afterwards
        cursor: usize,
    },
    /// The empty block was removed
    DeletedBlock {
        /// Block to focus (the one before the deleted block)
        focus: Option<BlockId>,
    },
    /// Nothing structural; the caller handles ordinary character deletion
    Ignored,
}

/// Arrow key direction for block navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards the previous block
    Up,
    /// Towards the next block
    Down,
}

/// What a slash command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// An existing block changed type
    Converted {
        /// The converted block
        block: BlockId,
    },
    /// The target was missing, so a new block was appended
    Created {
        /// The new block
        block: BlockId,
    },
    /// Nothing changed yet; a link type must be chosen with
    /// [`DocumentStore::select_link_type`]
    AwaitingLinkType {
        /// Block the link will replace, if any
        block: Option<BlockId>,
    },
}

/// Result of resolving a page link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PageLink {
    /// Document the link points at
    pub target: DocumentId,
    /// Whether that document had to be created
    pub created: bool,
}

// ============================================================================
// Slash commands
// ============================================================================

/// Entries of the slash-command menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum SlashCommand {
    /// Heading 1
    Header1,
    /// Heading 2
    Header2,
    /// Heading 3
    Header3,
    /// Bullet list item
    Bullet,
    /// Code block
    Code,
    /// Checkbox
    Checkbox,
    /// Link (page or URL)
    Link,
    /// Plain paragraph
    Paragraph,
}

impl SlashCommand {
    /// Every command, in menu order.
    pub const ALL: [SlashCommand; 8] = [
        SlashCommand::Header1,
        SlashCommand::Header2,
        SlashCommand::Header3,
        SlashCommand::Bullet,
        SlashCommand::Code,
        SlashCommand::Checkbox,
        SlashCommand::Link,
        SlashCommand::Paragraph,
    ];

    /// Short identifier (`"header1"`, `"code"`, ...).
    pub fn id(&self) -> &'static str {
        match self {
            SlashCommand::Header1 => "header1",
            SlashCommand::Header2 => "header2",
            SlashCommand::Header3 => "header3",
            SlashCommand::Bullet => "bullet",
            SlashCommand::Code => "code",
            SlashCommand::Checkbox => "checkbox",
            SlashCommand::Link => "link",
            SlashCommand::Paragraph => "paragraph",
        }
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            SlashCommand::Header1 => "Heading 1",
            SlashCommand::Header2 => "Heading 2",
            SlashCommand::Header3 => "Heading 3",
            SlashCommand::Bullet => "Bullet List",
            SlashCommand::Code => "Code Block",
            SlashCommand::Checkbox => "Checkbox",
            SlashCommand::Link => "Link",
            SlashCommand::Paragraph => "Paragraph",
        }
    }

    /// Block type and header level the command converts to. `None` for
    /// [`SlashCommand::Link`], which needs a link type first.
    pub fn target(&self) -> Option<(BlockType, Option<u8>)> {
        match self {
            SlashCommand::Header1 => Some((BlockType::Header, Some(1))),
            SlashCommand::Header2 => Some((BlockType::Header, Some(2))),
            SlashCommand::Header3 => Some((BlockType::Header, Some(3))),
            SlashCommand::Bullet => Some((BlockType::BulletList, None)),
            SlashCommand::Code => Some((BlockType::Code, None)),
            SlashCommand::Checkbox => Some((BlockType::Checkbox, None)),
            SlashCommand::Paragraph => Some((BlockType::Paragraph, None)),
            SlashCommand::Link => None,
        }
    }

    /// Look a command up by id.
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id().eq_ignore_ascii_case(id))
    }

    /// Whether a typed word names this command: its id, or part of its label.
    fn matches_word(&self, word: &str) -> bool {
        self.id().eq_ignore_ascii_case(word)
            || self.label().to_lowercase().contains(&word.to_lowercase())
    }
}

/// Commands whose label contains `query`, ignoring case, in menu order.
pub fn filter_commands(query: &str) -> Vec<SlashCommand> {
    let query = query.to_lowercase();
    SlashCommand::ALL
        .into_iter()
        .filter(|c| c.label().to_lowercase().contains(&query))
        .collect()
}

/// Whether typing `/` at `cursor` opens the command menu: the block is
/// empty, the caret is at the start, or it follows a space or newline.
pub fn accepts_slash(content: &str, cursor: usize) -> bool {
    let before = &content[..byte_index(content, cursor)];
    before.is_empty() || before.ends_with([' ', '\n'])
}

/// Remove the slash trigger from the start of `content`: the `/`, a word
/// naming `command` if one was typed, and the whitespace after it.
///
/// ```
/// use recon_core::protocol::{SlashCommand, strip_command_trigger};
///
/// assert_eq!(strip_command_trigger("/code rest", SlashCommand::Code), "rest");
/// assert_eq!(strip_command_trigger("/ rest", SlashCommand::Code), "rest");
/// assert_eq!(strip_command_trigger("plain", SlashCommand::Code), "plain");
/// ```
pub fn strip_command_trigger(content: &str, command: SlashCommand) -> &str {
    let Some(rest) = content.strip_prefix('/') else {
        return content;
    };
    let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let word = &rest[..word_end];
    let rest = if !word.is_empty() && command.matches_word(word) {
        &rest[word_end..]
    } else {
        rest
    };
    rest.trim_start()
}

// ============================================================================
// Navigation
// ============================================================================

/// The block arrow navigation moves to, or `None` when the caret should move
/// within the current block (or there is no neighbour).
///
/// Code blocks are left only from their first line (up) or last line (down);
/// other blocks from their start (up) or end (down).
pub fn navigate(
    doc: &Document,
    block_id: &BlockId,
    direction: Direction,
    cursor: usize,
) -> Option<BlockId> {
    let block = doc.block(block_id)?;
    let at = byte_index(&block.content, cursor);
    let (before, after) = block.content.split_at(at);

    let leaves = match (block.block_type, direction) {
        (BlockType::Code, Direction::Up) => !before.contains('\n'),
        (BlockType::Code, Direction::Down) => !after.contains('\n'),
        (_, Direction::Up) => before.is_empty(),
        (_, Direction::Down) => after.is_empty(),
    };
    if !leaves {
        return None;
    }

    match direction {
        Direction::Up => doc.previous_block_id(block_id).cloned(),
        Direction::Down => doc.next_block_id(block_id).cloned(),
    }
}

// ============================================================================
// Store operations
// ============================================================================

impl<S: KeyValueStore> DocumentStore<S> {
    /// Handle Enter inside a block.
    ///
    /// Any selection is deleted first. The text before the caret stays; a new
    /// block of the same type holds the text after it. Code blocks take a
    /// newline instead unless the caret is at the very end. A forced Enter
    /// opens an empty block without cutting. `None` if the block is missing.
    pub fn split_block(
        &mut self,
        doc_id: &DocumentId,
        block_id: &BlockId,
        request: EnterRequest,
    ) -> Option<SplitOutcome> {
        self.block(doc_id, block_id)?;
        let doc = self.document_mut(doc_id)?;
        let index = doc.block_index(block_id)?;
        let block = &mut doc.blocks[index];

        let cursor = match request.selection.filter(|s| !s.is_collapsed()) {
            Some(selection) => delete_selection(&mut block.content, selection),
            None => request.cursor.min(block.content.chars().count()),
        };

        if request.forced {
            let next = block.successor("");
            let id = doc.insert_block(index + 1, next);
            return Some(SplitOutcome::Split { block: id });
        }

        let at = byte_index(&block.content, cursor);
        if block.block_type == BlockType::Code && at < block.content.len() {
            block.content.insert(at, '\n');
            return Some(SplitOutcome::Newline { cursor: cursor + 1 });
        }

        let suffix = block.content.split_off(at);
        let next = block.successor(suffix);
        let id = doc.insert_block(index + 1, next);
        log::debug!("Split block '{}' at {} into '{}'", block_id, cursor, id);
        Some(SplitOutcome::Split { block: id })
    }

    /// Handle Backspace inside a block.
    ///
    /// A selection is deleted. An empty block is removed when it is not the
    /// document's only block. Text is never merged into the previous block.
    pub fn backspace(
        &mut self,
        doc_id: &DocumentId,
        block_id: &BlockId,
        request: BackspaceRequest,
    ) -> Option<BackspaceOutcome> {
        let doc = self.document(doc_id)?;
        let block = doc.block(block_id)?;

        if let Some(selection) = request.selection.filter(|s| !s.is_collapsed()) {
            let block = self.document_mut(doc_id)?.block_mut(block_id)?;
            let cursor = delete_selection(&mut block.content, selection);
            return Some(BackspaceOutcome::DeletedText { cursor });
        }

        if block.is_empty() && doc.blocks.len() > 1 {
            let focus = doc.previous_block_id(block_id).cloned();
            self.delete_block(doc_id, block_id)?;
            return Some(BackspaceOutcome::DeletedBlock { focus });
        }

        Some(BackspaceOutcome::Ignored)
    }

    /// Enter in the title field: insert an empty paragraph before the first
    /// block.
    pub fn insert_leading_paragraph(&mut self, doc_id: &DocumentId) -> Option<BlockId> {
        self.prepend_block(doc_id, Block::paragraph(""))
    }

    /// A click below the last block: append an empty paragraph.
    pub fn append_paragraph(&mut self, doc_id: &DocumentId) -> Option<BlockId> {
        self.append_block(doc_id, Block::paragraph(""))
    }

    /// Flip a checkbox, returning its new state.
    pub fn toggle_checkbox(&mut self, doc_id: &DocumentId, block_id: &BlockId) -> Option<bool> {
        let block = self.block(doc_id, block_id)?;
        if block.block_type != BlockType::Checkbox {
            return None;
        }
        let checked = !block.is_checked();
        let block = self.document_mut(doc_id)?.block_mut(block_id)?;
        block.checked = Some(checked);
        Some(checked)
    }

    /// Apply a slash command to `target`.
    ///
    /// The block changes type and keeps its content minus the command
    /// trigger. When `target` is missing, a new block of that type is
    /// appended. [`SlashCommand::Link`] changes nothing until a link type is
    /// chosen. `None` if the document does not exist.
    pub fn apply_command(
        &mut self,
        doc_id: &DocumentId,
        target: Option<&BlockId>,
        command: SlashCommand,
    ) -> Option<CommandOutcome> {
        let doc = self.document(doc_id)?;
        let existing = target.filter(|id| doc.block(id).is_some()).cloned();

        let Some((block_type, level)) = command.target() else {
            return Some(CommandOutcome::AwaitingLinkType { block: existing });
        };

        match existing {
            Some(id) => {
                let block = self.document_mut(doc_id)?.block_mut(&id)?;
                block.set_type(block_type, level);
                block.content = strip_command_trigger(&block.content, command).to_string();
                log::debug!("Converted block '{}' to {}", id, block_type);
                Some(CommandOutcome::Converted { block: id })
            }
            None => {
                let mut block = Block::new(block_type, "");
                block.set_type(block_type, level);
                let id = self.append_block(doc_id, block)?;
                Some(CommandOutcome::Created { block: id })
            }
        }
    }

    /// Turn a block into a link of `link_type` awaiting its target. A missing
    /// block is replaced by a new link block at the end of the document.
    pub fn select_link_type(
        &mut self,
        doc_id: &DocumentId,
        block_id: Option<&BlockId>,
        link_type: LinkType,
    ) -> Option<BlockId> {
        let existing = block_id.filter(|id| self.block(doc_id, id).is_some()).cloned();
        match existing {
            Some(id) => {
                let block = self.document_mut(doc_id)?.block_mut(&id)?;
                block.set_type(BlockType::Link, None);
                block.link_type = Some(link_type);
                block.link_value = Some(String::new());
                block.content.clear();
                Some(id)
            }
            None => self.append_block(doc_id, Block::link(link_type)),
        }
    }

    /// Point a link block at the document titled `title`, creating that
    /// document (without activating it) when none exists.
    ///
    /// `None`, with nothing changed, when the block is missing or `title` is
    /// not a valid link title.
    pub fn resolve_page_link(
        &mut self,
        doc_id: &DocumentId,
        block_id: &BlockId,
        title: &str,
    ) -> Option<PageLink> {
        self.block(doc_id, block_id)?;
        if !is_valid_title(title) {
            log::debug!("resolve_page_link: invalid title '{}'", title);
            return None;
        }

        let (target, created) = match self.get_document_by_title(title) {
            Some(id) => (id, false),
            None => (self.create_background_document(Some(title)), true),
        };

        let block = self.document_mut(doc_id)?.block_mut(block_id)?;
        if block.block_type != BlockType::Link {
            block.set_type(BlockType::Link, None);
        }
        block.link_type = Some(LinkType::Page);
        block.link_value = Some(title.to_string());
        block.content = title.to_string();
        Some(PageLink { target, created })
    }

    /// Point a link block at `url`.
    pub fn set_url_link(&mut self, doc_id: &DocumentId, block_id: &BlockId, url: &str) -> bool {
        self.block(doc_id, block_id).is_some()
            && self
                .document_mut(doc_id)
                .and_then(|doc| doc.block_mut(block_id))
                .map(|block| {
                    if block.block_type != BlockType::Link {
                        block.set_type(BlockType::Link, None);
                    }
                    block.link_type = Some(LinkType::Url);
                    block.link_value = Some(url.to_string());
                    block.content = url.to_string();
                })
                .is_some()
    }

    /// Return a link block to awaiting selection of its current type.
    pub fn clear_link(&mut self, doc_id: &DocumentId, block_id: &BlockId) -> bool {
        match self.block(doc_id, block_id) {
            Some(block) if block.block_type == BlockType::Link => {}
            _ => return false,
        }
        let Some(block) = self
            .document_mut(doc_id)
            .and_then(|doc| doc.block_mut(block_id))
        else {
            return false;
        };
        block.link_value = block.link_type.map(|_| String::new());
        block.content.clear();
        true
    }

    /// Where a link block is in its selection flow.
    pub fn link_state(&self, doc_id: &DocumentId, block_id: &BlockId) -> Option<LinkState> {
        self.block(doc_id, block_id)?.link_state()
    }
}

// ============================================================================
// Text helpers
// ============================================================================

/// Byte index of the `chars`-th character, clamped to the end.
fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(index, _)| index)
}

/// Delete the selected characters, returning the caret offset (the start of
/// the selection).
fn delete_selection(content: &mut String, selection: Selection) -> usize {
    let (start, end) = selection.ordered();
    let start = start.min(content.chars().count());
    let range = byte_index(content, start)..byte_index(content, end);
    content.replace_range(range, "");
    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{block_contents, block_id, store_with, store_with_blocks};

    #[test]
    fn test_split_paragraph() {
        let (mut store, doc) = store_with_blocks(&["hello world"]);
        let original = block_id(&store, &doc, 0);

        let outcome = store
            .split_block(&doc, &original, EnterRequest::at(5))
            .unwrap();
        let SplitOutcome::Split { block: new_id } = outcome else {
            panic!("expected split");
        };

        assert_eq!(block_contents(&store, &doc), vec!["hello", " world"]);
        assert_eq!(block_id(&store, &doc, 0), original);
        assert_eq!(block_id(&store, &doc, 1), new_id);
        assert_ne!(new_id, original);
        assert_eq!(
            store.block(&doc, &new_id).unwrap().block_type,
            BlockType::Paragraph
        );
    }

    #[test]
    fn test_split_keeps_header_level_and_unchecks() {
        let (mut store, doc) = store_with(vec![Block::header(3, "ab")]);
        let id = block_id(&store, &doc, 0);
        store.split_block(&doc, &id, EnterRequest::at(1));
        let second = &store.document(&doc).unwrap().blocks[1];
        assert_eq!(second.level, Some(3));
        assert_eq!(second.content, "b");

        let mut done = Block::checkbox("task");
        done.checked = Some(true);
        let (mut store, doc) = store_with(vec![done]);
        let id = block_id(&store, &doc, 0);
        store.split_block(&doc, &id, EnterRequest::at(4));
        let blocks = &store.document(&doc).unwrap().blocks;
        assert!(blocks[0].is_checked());
        assert_eq!(blocks[1].checked, Some(false));
    }

    #[test]
    fn test_split_code_interior_inserts_newline() {
        let (mut store, doc) = store_with(vec![Block::new(BlockType::Code, "let x;")]);
        let id = block_id(&store, &doc, 0);

        let outcome = store.split_block(&doc, &id, EnterRequest::at(4)).unwrap();
        assert_eq!(outcome, SplitOutcome::Newline { cursor: 5 });
        assert_eq!(block_contents(&store, &doc), vec!["let \nx;"]);
    }

    #[test]
    fn test_split_code_at_end_creates_block() {
        let (mut store, doc) = store_with(vec![Block::new(BlockType::Code, "a\nb")]);
        let id = block_id(&store, &doc, 0);

        let outcome = store.split_block(&doc, &id, EnterRequest::at(3)).unwrap();
        assert!(matches!(outcome, SplitOutcome::Split { .. }));
        assert_eq!(block_contents(&store, &doc), vec!["a\nb", ""]);
        assert_eq!(
            store.document(&doc).unwrap().blocks[1].block_type,
            BlockType::Code
        );
    }

    #[test]
    fn test_split_with_selection() {
        let (mut store, doc) = store_with_blocks(&["abcdef"]);
        let id = block_id(&store, &doc, 0);
        store.split_block(&doc, &id, EnterRequest::at(4).with_selection(4, 2));
        assert_eq!(block_contents(&store, &doc), vec!["ab", "ef"]);
    }

    #[test]
    fn test_forced_enter_keeps_content() {
        let (mut store, doc) = store_with_blocks(&["keep me", "next"]);
        let id = block_id(&store, &doc, 0);
        store.split_block(&doc, &id, EnterRequest::forced(2));
        assert_eq!(block_contents(&store, &doc), vec!["keep me", "", "next"]);
    }

    #[test]
    fn test_split_clamps_and_counts_chars() {
        let (mut store, doc) = store_with_blocks(&["héllo"]);
        let id = block_id(&store, &doc, 0);
        store.split_block(&doc, &id, EnterRequest::at(2));
        assert_eq!(block_contents(&store, &doc), vec!["hé", "llo"]);

        let (mut store, doc) = store_with_blocks(&["abc"]);
        let id = block_id(&store, &doc, 0);
        store.split_block(&doc, &id, EnterRequest::at(99));
        assert_eq!(block_contents(&store, &doc), vec!["abc", ""]);
    }

    #[test]
    fn test_split_missing_block() {
        let (mut store, doc) = store_with_blocks(&["a"]);
        assert!(store
            .split_block(&doc, &BlockId::from("ghost"), EnterRequest::at(0))
            .is_none());
        assert_eq!(block_contents(&store, &doc), vec!["a"]);
    }

    #[test]
    fn test_backspace_deletes_empty_block() {
        let (mut store, doc) = store_with_blocks(&["a", "", "c"]);
        let first = block_id(&store, &doc, 0);
        let empty = block_id(&store, &doc, 1);

        let outcome = store
            .backspace(&doc, &empty, BackspaceRequest::at(0))
            .unwrap();
        assert_eq!(outcome, BackspaceOutcome::DeletedBlock { focus: Some(first) });
        assert_eq!(block_contents(&store, &doc), vec!["a", "c"]);
    }

    #[test]
    fn test_backspace_keeps_only_block() {
        let (mut store, doc) = store_with_blocks(&[""]);
        let id = block_id(&store, &doc, 0);
        let outcome = store.backspace(&doc, &id, BackspaceRequest::at(0)).unwrap();
        assert_eq!(outcome, BackspaceOutcome::Ignored);
        assert_eq!(store.document(&doc).unwrap().blocks.len(), 1);
    }

    #[test]
    fn test_backspace_never_merges() {
        let (mut store, doc) = store_with_blocks(&["a", "b"]);
        let id = block_id(&store, &doc, 1);
        let outcome = store.backspace(&doc, &id, BackspaceRequest::at(0)).unwrap();
        assert_eq!(outcome, BackspaceOutcome::Ignored);
        assert_eq!(block_contents(&store, &doc), vec!["a", "b"]);
    }

    #[test]
    fn test_backspace_deletes_selection() {
        let (mut store, doc) = store_with_blocks(&["hello world"]);
        let id = block_id(&store, &doc, 0);
        let outcome = store
            .backspace(&doc, &id, BackspaceRequest::at(11).with_selection(5, 11))
            .unwrap();
        assert_eq!(outcome, BackspaceOutcome::DeletedText { cursor: 5 });
        assert_eq!(block_contents(&store, &doc), vec!["hello"]);
    }

    #[test]
    fn test_navigate_plain_blocks() {
        let (store, doc) = store_with_blocks(&["one", "two", "three"]);
        let document = store.document(&doc).unwrap();
        let middle = block_id(&store, &doc, 1);

        assert_eq!(
            navigate(document, &middle, Direction::Up, 0),
            Some(block_id(&store, &doc, 0))
        );
        assert_eq!(
            navigate(document, &middle, Direction::Down, 3),
            Some(block_id(&store, &doc, 2))
        );
        assert_eq!(navigate(document, &middle, Direction::Up, 1), None);
        assert_eq!(navigate(document, &middle, Direction::Down, 1), None);

        let first = block_id(&store, &doc, 0);
        assert_eq!(navigate(document, &first, Direction::Up, 0), None);
    }

    #[test]
    fn test_navigate_code_block_lines() {
        let (store, doc) = store_with(vec![
            Block::paragraph("above"),
            Block::new(BlockType::Code, "l1\nl2"),
            Block::paragraph("below"),
        ]);
        let document = store.document(&doc).unwrap();
        let code = block_id(&store, &doc, 1);

        // First line: up leaves, down stays
        assert!(navigate(document, &code, Direction::Up, 1).is_some());
        assert_eq!(navigate(document, &code, Direction::Down, 1), None);
        // Last line: down leaves, up stays
        assert!(navigate(document, &code, Direction::Down, 4).is_some());
        assert_eq!(navigate(document, &code, Direction::Up, 4), None);
    }

    #[test]
    fn test_accepts_slash() {
        assert!(accepts_slash("", 0));
        assert!(accepts_slash("text", 0));
        assert!(accepts_slash("text ", 5));
        assert!(accepts_slash("line\n", 5));
        assert!(!accepts_slash("text", 4));
        assert!(!accepts_slash("a/b", 2));
    }

    #[test]
    fn test_filter_commands() {
        assert_eq!(
            filter_commands("head"),
            vec![SlashCommand::Header1, SlashCommand::Header2, SlashCommand::Header3]
        );
        assert_eq!(filter_commands("CODE"), vec![SlashCommand::Code]);
        assert_eq!(filter_commands("").len(), SlashCommand::ALL.len());
        assert!(filter_commands("zzz").is_empty());
    }

    #[test]
    fn test_strip_command_trigger() {
        assert_eq!(strip_command_trigger("/code rest", SlashCommand::Code), "rest");
        assert_eq!(strip_command_trigger("/head rest", SlashCommand::Header2), "rest");
        assert_eq!(strip_command_trigger("/", SlashCommand::Code), "");
        assert_eq!(strip_command_trigger("/other rest", SlashCommand::Code), "other rest");
        assert_eq!(strip_command_trigger("a /code", SlashCommand::Code), "a /code");
    }

    #[test]
    fn test_apply_command_converts() {
        let (mut store, doc) = store_with_blocks(&["/code rest"]);
        let id = block_id(&store, &doc, 0);

        let outcome = store
            .apply_command(&doc, Some(&id), SlashCommand::Code)
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Converted { block: id.clone() });

        let block = store.block(&doc, &id).unwrap();
        assert_eq!(block.block_type, BlockType::Code);
        assert_eq!(block.content, "rest");
    }

    #[test]
    fn test_apply_command_normalizes_fields() {
        let (mut store, doc) = store_with(vec![Block::header(2, "Title")]);
        let id = block_id(&store, &doc, 0);

        store.apply_command(&doc, Some(&id), SlashCommand::Checkbox);
        let block = store.block(&doc, &id).unwrap();
        assert_eq!(block.level, None);
        assert_eq!(block.checked, Some(false));

        store.apply_command(&doc, Some(&id), SlashCommand::Header3);
        let block = store.block(&doc, &id).unwrap();
        assert_eq!(block.level, Some(3));
        assert_eq!(block.checked, None);
    }

    #[test]
    fn test_apply_command_missing_target_appends() {
        let (mut store, doc) = store_with_blocks(&["a"]);
        let outcome = store
            .apply_command(&doc, Some(&BlockId::from("ghost")), SlashCommand::Header2)
            .unwrap();
        let CommandOutcome::Created { block } = outcome else {
            panic!("expected a new block");
        };
        assert_eq!(block_id(&store, &doc, 1), block);
        assert_eq!(store.block(&doc, &block).unwrap().level, Some(2));
    }

    #[test]
    fn test_link_command_waits_for_type() {
        let (mut store, doc) = store_with_blocks(&["/link"]);
        let id = block_id(&store, &doc, 0);
        let before = store.document(&doc).cloned();

        let outcome = store
            .apply_command(&doc, Some(&id), SlashCommand::Link)
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::AwaitingLinkType { block: Some(id.clone()) }
        );
        assert_eq!(store.document(&doc).cloned(), before);

        store.select_link_type(&doc, Some(&id), LinkType::Page);
        assert_eq!(store.link_state(&doc, &id), Some(LinkState::AwaitingTarget));
        assert_eq!(store.block(&doc, &id).unwrap().content, "");
    }

    #[test]
    fn test_resolve_page_link_creates_without_activating() {
        let (mut store, doc) = store_with(vec![Block::link(LinkType::Page)]);
        let id = block_id(&store, &doc, 0);

        let link = store.resolve_page_link(&doc, &id, "Ideas").unwrap();
        assert!(link.created);
        assert_eq!(store.active(), Some(&doc));
        assert_eq!(store.get_document_by_title("Ideas"), Some(link.target.clone()));

        let block = store.block(&doc, &id).unwrap();
        assert_eq!(block.link_value.as_deref(), Some("Ideas"));
        assert_eq!(block.content, "Ideas");
        assert_eq!(store.link_state(&doc, &id), Some(LinkState::Resolved));

        let again = store.resolve_page_link(&doc, &id, "Ideas").unwrap();
        assert!(!again.created);
        assert_eq!(again.target, link.target);
    }

    #[test]
    fn test_resolve_page_link_missing_block_creates_nothing() {
        let (mut store, doc) = store_with_blocks(&["a"]);
        assert!(store
            .resolve_page_link(&doc, &BlockId::from("ghost"), "Nope")
            .is_none());
        assert_eq!(store.get_document_by_title("Nope"), None);
    }

    #[test]
    fn test_resolve_page_link_invalid_title_changes_nothing() {
        let (mut store, doc) = store_with(vec![Block::link(LinkType::Page)]);
        let id = block_id(&store, &doc, 0);
        store.save().unwrap();
        let before = store.document(&doc).cloned();

        for title in ["", "[[x", "a]b"] {
            assert!(store.resolve_page_link(&doc, &id, title).is_none());
        }
        assert_eq!(store.document_count(), 1);
        assert_eq!(store.document(&doc).cloned(), before);
        assert_eq!(store.link_state(&doc, &id), Some(LinkState::AwaitingTarget));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_url_link_and_clear() {
        let (mut store, doc) = store_with(vec![Block::link(LinkType::Url)]);
        let id = block_id(&store, &doc, 0);

        assert!(store.set_url_link(&doc, &id, "https://example.com"));
        assert_eq!(store.link_state(&doc, &id), Some(LinkState::Resolved));
        assert_eq!(store.block(&doc, &id).unwrap().content, "https://example.com");

        assert!(store.clear_link(&doc, &id));
        assert_eq!(store.link_state(&doc, &id), Some(LinkState::AwaitingUrl));
    }

    #[test]
    fn test_toggle_checkbox() {
        let (mut store, doc) = store_with(vec![Block::checkbox("x"), Block::paragraph("p")]);
        let checkbox = block_id(&store, &doc, 0);
        assert_eq!(store.toggle_checkbox(&doc, &checkbox), Some(true));
        assert_eq!(store.toggle_checkbox(&doc, &checkbox), Some(false));
        assert_eq!(store.toggle_checkbox(&doc, &block_id(&store, &doc, 1)), None);
    }

    #[test]
    fn test_title_enter_and_click_below() {
        let (mut store, doc) = store_with_blocks(&["body"]);
        let first = store.insert_leading_paragraph(&doc).unwrap();
        let last = store.append_paragraph(&doc).unwrap();
        assert_eq!(block_contents(&store, &doc), vec!["", "body", ""]);
        assert_eq!(block_id(&store, &doc, 0), first);
        assert_eq!(block_id(&store, &doc, 2), last);
    }
}
