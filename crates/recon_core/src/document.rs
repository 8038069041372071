//! Documents: a title plus an ordered sequence of blocks.
//!
//! Block order is the display and edit order, and it is what split, delete
//! and arrow navigation use to find neighbours. Block ids are unique within a
//! document; insertion helpers re-id a block whose id is already taken.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::block::{Block, BlockId};

/// Title shown for documents with an empty title.
pub const UNTITLED: &str = "Untitled";

/// Opaque document identifier, stable for the document's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A titled, ordered sequence of blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Document {
    /// Document id
    pub id: DocumentId,
    /// Title (not necessarily unique)
    #[serde(default)]
    pub title: String,
    /// Blocks in display order
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create an empty document with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: DocumentId::generate(),
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    /// Title for display: the title, or "Untitled" when empty.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    /// Position of a block.
    pub fn block_index(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.id == id)
    }

    /// Look up a block.
    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    /// Look up a block mutably.
    pub fn block_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| &b.id == id)
    }

    /// Id of the block before `id`.
    pub fn previous_block_id(&self, id: &BlockId) -> Option<&BlockId> {
        let index = self.block_index(id)?;
        index.checked_sub(1).map(|i| &self.blocks[i].id)
    }

    /// Id of the block after `id`.
    pub fn next_block_id(&self, id: &BlockId) -> Option<&BlockId> {
        let index = self.block_index(id)?;
        self.blocks.get(index + 1).map(|b| &b.id)
    }

    /// Insert `block` at `index` (clamped to the end), returning its id.
    pub fn insert_block(&mut self, index: usize, mut block: Block) -> BlockId {
        if self.block_index(&block.id).is_some() {
            let fresh = BlockId::generate();
            log::warn!(
                "Block id '{}' already used in document '{}', re-id as '{}'",
                block.id,
                self.id,
                fresh
            );
            block.id = fresh;
        }
        let id = block.id.clone();
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
        id
    }

    /// Give every block that repeats an earlier block's id a fresh id.
    /// Returns how many blocks were re-id'd.
    pub fn dedupe_block_ids(&mut self) -> usize {
        let mut seen = HashSet::with_capacity(self.blocks.len());
        let mut renamed = 0;
        for block in &mut self.blocks {
            if !seen.insert(block.id.clone()) {
                let fresh = BlockId::generate();
                log::warn!(
                    "Block id '{}' repeated in document '{}', re-id as '{}'",
                    block.id,
                    self.id,
                    fresh
                );
                block.id = fresh.clone();
                seen.insert(fresh);
                renamed += 1;
            }
        }
        renamed
    }

    /// Remove a block, returning it.
    pub fn remove_block(&mut self, id: &BlockId) -> Option<Block> {
        let index = self.block_index(id)?;
        Some(self.blocks.remove(index))
    }

    /// Whether any block's text or page-link target references `title`.
    pub fn references_title(&self, title: &str) -> bool {
        self.blocks.iter().any(|block| {
            block.page_target() == Some(title)
                || crate::link_parser::references_title(&block.content, title)
        })
    }
}

/// Partial update for a document. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DocumentPatch {
    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub title: Option<String>,

    /// Replacement block sequence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub blocks: Option<Vec<Block>>,
}

impl DocumentPatch {
    /// A patch that only sets the title.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            blocks: None,
        }
    }

    /// Merge this patch into `doc`.
    pub fn apply(self, doc: &mut Document) {
        if let Some(title) = self.title {
            doc.title = title;
        }
        if let Some(blocks) = self.blocks {
            doc.blocks = blocks;
            doc.dedupe_block_ids();
        }
    }
}
