//! Test utilities for recon_core
//!
//! Shared fixtures: prebuilt stores and a key-value store that always fails.

use std::io;

use crate::block::{Block, BlockId};
use crate::document::DocumentId;
use crate::storage::{InMemoryStore, KeyValueStore};
use crate::store::DocumentStore;

/// A key-value store whose every operation fails.
#[derive(Clone, Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> io::Result<Option<String>> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read denied"))
    }

    fn set(&self, _key: &str, _value: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "write denied"))
    }

    fn remove(&self, _key: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "write denied"))
    }
}

/// An in-memory store whose active document holds one paragraph per entry.
pub fn store_with_blocks(contents: &[&str]) -> (DocumentStore<InMemoryStore>, DocumentId) {
    store_with(contents.iter().map(|c| Block::paragraph(*c)).collect())
}

/// An in-memory store whose active document holds `blocks`.
pub fn store_with(blocks: Vec<Block>) -> (DocumentStore<InMemoryStore>, DocumentId) {
    let mut store = DocumentStore::in_memory();
    let doc = store
        .active()
        .cloned()
        .expect("fresh store has an active document");
    for block in blocks {
        store.append_block(&doc, block);
    }
    (store, doc)
}

/// Contents of a document's blocks, in order.
pub fn block_contents<S: KeyValueStore>(store: &DocumentStore<S>, doc: &DocumentId) -> Vec<String> {
    store
        .document(doc)
        .map(|d| d.blocks.iter().map(|b| b.content.clone()).collect())
        .unwrap_or_default()
}

/// Id of the block at `index`.
pub fn block_id<S: KeyValueStore>(
    store: &DocumentStore<S>,
    doc: &DocumentId,
    index: usize,
) -> BlockId {
    store.document(doc).expect("document exists").blocks[index]
        .id
        .clone()
}
