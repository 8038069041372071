//! The document store.
//!
//! [`DocumentStore`] owns every document, the ordered tab list and the
//! session pointers (active document, floating reference, split view). It is
//! the only thing that mutates them; views read through accessors and change
//! state through the operations here and in [`crate::protocol`].
//!
//! # Persistence
//!
//! State lives in a [`KeyValueStore`] under two keys:
//!
//! | Key | Value |
//! |-----|-------|
//! | `{prefix}documents` | JSON object, document id → `{id, title, blocks}` |
//! | `{prefix}tabs` | JSON array of document ids |
//!
//! Mutations only mark the store dirty. [`DocumentStore::save`] writes both
//! collections wholesale in one [`KeyValueStore::set_many`] call, so each
//! logical transaction (one executed [`crate::Command`], or one
//! [`DocumentStore::transact`] closure) ends in exactly one write.
//!
//! Missing or malformed persisted data is never an error: the store falls
//! back to a single empty document.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use ts_rs::TS;

use crate::block::{Block, BlockId, BlockPatch};
use crate::config::Config;
use crate::document::{Document, DocumentId, DocumentPatch};
use crate::error::{ReconError, Result};
use crate::link_parser::is_valid_title;
use crate::storage::{InMemoryStore, KeyValueStore};

/// Session-only view state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Session {
    /// Document shown in the main editor
    pub active: Option<DocumentId>,
    /// Document shown in the floating reference window
    pub floating: Option<DocumentId>,
    /// Whether the split pane is open
    pub split_view: bool,
}

/// Storage keys for the two persisted collections.
#[derive(Debug, Clone)]
struct StorageKeys {
    documents: String,
    tabs: String,
}

/// Owner of documents, tabs and session state.
pub struct DocumentStore<S: KeyValueStore> {
    storage: S,
    keys: StorageKeys,
    default_title: String,
    documents: IndexMap<DocumentId, Document>,
    tabs: Vec<DocumentId>,
    session: Session,
    dirty: bool,
}

impl DocumentStore<InMemoryStore> {
    /// A store backed by a fresh in-memory key-value store.
    pub fn in_memory() -> Self {
        Self::new(InMemoryStore::new(), &Config::new(Default::default()))
    }
}

impl<S: KeyValueStore> DocumentStore<S> {
    /// Create a store in the initial state (one empty document), ignoring
    /// anything already persisted in `storage`.
    pub fn new(storage: S, config: &Config) -> Self {
        let mut store = Self {
            storage,
            keys: StorageKeys {
                documents: config.documents_key(),
                tabs: config.tabs_key(),
            },
            default_title: config.default_title.clone(),
            documents: IndexMap::new(),
            tabs: Vec::new(),
            session: Session::default(),
            dirty: false,
        };
        store.reset_to_initial_state();
        store
    }

    /// Load persisted state from `storage`.
    ///
    /// Missing or malformed data falls back to the initial state. Only I/O
    /// failures of the storage itself are errors, so that an unreadable store
    /// is never silently overwritten by the next save.
    pub fn load(storage: S, config: &Config) -> Result<Self> {
        let mut store = Self::new(storage, config);

        let raw_documents = store.read_key(&store.keys.documents.clone())?;
        let raw_tabs = store.read_key(&store.keys.tabs.clone())?;

        let documents = match raw_documents.as_deref().map(decode_documents) {
            Some(Ok(documents)) if !documents.is_empty() => documents,
            Some(Ok(_)) => {
                log::warn!("Persisted document collection is empty, starting fresh");
                return Ok(store);
            }
            Some(Err(e)) => {
                log::warn!("Persisted documents are malformed ({}), starting fresh", e);
                return Ok(store);
            }
            None => {
                log::debug!("No persisted documents, starting fresh");
                return Ok(store);
            }
        };

        let tabs = match raw_tabs.as_deref().map(serde_json::from_str::<Vec<DocumentId>>) {
            Some(Ok(tabs)) => tabs,
            Some(Err(e)) => {
                log::warn!("Persisted tabs are malformed ({}), rebuilding", e);
                Vec::new()
            }
            None => Vec::new(),
        };

        store.documents = documents;
        store.tabs = tabs;
        store.reconcile_tabs();
        store.session = Session {
            active: store.default_document(),
            floating: None,
            split_view: false,
        };
        store.dirty = false;

        log::debug!(
            "Loaded {} documents and {} tabs",
            store.documents.len(),
            store.tabs.len()
        );
        Ok(store)
    }

    fn read_key(&self, key: &str) -> Result<Option<String>> {
        self.storage.get(key).map_err(|e| ReconError::StorageRead {
            key: key.to_string(),
            source: e,
        })
    }

    /// Replace everything with a single empty document.
    fn reset_to_initial_state(&mut self) {
        let doc = Document::new("");
        let id = doc.id.clone();
        self.documents = IndexMap::from([(id.clone(), doc)]);
        self.tabs = vec![id.clone()];
        self.session = Session {
            active: Some(id),
            floating: None,
            split_view: false,
        };
        self.dirty = true;
    }

    /// Drop duplicate tabs and append any document that has no tab.
    /// Tabs for missing documents are kept; views handle them.
    fn reconcile_tabs(&mut self) {
        let mut tabs: IndexSet<DocumentId> = self.tabs.drain(..).collect();
        for id in self.documents.keys() {
            tabs.insert(id.clone());
        }
        self.tabs = tabs.into_iter().collect();
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Serialize documents and tabs and write both keys in one batch.
    pub fn save(&mut self) -> Result<()> {
        let documents = serde_json::to_string(&self.documents)?;
        let tabs = serde_json::to_string(&self.tabs)?;

        self.storage
            .set_many(&[
                (self.keys.documents.as_str(), documents.as_str()),
                (self.keys.tabs.as_str(), tabs.as_str()),
            ])
            .map_err(|e| ReconError::StorageWrite {
                key: self.keys.documents.clone(),
                source: e,
            })?;

        self.dirty = false;
        Ok(())
    }

    /// Save only when something changed since the last save.
    /// Returns whether a write happened.
    pub fn save_if_dirty(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Run `f` as one logical transaction, then persist the result.
    ///
    /// ```
    /// use recon_core::DocumentStore;
    ///
    /// let mut store = DocumentStore::in_memory();
    /// let id = store
    ///     .transact(|store| store.create_document(Some("Inbox")))
    ///     .unwrap();
    /// assert!(!store.is_dirty());
    /// assert_eq!(store.get_document_by_title("Inbox"), Some(id));
    /// ```
    pub fn transact<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Result<R> {
        let result = f(self);
        self.save_if_dirty()?;
        Ok(result)
    }

    /// Whether there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The backing key-value store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// Look up a document.
    pub fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Mutable access for the mutation protocol; marks the store dirty.
    pub(crate) fn document_mut(&mut self, id: &DocumentId) -> Option<&mut Document> {
        let doc = self.documents.get_mut(id)?;
        self.dirty = true;
        Some(doc)
    }

    /// All documents in iteration (insertion) order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Number of documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Whether a document exists.
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.documents.contains_key(id)
    }

    /// Open tabs, in order. May reference documents that no longer exist.
    pub fn tabs(&self) -> &[DocumentId] {
        &self.tabs
    }

    /// Session view state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The active document id.
    pub fn active(&self) -> Option<&DocumentId> {
        self.session.active.as_ref()
    }

    /// The floating reference, if any.
    pub fn floating(&self) -> Option<&DocumentId> {
        self.session.floating.as_ref()
    }

    /// First tab that exists, else the first document.
    pub fn default_document(&self) -> Option<DocumentId> {
        self.tabs
            .iter()
            .find(|id| self.documents.contains_key(*id))
            .or_else(|| self.documents.keys().next())
            .cloned()
    }

    /// Id of the first document titled `title`, in iteration order.
    ///
    /// Titles are not unique; see [`DocumentStore::documents_by_title`].
    pub fn get_document_by_title(&self, title: &str) -> Option<DocumentId> {
        let mut matches = self.documents.values().filter(|doc| doc.title == title);
        let first = matches.next()?;
        if matches.next().is_some() {
            log::debug!(
                "Title '{}' matches several documents, using '{}'",
                title,
                first.id
            );
        }
        Some(first.id.clone())
    }

    /// Ids of every document titled `title`, in iteration order.
    pub fn documents_by_title(&self, title: &str) -> Vec<DocumentId> {
        self.documents
            .values()
            .filter(|doc| doc.title == title)
            .map(|doc| doc.id.clone())
            .collect()
    }

    /// Titles of all documents, in iteration order (for link auto-complete).
    pub fn get_all_document_titles(&self) -> Vec<String> {
        self.documents.values().map(|doc| doc.title.clone()).collect()
    }

    /// Documents that link to `title`, inline or through a page-link block.
    pub fn backlinks(&self, title: &str) -> Vec<DocumentId> {
        self.documents
            .values()
            .filter(|doc| doc.references_title(title))
            .map(|doc| doc.id.clone())
            .collect()
    }

    // ========================================================================
    // Document operations
    // ========================================================================

    /// Create a document, open it in a tab and make it active.
    ///
    /// `None` uses the configured default title.
    pub fn create_document(&mut self, title: Option<&str>) -> DocumentId {
        let id = self.create_background_document(title);
        self.session.active = Some(id.clone());
        id
    }

    /// Create a document and open it in a tab without activating it.
    pub fn create_background_document(&mut self, title: Option<&str>) -> DocumentId {
        let title = title.unwrap_or(&self.default_title).to_string();
        let doc = Document::new(title);
        let id = doc.id.clone();

        log::debug!("Creating document '{}' ({})", doc.title, id);
        self.documents.insert(id.clone(), doc);
        if !self.tabs.contains(&id) {
            self.tabs.push(id.clone());
        }
        self.dirty = true;
        id
    }

    /// Merge `patch` into a document. Returns `false` (and does nothing)
    /// when the document does not exist.
    pub fn update_document(&mut self, id: &DocumentId, patch: DocumentPatch) -> bool {
        match self.document_mut(id) {
            Some(doc) => {
                patch.apply(doc);
                true
            }
            None => {
                log::debug!("update_document: no document '{}'", id);
                false
            }
        }
    }

    /// Close a tab and delete its document.
    ///
    /// Refused with [`ReconError::LastDocument`] when only one document
    /// exists; nothing changes in that case. When the closed document was
    /// active, the tab that followed it becomes active, else the one before
    /// it, else any remaining document.
    pub fn close_tab(&mut self, id: &DocumentId) -> Result<()> {
        if self.documents.len() <= 1 {
            log::debug!("Refusing to close '{}': last document", id);
            return Err(ReconError::LastDocument(id.clone()));
        }

        let position = self.tabs.iter().position(|t| t == id);
        self.tabs.retain(|t| t != id);
        self.documents.shift_remove(id);

        if self.session.floating.as_ref() == Some(id) {
            self.session.floating = None;
        }
        if self.session.active.as_ref() == Some(id) {
            self.session.active = self.successor_tab(position.unwrap_or(self.tabs.len()));
        }

        self.dirty = true;
        Ok(())
    }

    /// The live tab at or after `position`, else before it, else any document.
    fn successor_tab(&self, position: usize) -> Option<DocumentId> {
        let exists = |id: &&DocumentId| self.documents.contains_key(*id);
        let split = position.min(self.tabs.len());
        self.tabs[split..]
            .iter()
            .find(exists)
            .or_else(|| self.tabs[..split].iter().rev().find(exists))
            .or_else(|| self.documents.keys().next())
            .cloned()
    }

    /// Open a document: in a tab (made active) or as the floating reference.
    pub fn open_document(&mut self, id: &DocumentId, in_new_tab: bool) {
        if in_new_tab {
            if !self.tabs.contains(id) {
                self.tabs.push(id.clone());
                self.dirty = true;
            }
            self.session.active = Some(id.clone());
        } else {
            self.session.floating = Some(id.clone());
        }
    }

    /// Make an existing document active. Returns `false` if it doesn't exist.
    pub fn set_active(&mut self, id: &DocumentId) -> bool {
        if !self.documents.contains_key(id) {
            return false;
        }
        self.session.active = Some(id.clone());
        true
    }

    /// Dismiss the floating reference window.
    pub fn close_floating(&mut self) {
        self.session.floating = None;
    }

    /// Open or close the split pane.
    pub fn set_split_view(&mut self, enabled: bool) {
        self.session.split_view = enabled;
    }

    /// Flip the split pane, returning the new state.
    pub fn toggle_split_view(&mut self) -> bool {
        self.session.split_view = !self.session.split_view;
        self.session.split_view
    }

    /// The document shown as the reference: the floating document if set,
    /// else the active one.
    pub fn reference_document(&self) -> Option<&DocumentId> {
        self.session.floating.as_ref().or(self.session.active.as_ref())
    }

    /// Follow a link by title: find the document (creating it when missing)
    /// and open it in a new tab or as the floating reference.
    ///
    /// `None`, with nothing changed, when `title` is not a valid link title.
    pub fn follow_link(&mut self, title: &str, in_new_tab: bool) -> Option<DocumentId> {
        if !is_valid_title(title) {
            log::debug!("follow_link: invalid title '{}'", title);
            return None;
        }
        let id = match self.get_document_by_title(title) {
            Some(id) => id,
            None => self.create_background_document(Some(title)),
        };
        self.open_document(&id, in_new_tab);
        Some(id)
    }

    // ========================================================================
    // Block CRUD
    // ========================================================================

    /// Insert `block` directly after `after`.
    ///
    /// With no anchor, or an anchor that is not in the document, the block is
    /// appended at the end. Returns the inserted id, or `None` when the
    /// document does not exist.
    pub fn add_block(
        &mut self,
        doc_id: &DocumentId,
        after: Option<&BlockId>,
        block: Block,
    ) -> Option<BlockId> {
        let doc = self.document_mut(doc_id)?;
        let index = match after {
            Some(anchor) => match doc.block_index(anchor) {
                Some(i) => i + 1,
                None => {
                    log::warn!(
                        "Anchor block '{}' not in document '{}', appending",
                        anchor,
                        doc_id
                    );
                    doc.blocks.len()
                }
            },
            None => doc.blocks.len(),
        };
        Some(doc.insert_block(index, block))
    }

    /// Append a block at the end of a document.
    pub fn append_block(&mut self, doc_id: &DocumentId, block: Block) -> Option<BlockId> {
        self.add_block(doc_id, None, block)
    }

    /// Insert a block before the first block of a document.
    pub fn prepend_block(&mut self, doc_id: &DocumentId, block: Block) -> Option<BlockId> {
        let doc = self.document_mut(doc_id)?;
        Some(doc.insert_block(0, block))
    }

    /// Merge `patch` into a block. Returns `false` when it does not exist.
    pub fn update_block(
        &mut self,
        doc_id: &DocumentId,
        block_id: &BlockId,
        patch: &BlockPatch,
    ) -> bool {
        let Some(block) = self
            .documents
            .get_mut(doc_id)
            .and_then(|doc| doc.block_mut(block_id))
        else {
            log::debug!("update_block: no block '{}' in '{}'", block_id, doc_id);
            return false;
        };
        patch.apply(block);
        self.dirty = true;
        true
    }

    /// Remove a block, keeping the order of the others.
    pub fn delete_block(&mut self, doc_id: &DocumentId, block_id: &BlockId) -> Option<Block> {
        let removed = self.documents.get_mut(doc_id)?.remove_block(block_id)?;
        self.dirty = true;
        Some(removed)
    }

    /// Look up a block.
    pub fn block(&self, doc_id: &DocumentId, block_id: &BlockId) -> Option<&Block> {
        self.documents.get(doc_id)?.block(block_id)
    }
}

fn decode_documents(raw: &str) -> serde_json::Result<IndexMap<DocumentId, Document>> {
    let mut documents: IndexMap<DocumentId, Document> = serde_json::from_str(raw)?;
    for (key, doc) in documents.iter_mut() {
        if &doc.id != key {
            log::warn!("Document stored under '{}' claims id '{}'", key, doc.id);
            doc.id = key.clone();
        }
        doc.dedupe_block_ids();
    }
    Ok(documents)
}
