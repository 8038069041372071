//! Command pattern API for unified command execution.
//!
//! Every runtime (the CLI, a WASM host, IPC) drives the store through
//! [`DocumentStore::execute`](crate::DocumentStore::execute) with a
//! serializable [`Command`]. Each command is one logical transaction: it is
//! applied, then the store is saved once.
//!
//! # Usage
//!
//! ```
//! use recon_core::{Command, DocumentStore, Response};
//!
//! let mut store = DocumentStore::in_memory();
//! let response = store
//!     .execute(Command::CreateDocument { title: Some("Inbox".to_string()) })
//!     .unwrap();
//!
//! if let Response::DocumentId(id) = response {
//!     assert_eq!(store.document(&id).unwrap().title, "Inbox");
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockId, BlockPatch, LinkState, LinkType};
use crate::document::{Document, DocumentId, DocumentPatch};
use crate::link_parser::Segment;
use crate::protocol::{
    BackspaceOutcome, BackspaceRequest, CommandOutcome, Direction, EnterRequest, PageLink,
    SlashCommand, SplitOutcome,
};
use crate::route::RouteTarget;

// ============================================================================
// Command Types
// ============================================================================

/// All commands that can be executed against a [`DocumentStore`](crate::DocumentStore).
///
/// Commands are serializable for cross-runtime usage (WASM, IPC, etc.).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum Command {
    // === Document Operations ===
    /// Create a document, open it in a tab and make it active.
    CreateDocument {
        /// Title; the configured default when absent.
        #[serde(default)]
        title: Option<String>,
    },

    /// Merge fields into a document.
    UpdateDocument {
        /// Document id.
        id: DocumentId,
        /// Fields to change.
        patch: DocumentPatch,
    },

    /// Get a document.
    GetDocument {
        /// Document id.
        id: DocumentId,
    },

    /// Summaries of all documents, in order.
    ListDocuments,

    /// First document with a title.
    GetDocumentByTitle {
        /// Exact title.
        title: String,
    },

    /// Every document with a title.
    DocumentsByTitle {
        /// Exact title.
        title: String,
    },

    /// All document titles, in order.
    GetAllDocumentTitles,

    /// Documents linking to a title.
    Backlinks {
        /// Exact title.
        title: String,
    },

    // === Tabs and Session ===
    /// Close a tab and delete its document.
    CloseTab {
        /// Document id.
        id: DocumentId,
    },

    /// Open a document in a tab or as the floating reference.
    OpenDocument {
        /// Document id.
        id: DocumentId,
        /// Open in a tab (and activate) instead of the floating window.
        #[serde(default)]
        in_new_tab: bool,
    },

    /// Make a document active.
    SetActive {
        /// Document id.
        id: DocumentId,
    },

    /// Dismiss the floating reference.
    CloseFloating,

    /// Open or close the split pane.
    SetSplitView {
        /// New state.
        enabled: bool,
    },

    /// Flip the split pane.
    ToggleSplitView,

    /// Tabs and session pointers.
    GetSession,

    /// Follow a link by title, creating the document if needed.
    FollowLink {
        /// Link target title.
        title: String,
        /// Open in a tab instead of the floating window.
        #[serde(default)]
        in_new_tab: bool,
    },

    /// Resolve a `/doc/{id}` path and activate its document.
    ResolveRoute {
        /// Route path.
        path: String,
    },

    // === Block Operations ===
    /// Insert a block after another (or at the end).
    AddBlock {
        /// Document id.
        document: DocumentId,
        /// Anchor block; appends when absent or missing.
        #[serde(default)]
        after: Option<BlockId>,
        /// Block to insert.
        block: Block,
    },

    /// Insert a block before the first block.
    PrependBlock {
        /// Document id.
        document: DocumentId,
        /// Block to insert.
        block: Block,
    },

    /// Merge fields into a block.
    UpdateBlock {
        /// Document id.
        document: DocumentId,
        /// Block id.
        block: BlockId,
        /// Fields to change.
        patch: BlockPatch,
    },

    /// Remove a block.
    DeleteBlock {
        /// Document id.
        document: DocumentId,
        /// Block id.
        block: BlockId,
    },

    /// Enter inside a block.
    SplitBlock {
        /// Document id.
        document: DocumentId,
        /// Block id.
        block: BlockId,
        /// Caret, selection and modifier.
        request: EnterRequest,
    },

    /// Backspace inside a block.
    Backspace {
        /// Document id.
        document: DocumentId,
        /// Block id.
        block: BlockId,
        /// Caret and selection.
        request: BackspaceRequest,
    },

    /// Which block an arrow key moves to.
    Navigate {
        /// Document id.
        document: DocumentId,
        /// Block id.
        block: BlockId,
        /// Arrow direction.
        direction: Direction,
        /// Caret offset.
        cursor: usize,
    },

    /// Flip a checkbox.
    ToggleCheckbox {
        /// Document id.
        document: DocumentId,
        /// Block id.
        block: BlockId,
    },

    // === Slash Commands and Links ===
    /// Slash commands matching a query.
    FilterCommands {
        /// Text typed after `/`.
        #[serde(default)]
        query: String,
    },

    /// Apply a slash command.
    ApplyCommand {
        /// Document id.
        document: DocumentId,
        /// Block to convert; appends a new block when absent or missing.
        #[serde(default)]
        target: Option<BlockId>,
        /// Chosen command.
        command: SlashCommand,
    },

    /// Choose the link type for a block.
    SelectLinkType {
        /// Document id.
        document: DocumentId,
        /// Block to turn into a link; appends one when absent or missing.
        #[serde(default)]
        block: Option<BlockId>,
        /// Page or URL.
        link_type: LinkType,
    },

    /// Point a link block at a page by title.
    ResolvePageLink {
        /// Document id.
        document: DocumentId,
        /// Block id.
        block: BlockId,
        /// Target title.
        title: String,
    },

    /// Point a link block at a URL.
    SetUrlLink {
        /// Document id.
        document: DocumentId,
        /// Block id.
        block: BlockId,
        /// Target URL.
        url: String,
    },

    /// Return a link block to awaiting selection.
    ClearLink {
        /// Document id.
        document: DocumentId,
        /// Block id.
        block: BlockId,
    },

    /// Where a link block is in its selection flow.
    GetLinkState {
        /// Document id.
        document: DocumentId,
        /// Block id.
        block: BlockId,
    },

    /// Split text into text and `[[link]]` segments.
    ParseLinks {
        /// Text to scan.
        text: String,
    },
}

impl Command {
    /// Whether the command never changes persisted state.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Command::GetDocument { .. }
                | Command::ListDocuments
                | Command::GetDocumentByTitle { .. }
                | Command::DocumentsByTitle { .. }
                | Command::GetAllDocumentTitles
                | Command::Backlinks { .. }
                | Command::GetSession
                | Command::Navigate { .. }
                | Command::FilterCommands { .. }
                | Command::GetLinkState { .. }
                | Command::ParseLinks { .. }
        )
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Response from command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Response {
    /// Command completed with no return value.
    Ok,

    /// Boolean response.
    Bool(bool),

    /// String array response.
    Strings(Vec<String>),

    /// Document id response.
    DocumentId(DocumentId),

    /// Document id list response.
    DocumentIds(Vec<DocumentId>),

    /// Document response.
    Document(Document),

    /// Document summaries response.
    Documents(Vec<DocumentSummary>),

    /// Block id response.
    BlockId(BlockId),

    /// Optional block id response (focus targets).
    Focus(Option<BlockId>),

    /// Session response.
    Session(SessionInfo),

    /// Enter outcome.
    Split(SplitOutcome),

    /// Backspace outcome.
    Backspace(BackspaceOutcome),

    /// Slash command list.
    Commands(Vec<SlashCommand>),

    /// Slash command outcome.
    Command(CommandOutcome),

    /// Page link resolution.
    PageLink(PageLink),

    /// Link state (`None` for non-link blocks).
    LinkState(Option<LinkState>),

    /// Route resolution.
    Route(RouteTarget),

    /// Parsed link segments.
    Segments(Vec<Segment>),
}

// ============================================================================
// Helper Types
// ============================================================================

/// One line of a document listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Document id.
    pub id: DocumentId,
    /// Title as displayed ("Untitled" when empty).
    pub title: String,
    /// Number of blocks.
    pub block_count: usize,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.display_title().to_string(),
            block_count: doc.blocks.len(),
        }
    }
}

/// Tabs and session pointers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Open tabs, in order.
    pub tabs: Vec<DocumentId>,
    /// Active document.
    pub active: Option<DocumentId>,
    /// Floating reference.
    pub floating: Option<DocumentId>,
    /// Whether the split pane is open.
    pub split_view: bool,
    /// Document shown in the split pane.
    pub reference: Option<DocumentId>,
}

// ============================================================================
// Tests
// ============================================================================
