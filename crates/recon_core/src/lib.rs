#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Blocks (typed units of document content)
pub mod block;

/// Command pattern API
pub mod command;

/// Command execution
mod command_handler;

/// Configuration options
pub mod config;

/// Documents (titled, ordered block sequences)
pub mod document;

/// Error (common error types)
pub mod error;

/// Inline `[[Title]]` link parsing
pub mod link_parser;

/// Selection menus (slash commands, link types, page picker)
pub mod menu;

/// Block mutation protocol (Enter, Backspace, arrows, slash commands, links)
pub mod protocol;

/// `/doc/{id}` route resolution
pub mod route;

/// Key-value storage abstraction
pub mod storage;

/// Document store (documents, tabs, session pointers, persistence)
pub mod store;

#[cfg(test)]
pub mod test_utils;

pub use block::{Block, BlockId, BlockPatch, BlockType, LinkType};
pub use command::{Command, Response};
pub use document::{Document, DocumentId, DocumentPatch};
pub use error::{ReconError, Result};
pub use store::DocumentStore;
