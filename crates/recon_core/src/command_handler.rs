//! Command execution handler.
//!
//! This module contains the implementation of the `execute()` method for
//! `DocumentStore`. It handles all command types and returns appropriate
//! responses.

use crate::block::BlockId;
use crate::command::{Command, DocumentSummary, Response, SessionInfo};
use crate::document::{Document, DocumentId};
use crate::error::{ReconError, Result};
use crate::link_parser::{is_valid_title, parse_links};
use crate::protocol::{filter_commands, navigate};
use crate::storage::KeyValueStore;
use crate::store::DocumentStore;

impl<S: KeyValueStore> DocumentStore<S> {
    /// Execute a command and return the response.
    ///
    /// Mutating commands are saved once, after they have been applied.
    /// Lookups of documents or blocks that do not exist are reported as
    /// [`ReconError::DocumentNotFound`] / [`ReconError::BlockNotFound`].
    ///
    /// # Example
    ///
    /// ```
    /// use recon_core::{Command, DocumentStore, Response};
    ///
    /// let mut store = DocumentStore::in_memory();
    /// let response = store.execute(Command::GetAllDocumentTitles).unwrap();
    /// assert!(matches!(response, Response::Strings(titles) if titles.len() == 1));
    /// ```
    pub fn execute(&mut self, command: Command) -> Result<Response> {
        let read_only = command.is_read_only();
        let response = self.dispatch(command)?;
        if !read_only {
            self.save_if_dirty()?;
        }
        Ok(response)
    }

    fn dispatch(&mut self, command: Command) -> Result<Response> {
        match command {
            // === Document Operations ===
            Command::CreateDocument { title } => {
                Ok(Response::DocumentId(self.create_document(title.as_deref())))
            }

            Command::UpdateDocument { id, patch } => {
                Ok(Response::Bool(self.update_document(&id, patch)))
            }

            Command::GetDocument { id } => {
                let doc = self.require_document(&id)?;
                Ok(Response::Document(doc.clone()))
            }

            Command::ListDocuments => Ok(Response::Documents(
                self.documents().map(DocumentSummary::from).collect(),
            )),

            Command::GetDocumentByTitle { title } => self
                .get_document_by_title(&title)
                .map(Response::DocumentId)
                .ok_or(ReconError::TitleNotFound(title)),

            Command::DocumentsByTitle { title } => {
                Ok(Response::DocumentIds(self.documents_by_title(&title)))
            }

            Command::GetAllDocumentTitles => Ok(Response::Strings(self.get_all_document_titles())),

            Command::Backlinks { title } => Ok(Response::DocumentIds(self.backlinks(&title))),

            // === Tabs and Session ===
            Command::CloseTab { id } => {
                self.close_tab(&id)?;
                Ok(Response::Ok)
            }

            Command::OpenDocument { id, in_new_tab } => {
                self.require_document(&id)?;
                self.open_document(&id, in_new_tab);
                Ok(Response::Ok)
            }

            Command::SetActive { id } => {
                if self.set_active(&id) {
                    Ok(Response::Ok)
                } else {
                    Err(ReconError::DocumentNotFound(id))
                }
            }

            Command::CloseFloating => {
                self.close_floating();
                Ok(Response::Ok)
            }

            Command::SetSplitView { enabled } => {
                self.set_split_view(enabled);
                Ok(Response::Ok)
            }

            Command::ToggleSplitView => Ok(Response::Bool(self.toggle_split_view())),

            Command::GetSession => Ok(Response::Session(self.session_info())),

            Command::FollowLink { title, in_new_tab } => self
                .follow_link(&title, in_new_tab)
                .map(Response::DocumentId)
                .ok_or(ReconError::InvalidLinkTitle(title)),

            Command::ResolveRoute { path } => match self.resolve_route(&path) {
                Some(target) => Ok(Response::Route(target)),
                None => Err(ReconError::DocumentNotFound(DocumentId::from(path))),
            },

            // === Block Operations ===
            Command::AddBlock {
                document,
                after,
                block,
            } => self
                .add_block(&document, after.as_ref(), block)
                .map(Response::BlockId)
                .ok_or(ReconError::DocumentNotFound(document)),

            Command::PrependBlock { document, block } => self
                .prepend_block(&document, block)
                .map(Response::BlockId)
                .ok_or(ReconError::DocumentNotFound(document)),

            Command::UpdateBlock {
                document,
                block,
                patch,
            } => Ok(Response::Bool(self.update_block(&document, &block, &patch))),

            Command::DeleteBlock { document, block } => {
                Ok(Response::Bool(self.delete_block(&document, &block).is_some()))
            }

            Command::SplitBlock {
                document,
                block,
                request,
            } => match self.split_block(&document, &block, request) {
                Some(outcome) => Ok(Response::Split(outcome)),
                None => Err(self.missing(document, block)),
            },

            Command::Backspace {
                document,
                block,
                request,
            } => match self.backspace(&document, &block, request) {
                Some(outcome) => Ok(Response::Backspace(outcome)),
                None => Err(self.missing(document, block)),
            },

            Command::Navigate {
                document,
                block,
                direction,
                cursor,
            } => {
                let doc = self.require_document(&document)?;
                if doc.block(&block).is_none() {
                    return Err(self.missing(document, block));
                }
                Ok(Response::Focus(navigate(doc, &block, direction, cursor)))
            }

            Command::ToggleCheckbox { document, block } => {
                match self.toggle_checkbox(&document, &block) {
                    Some(checked) => Ok(Response::Bool(checked)),
                    None => Err(self.missing(document, block)),
                }
            }

            // === Slash Commands and Links ===
            Command::FilterCommands { query } => Ok(Response::Commands(filter_commands(&query))),

            Command::ApplyCommand {
                document,
                target,
                command,
            } => self
                .apply_command(&document, target.as_ref(), command)
                .map(Response::Command)
                .ok_or(ReconError::DocumentNotFound(document)),

            Command::SelectLinkType {
                document,
                block,
                link_type,
            } => self
                .select_link_type(&document, block.as_ref(), link_type)
                .map(Response::BlockId)
                .ok_or(ReconError::DocumentNotFound(document)),

            Command::ResolvePageLink {
                document,
                block,
                title,
            } => {
                if !is_valid_title(&title) {
                    return Err(ReconError::InvalidLinkTitle(title));
                }
                match self.resolve_page_link(&document, &block, &title) {
                    Some(link) => Ok(Response::PageLink(link)),
                    None => Err(self.missing(document, block)),
                }
            }

            Command::SetUrlLink {
                document,
                block,
                url,
            } => {
                if self.set_url_link(&document, &block, &url) {
                    Ok(Response::Ok)
                } else {
                    Err(self.missing(document, block))
                }
            }

            Command::ClearLink { document, block } => {
                Ok(Response::Bool(self.clear_link(&document, &block)))
            }

            Command::GetLinkState { document, block } => {
                if self.block(&document, &block).is_none() {
                    return Err(self.missing(document, block));
                }
                Ok(Response::LinkState(self.link_state(&document, &block)))
            }

            Command::ParseLinks { text } => Ok(Response::Segments(parse_links(&text).collect())),
        }
    }

    fn require_document(&self, id: &DocumentId) -> Result<&Document> {
        self.document(id)
            .ok_or_else(|| ReconError::DocumentNotFound(id.clone()))
    }

    /// The error for a missing block, or for its missing document.
    fn missing(&self, document: DocumentId, block: BlockId) -> ReconError {
        if self.contains(&document) {
            ReconError::BlockNotFound { document, block }
        } else {
            ReconError::DocumentNotFound(document)
        }
    }

    fn session_info(&self) -> SessionInfo {
        let session = self.session();
        SessionInfo {
            tabs: self.tabs().to_vec(),
            active: session.active.clone(),
            floating: session.floating.clone(),
            split_view: session.split_view,
            reference: self.reference_document().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, BlockPatch, LinkState, LinkType};
    use crate::config::Config;
    use crate::protocol::{EnterRequest, SlashCommand, SplitOutcome};
    use crate::storage::InMemoryStore;
    use crate::test_utils::{block_id, store_with_blocks};

    fn document_id(response: Response) -> DocumentId {
        match response {
            Response::DocumentId(id) => id,
            other => panic!("expected a document id, got {:?}", other),
        }
    }

    #[test]
    fn test_create_and_lookup() {
        let mut store = DocumentStore::in_memory();
        let id = document_id(
            store
                .execute(Command::CreateDocument {
                    title: Some("X".to_string()),
                })
                .unwrap(),
        );
        let found = document_id(
            store
                .execute(Command::GetDocumentByTitle {
                    title: "X".to_string(),
                })
                .unwrap(),
        );
        assert_eq!(found, id);

        let err = store
            .execute(Command::GetDocumentByTitle {
                title: "Y".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, ReconError::TitleNotFound(t) if t == "Y"));
    }

    #[test]
    fn test_mutations_are_saved() {
        let storage = InMemoryStore::new();
        let config = Config::new(Default::default());
        let mut store = DocumentStore::new(storage.clone(), &config);

        store
            .execute(Command::CreateDocument {
                title: Some("Saved".to_string()),
            })
            .unwrap();
        assert!(!store.is_dirty());

        let reloaded = DocumentStore::load(storage, &config).unwrap();
        assert!(reloaded.get_document_by_title("Saved").is_some());
    }

    #[test]
    fn test_read_only_commands_do_not_write() {
        let storage = InMemoryStore::new();
        let mut store = DocumentStore::new(storage.clone(), &Config::new(Default::default()));
        store.execute(Command::ListDocuments).unwrap();
        assert!(storage.is_empty());
        assert!(store.is_dirty());
    }

    #[test]
    fn test_close_last_document_error() {
        let mut store = DocumentStore::in_memory();
        let id = store.tabs()[0].clone();
        let err = store.execute(Command::CloseTab { id }).unwrap_err();
        assert_eq!(err.to_serializable().kind, "LastDocument");
        assert_eq!(store.document_count(), 1);
    }

    #[test]
    fn test_split_through_command() {
        let (mut store, doc) = store_with_blocks(&["hello world"]);
        let block = block_id(&store, &doc, 0);
        let response = store
            .execute(Command::SplitBlock {
                document: doc.clone(),
                block,
                request: EnterRequest::at(5),
            })
            .unwrap();
        assert!(matches!(response, Response::Split(SplitOutcome::Split { .. })));
        assert_eq!(store.document(&doc).unwrap().blocks.len(), 2);
    }

    #[test]
    fn test_missing_block_and_document_errors() {
        let (mut store, doc) = store_with_blocks(&["a"]);
        let err = store
            .execute(Command::SplitBlock {
                document: doc.clone(),
                block: BlockId::from("ghost"),
                request: EnterRequest::at(0),
            })
            .unwrap_err();
        assert!(matches!(err, ReconError::BlockNotFound { .. }));

        let err = store
            .execute(Command::GetDocument {
                id: DocumentId::from("ghost"),
            })
            .unwrap_err();
        assert!(matches!(err, ReconError::DocumentNotFound(_)));
    }

    #[test]
    fn test_update_missing_is_false() {
        let (mut store, doc) = store_with_blocks(&["a"]);
        let response = store
            .execute(Command::UpdateBlock {
                document: doc,
                block: BlockId::from("ghost"),
                patch: BlockPatch::content("x"),
            })
            .unwrap();
        assert!(matches!(response, Response::Bool(false)));
    }

    #[test]
    fn test_link_flow_through_commands() {
        let (mut store, doc) = store_with_blocks(&["/link"]);
        let block = block_id(&store, &doc, 0);

        let response = store
            .execute(Command::ApplyCommand {
                document: doc.clone(),
                target: Some(block.clone()),
                command: SlashCommand::Link,
            })
            .unwrap();
        assert!(matches!(response, Response::Command(_)));
        assert_eq!(store.block(&doc, &block).unwrap().content, "/link");

        store
            .execute(Command::SelectLinkType {
                document: doc.clone(),
                block: Some(block.clone()),
                link_type: LinkType::Page,
            })
            .unwrap();
        store
            .execute(Command::ResolvePageLink {
                document: doc.clone(),
                block: block.clone(),
                title: "Target".to_string(),
            })
            .unwrap();

        let response = store
            .execute(Command::GetLinkState {
                document: doc.clone(),
                block,
            })
            .unwrap();
        assert!(matches!(response, Response::LinkState(Some(LinkState::Resolved))));
        assert_eq!(store.backlinks("Target"), vec![doc]);
    }

    #[test]
    fn test_invalid_link_titles_are_rejected() {
        let (mut store, doc) = store_with_blocks(&["a"]);
        let block = block_id(&store, &doc, 0);
        store.save().unwrap();

        let err = store
            .execute(Command::ResolvePageLink {
                document: doc.clone(),
                block,
                title: String::new(),
            })
            .unwrap_err();
        assert!(matches!(err, ReconError::InvalidLinkTitle(_)));
        assert_eq!(err.to_serializable().kind, "InvalidLinkTitle");

        let err = store
            .execute(Command::FollowLink {
                title: "[[Nested".to_string(),
                in_new_tab: true,
            })
            .unwrap_err();
        assert!(matches!(err, ReconError::InvalidLinkTitle(_)));
        assert_eq!(store.document_count(), 1);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_update_document_command_reids_repeated_blocks() {
        let (mut store, doc) = store_with_blocks(&[]);
        store
            .execute(Command::UpdateDocument {
                id: doc.clone(),
                patch: crate::document::DocumentPatch {
                    title: None,
                    blocks: Some(vec![
                        Block::paragraph("a").with_id("dup"),
                        Block::paragraph("b").with_id("dup"),
                    ]),
                },
            })
            .unwrap();

        let second = block_id(&store, &doc, 1);
        assert_ne!(second, BlockId::from("dup"));
        store
            .execute(Command::SplitBlock {
                document: doc.clone(),
                block: second,
                request: EnterRequest::at(0),
            })
            .unwrap();
        let contents: Vec<String> = store
            .document(&doc)
            .unwrap()
            .blocks
            .iter()
            .map(|b| b.content.clone())
            .collect();
        assert_eq!(contents, vec!["a", "", "b"]);
    }

    #[test]
    fn test_session_info() {
        let mut store = DocumentStore::in_memory();
        let id = store.create_background_document(Some("Ref"));
        store
            .execute(Command::OpenDocument {
                id: id.clone(),
                in_new_tab: false,
            })
            .unwrap();
        store.execute(Command::ToggleSplitView).unwrap();

        match store.execute(Command::GetSession).unwrap() {
            Response::Session(info) => {
                assert_eq!(info.floating, Some(id.clone()));
                assert_eq!(info.reference, Some(id));
                assert!(info.split_view);
                assert_eq!(info.tabs.len(), 2);
            }
            other => panic!("expected session, got {:?}", other),
        }
    }

    #[test]
    fn test_add_block_to_missing_document() {
        let mut store = DocumentStore::in_memory();
        let err = store
            .execute(Command::AddBlock {
                document: DocumentId::from("ghost"),
                after: None,
                block: Block::paragraph("x"),
            })
            .unwrap_err();
        assert!(matches!(err, ReconError::DocumentNotFound(_)));
    }

    #[test]
    fn test_parse_links_command() {
        let mut store = DocumentStore::in_memory();
        match store
            .execute(Command::ParseLinks {
                text: "a [[B]] c".to_string(),
            })
            .unwrap()
        {
            Response::Segments(segments) => assert_eq!(segments.len(), 3),
            other => panic!("expected segments, got {:?}", other),
        }
    }
}
