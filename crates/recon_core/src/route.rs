//! Route resolution.
//!
//! The editor addresses documents as `/doc/{id}`. Anything else (including
//! `/`) resolves to the first tab, or the first document when no tab points
//! at a live one.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::document::DocumentId;
use crate::storage::KeyValueStore;
use crate::store::DocumentStore;

const DOC_PREFIX: &str = "/doc/";

/// Where a path leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RouteTarget {
    /// An existing document, now active
    Document(DocumentId),
    /// `/doc/{id}` for an id with no document
    NotFound(DocumentId),
}

/// The path for a document.
pub fn route_for(id: &DocumentId) -> String {
    format!("{DOC_PREFIX}{id}")
}

/// The document id named by `path`, if it is a `/doc/{id}` route.
pub fn parse_route(path: &str) -> Option<DocumentId> {
    let id = path.strip_prefix(DOC_PREFIX)?.trim_end_matches('/');
    (!id.is_empty() && !id.contains('/')).then(|| DocumentId::from(id))
}

impl<S: KeyValueStore> DocumentStore<S> {
    /// Resolve `path` and activate the document it leads to.
    ///
    /// `None` only when the store has no documents at all.
    pub fn resolve_route(&mut self, path: &str) -> Option<RouteTarget> {
        match parse_route(path) {
            Some(id) if self.set_active(&id) => Some(RouteTarget::Document(id)),
            Some(id) => {
                log::debug!("Route '{}' names a missing document", path);
                Some(RouteTarget::NotFound(id))
            }
            None => {
                let id = self.default_document()?;
                self.set_active(&id);
                Some(RouteTarget::Document(id))
            }
        }
    }
}
