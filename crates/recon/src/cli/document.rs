//! Document command handlers (new, list, show, title, close, open, follow,
//! backlinks, route)

use recon_core::document::DocumentPatch;
use recon_core::route::{RouteTarget, route_for};
use recon_core::{Command, ReconError, Response};

use crate::cli::CliStore;
use crate::cli::util::{print_document, resolve_document};

/// Handle the 'new' command
pub fn handle_new(store: &mut CliStore, title: Option<String>) -> bool {
    match store.execute(Command::CreateDocument { title }) {
        Ok(Response::DocumentId(id)) => {
            let title = store
                .document(&id)
                .map(|d| d.display_title().to_string())
                .unwrap_or_default();
            println!("✓ Created '{}' ({})", title, id);
            true
        }
        Ok(other) => {
            eprintln!("✗ Unexpected response: {:?}", other);
            false
        }
        Err(e) => {
            eprintln!("✗ Error creating document: {}", e);
            false
        }
    }
}

/// Handle the 'list' command
pub fn handle_list(store: &CliStore) -> bool {
    let first = store.default_document();
    for id in store.tabs() {
        let marker = if Some(id) == first.as_ref() { "*" } else { " " };
        match store.document(id) {
            Some(doc) => println!(
                "{} {}  {} ({} blocks)",
                marker,
                id,
                doc.display_title(),
                doc.blocks.len()
            ),
            None => println!("{} {}  (missing)", marker, id),
        }
    }
    true
}

/// Handle the 'show' command
pub fn handle_show(store: &CliStore, reference: &str, json: bool) -> bool {
    let Some(id) = resolve_document(store, reference) else {
        return false;
    };
    let Some(doc) = store.document(&id) else {
        return false;
    };

    if json {
        match serde_json::to_string_pretty(doc) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("✗ Error serializing document: {}", e);
                return false;
            }
        }
    } else {
        print_document(doc);
        let backlinks = store.backlinks(&doc.title);
        if !doc.title.is_empty() && !backlinks.is_empty() {
            let titles: Vec<&str> = backlinks
                .iter()
                .filter_map(|id| store.document(id))
                .map(|d| d.display_title())
                .collect();
            println!("Linked from: {}", titles.join(", "));
        }
    }
    true
}

/// Handle the 'title' command
pub fn handle_title(store: &mut CliStore, reference: &str, title: String) -> bool {
    let Some(id) = resolve_document(store, reference) else {
        return false;
    };
    match store.execute(Command::UpdateDocument {
        id,
        patch: DocumentPatch::title(title.clone()),
    }) {
        Ok(_) => {
            println!("✓ Renamed to '{}'", title);
            true
        }
        Err(e) => {
            eprintln!("✗ Error renaming document: {}", e);
            false
        }
    }
}

/// Handle the 'close' command
pub fn handle_close(store: &mut CliStore, reference: &str) -> bool {
    let Some(id) = resolve_document(store, reference) else {
        return false;
    };
    match store.execute(Command::CloseTab { id: id.clone() }) {
        Ok(_) => {
            println!("✓ Closed {}", id);
            true
        }
        Err(ReconError::LastDocument(_)) => {
            eprintln!("✗ Cannot close the last document");
            false
        }
        Err(e) => {
            eprintln!("✗ Error closing document: {}", e);
            false
        }
    }
}

/// Handle the 'open' command
pub fn handle_open(store: &mut CliStore, reference: &str) -> bool {
    let Some(id) = resolve_document(store, reference) else {
        return false;
    };
    if let Err(e) = store.execute(Command::OpenDocument {
        id: id.clone(),
        in_new_tab: true,
    }) {
        eprintln!("✗ Error opening document: {}", e);
        return false;
    }
    handle_show(store, id.as_str(), false)
}

/// Handle the 'follow' command
pub fn handle_follow(store: &mut CliStore, title: &str) -> bool {
    let existed = store.get_document_by_title(title).is_some();
    match store.execute(Command::FollowLink {
        title: title.to_string(),
        in_new_tab: true,
    }) {
        Ok(Response::DocumentId(id)) => {
            if !existed {
                println!("✓ Created '{}' ({})", title, id);
            }
            handle_show(store, id.as_str(), false)
        }
        Ok(other) => {
            eprintln!("✗ Unexpected response: {:?}", other);
            false
        }
        Err(e) => {
            eprintln!("✗ Error following link: {}", e);
            false
        }
    }
}

/// Handle the 'backlinks' command
pub fn handle_backlinks(store: &CliStore, title: &str) -> bool {
    let ids = store.backlinks(title);
    if ids.is_empty() {
        println!("No documents link to '{}'", title);
        return true;
    }
    for id in ids {
        if let Some(doc) = store.document(&id) {
            println!("{}  {}", id, doc.display_title());
        }
    }
    true
}

/// Handle the 'route' command
pub fn handle_route(store: &mut CliStore, path: &str) -> bool {
    match store.execute(Command::ResolveRoute {
        path: path.to_string(),
    }) {
        Ok(Response::Route(RouteTarget::Document(id))) => {
            println!("{} → {}", path, route_for(&id));
            handle_show(store, id.as_str(), false)
        }
        Ok(Response::Route(RouteTarget::NotFound(id))) => {
            eprintln!("✗ Document not found: {}", id);
            false
        }
        Ok(other) => {
            eprintln!("✗ Unexpected response: {:?}", other);
            false
        }
        Err(e) => {
            eprintln!("✗ Error resolving route: {}", e);
            false
        }
    }
}
