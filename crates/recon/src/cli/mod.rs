/// Clap argument definitions
mod args;

/// Block editing commands (add, edit, split, delete, check, convert, link)
mod block;

/// Config command handlers
mod config;

/// Document commands (new, list, show, title, close, open, follow, backlinks, route)
mod document;

/// Raw JSON command execution
mod exec;

/// Shared CLI utilities
mod util;

use clap::Parser;

use recon_core::DocumentStore;
use recon_core::storage::DirectoryStore;

/// The store the CLI works on: documents and tabs as JSON files in the data
/// directory.
pub type CliStore = DocumentStore<DirectoryStore>;

pub use args::Cli;
use args::Commands;

/// Main entry point for the CLI
pub fn run_cli() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let success = match cli.command {
        Commands::Config { command } => config::handle_config_command(command, cli.data_dir),
        command => match util::open_store(cli.data_dir) {
            Some(mut store) => run_command(&mut store, command),
            None => false,
        },
    };

    if !success {
        std::process::exit(1);
    }
}

/// Dispatch a store command. Returns true on success.
fn run_command(store: &mut CliStore, command: Commands) -> bool {
    match command {
        Commands::New { title } => document::handle_new(store, title),

        Commands::List => document::handle_list(store),

        Commands::Show { document, json } => document::handle_show(store, &document, json),

        Commands::Title { document, title } => document::handle_title(store, &document, title),

        Commands::Close { document } => document::handle_close(store, &document),

        Commands::Open { document } => document::handle_open(store, &document),

        Commands::Follow { title } => document::handle_follow(store, &title),

        Commands::Backlinks { title } => document::handle_backlinks(store, &title),

        Commands::Route { path } => document::handle_route(store, &path),

        Commands::Add {
            document,
            content,
            kind,
            level,
            after,
            first,
        } => block::handle_add(store, &document, content, kind, level, after, first),

        Commands::Edit {
            document,
            block,
            content,
        } => block::handle_edit(store, &document, &block, content),

        Commands::Split {
            document,
            block,
            cursor,
            selection,
            forced,
        } => block::handle_split(store, &document, &block, cursor, selection, forced),

        Commands::Delete { document, block } => block::handle_delete(store, &document, &block),

        Commands::Check { document, block } => block::handle_check(store, &document, &block),

        Commands::Convert {
            document,
            block,
            command,
        } => block::handle_convert(store, &document, &block, &command),

        Commands::Link {
            document,
            block,
            page,
            url,
        } => block::handle_link(store, &document, &block, page, url),

        Commands::Exec { json } => exec::handle_exec(store, &json),

        Commands::Config { .. } => unreachable!("config is handled before the store is opened"),
    }
}
