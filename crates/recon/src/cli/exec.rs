//! Raw JSON command execution

use std::io::Read;

use recon_core::error::SerializableError;
use recon_core::storage::KeyValueStore;
use recon_core::{Command, DocumentStore};

/// Handle the 'exec' command
pub fn handle_exec<S: KeyValueStore>(store: &mut DocumentStore<S>, json: &str) -> bool {
    let input = if json == "-" {
        let mut buffer = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
            eprintln!("✗ Error reading stdin: {}", e);
            return false;
        }
        buffer
    } else {
        json.to_string()
    };

    match execute_json(store, &input) {
        Ok(output) => {
            println!("{}", output);
            true
        }
        Err(output) => {
            println!("{}", output);
            false
        }
    }
}

/// Parse and run one command, returning the pretty-printed response or
/// error.
fn execute_json<S: KeyValueStore>(
    store: &mut DocumentStore<S>,
    input: &str,
) -> Result<String, String> {
    let command: Command = serde_json::from_str(input.trim()).map_err(|e| {
        eprintln!("✗ Invalid command: {}", e);
        render(&SerializableError {
            kind: "InvalidCommand".to_string(),
            message: e.to_string(),
            key: None,
            path: None,
        })
    })?;

    log::debug!("Executing {:?}", command);
    match store.execute(command) {
        Ok(response) => Ok(render(&response)),
        Err(e) => {
            eprintln!("✗ {}", e);
            Err(render(&e.to_serializable()))
        }
    }
}

fn render<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}
