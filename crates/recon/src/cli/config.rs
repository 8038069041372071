//! Config command handlers

use recon_core::config::Config;
use std::path::PathBuf;

use crate::cli::args::ConfigCommands;
use crate::cli::util::load_config;

pub fn handle_config_command(command: Option<ConfigCommands>, data_dir: Option<PathBuf>) -> bool {
    match command {
        None | Some(ConfigCommands::Show) => {
            let Some(mut config) = load_config() else {
                return false;
            };
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            show_config(&config);
            true
        }
        Some(ConfigCommands::Init) => init_config(data_dir),
        Some(ConfigCommands::Set { key, value }) => set_config(&key, value),
    }
}

/// Show the effective configuration
fn show_config(config: &Config) {
    println!("Recon Configuration");
    println!("===================");
    println!("Data directory: {}", config.data_dir.display());
    println!("Default title: {}", config.default_title);
    println!("Storage prefix: {}", config.storage_prefix);
    println!("  documents key: {}", config.documents_key());
    println!("  tabs key: {}", config.tabs_key());
    match Config::config_path() {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} (not created)", path.display()),
        None => println!("Config file: (no config directory)"),
    }
}

/// Write a config file holding default values
fn init_config(data_dir: Option<PathBuf>) -> bool {
    if let Some(path) = Config::config_path()
        && path.exists()
    {
        eprintln!("✗ Config already exists at {}", path.display());
        eprintln!("  Use 'recon config set' to change values");
        return false;
    }

    let config = match data_dir {
        Some(dir) => Config::new(dir),
        None => Config::default(),
    };

    match config.save() {
        Ok(()) => {
            println!("✓ Wrote default configuration");
            show_config(&config);
            true
        }
        Err(e) => {
            eprintln!("✗ Error saving config: {}", e);
            false
        }
    }
}

/// Change one configuration value and save
fn set_config(key: &str, value: String) -> bool {
    let Some(mut config) = load_config() else {
        return false;
    };

    match key {
        "data_dir" => config.data_dir = PathBuf::from(value),
        "default_title" => config.default_title = value,
        "storage_prefix" => config.storage_prefix = value,
        _ => {
            eprintln!("✗ Unknown config key '{}'", key);
            eprintln!("  Valid keys: data_dir, default_title, storage_prefix");
            return false;
        }
    }

    match config.save() {
        Ok(()) => {
            println!("✓ Set {}", key);
            true
        }
        Err(e) => {
            eprintln!("✗ Error saving config: {}", e);
            false
        }
    }
}
