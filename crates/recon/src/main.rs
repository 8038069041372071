#![doc = include_str!("../README.md")]

/// CLI module - command-line interface for recon
mod cli;

fn main() {
    cli::run_cli();
}
