//! warren - incremental website export for markdown vaults

pub mod cli;
pub mod domain;
pub mod export;
pub mod index;
pub mod infra;

use anyhow::Result;
use clap::Parser;

use cli::{
    config::Config,
    handlers::{handle_completions, handle_export, handle_status},
    Cli, Command,
};

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    let vault_dir = config.vault_dir(cli.dir.as_ref());
    let verbose = cli.verbose > 0;

    match &cli.command {
        Command::Export(args) => handle_export(args, &config, &vault_dir, verbose),
        Command::Status(args) => handle_status(args, &config, &vault_dir),
        Command::Completions(args) => handle_completions(args),
    }
}
