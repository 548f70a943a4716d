//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod output;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use output::OutputFormat;

/// warren - incremental website export for markdown vaults
#[derive(Parser, Debug)]
#[command(name = "warren", version, about, long_about = None)]
pub struct Cli {
    /// Vault directory containing the source documents
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export the vault to a static website
    Export(ExportArgs),

    /// Show which documents would be rebuilt
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `export` command
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Destination directory for the exported site
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Force a full export, ignoring the prior index
    #[arg(long)]
    pub full: bool,

    /// Place every output file in the destination root
    #[arg(long)]
    pub flatten: bool,

    /// Leave hrefs untouched instead of rewriting them
    #[arg(long)]
    pub no_fix_links: bool,

    /// Skip media attachments; the renderer inlines them
    #[arg(long)]
    pub inline_media: bool,

    /// Qualify heading anchors with the page's own path
    #[arg(long)]
    pub relative_header_links: bool,

    /// Frontmatter field used as the page title
    #[arg(long)]
    pub title_property: Option<String>,

    /// Site base URL for canonical links
    #[arg(long)]
    pub site_url: Option<String>,

    /// Theme name ("default", "dark") or a CSS file path
    #[arg(long)]
    pub theme: Option<String>,

    /// Custom page template file
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Human)]
    pub cli_format: OutputFormat,
}

/// Arguments for the `status` command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Destination directory holding the export index
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Human)]
    pub cli_format: OutputFormat,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
