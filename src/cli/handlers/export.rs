//! Handler for the `export` command.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::{export_index_path, ConsoleReporter};
use crate::cli::{output::OutputFormat, ExportArgs};
use crate::cli::config::Config;
use crate::export::template::{render_page_html, ShellOptions};
use crate::export::{
    BatchOutcome, BatchStatus, CancelFlag, Exporter, ThemeAssets, VaultRenderer,
};
use crate::infra::scan_vault;

/// Result of an export operation.
#[derive(Debug, Serialize)]
pub struct ExportResult {
    /// Documents rendered into pages this run
    pub rebuilt: usize,
    /// Documents skipped as unchanged
    pub skipped: usize,
    /// Documents that failed
    pub failed: usize,
    /// Attachments written alongside the pages
    pub attachments: usize,
    /// Destination directory
    pub output: String,
}

/// Handle the `export` command.
pub fn handle_export(
    args: &ExportArgs,
    config: &Config,
    vault_dir: &Path,
    verbose: bool,
) -> Result<()> {
    let output_dir = config.output_dir(args.output.as_ref())?;
    let options = config.export_options(args);
    let theme = config.theme(args.theme.as_deref());

    let documents = scan_vault(vault_dir)
        .with_context(|| format!("failed to scan vault at {}", vault_dir.display()))?;

    let renderer = VaultRenderer::new(vault_dir);
    let assets = ThemeAssets::new(theme)?;
    let exporter = Exporter::new(&renderer, &assets, options);

    let cancel = CancelFlag::new();
    let mut reporter = ConsoleReporter::new(verbose);
    let outcome = exporter.export_with_progress(
        &documents,
        &export_index_path(&output_dir),
        &cancel,
        &mut reporter,
    )?;

    if outcome.status == BatchStatus::Cancelled {
        println!("Export cancelled; nothing was written.");
        return Ok(());
    }

    write_outputs(&outcome, &output_dir, args)?;

    for error in &outcome.summary.errors {
        eprintln!("  {error}");
    }

    let result = ExportResult {
        rebuilt: outcome.summary.rebuilt,
        skipped: outcome.summary.skipped,
        failed: outcome.summary.failed,
        attachments: outcome.attachments.len(),
        output: output_dir.display().to_string(),
    };
    print_result(&args.cli_format, &outcome, result);

    Ok(())
}

/// Writes the final page and attachment sets under the destination root.
fn write_outputs(outcome: &BatchOutcome, output_dir: &Path, args: &ExportArgs) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let shell = ShellOptions {
        template_path: args.template.as_deref(),
    };

    for page in &outcome.pages {
        let html = render_page_html(page, &shell)?;
        write_file(output_dir, page.target_path(), html.as_bytes())?;
    }

    for attachment in &outcome.attachments {
        write_file(output_dir, attachment.target_path(), attachment.bytes())?;
    }

    Ok(())
}

fn write_file(output_dir: &Path, target: &str, bytes: &[u8]) -> Result<()> {
    let path = output_dir.join(target);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

/// Print the result in the requested format.
fn print_result(format: &OutputFormat, outcome: &BatchOutcome, result: ExportResult) {
    match format {
        OutputFormat::Human => {
            println!(
                "Exported {} page(s) and {} attachment(s) to {} ({} skipped, {} failed)",
                result.rebuilt, result.attachments, result.output, result.skipped, result.failed
            );
        }
        OutputFormat::Json => {
            let output = serde_json::json!({ "data": result });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
        }
        OutputFormat::Paths => {
            for page in &outcome.pages {
                println!("{}", page.target_path());
            }
            for attachment in &outcome.attachments {
                println!("{}", attachment.target_path());
            }
        }
    }
}
