//! Handler for the `status` command: a dry-run diff against the index.

use std::path::Path;

use anyhow::Result;

use super::export_index_path;
use crate::cli::config::Config;
use crate::cli::output::{DocumentListing, OutputFormat};
use crate::cli::StatusArgs;
use crate::export::page_target;
use crate::index::{ExportIndex, IndexError};
use crate::infra::scan_vault;

/// Handle the `status` command.
///
/// Lists every document with the state the next incremental export would
/// see: `new`, `modified`, or `unchanged`. Nothing is rendered or written.
pub fn handle_status(args: &StatusArgs, config: &Config, vault_dir: &Path) -> Result<()> {
    let output_dir = config.output_dir(args.output.as_ref())?;
    let index_path = export_index_path(&output_dir);

    let index = match ExportIndex::load(&index_path) {
        Ok(index) => index,
        Err(IndexError::Corrupt { .. }) => {
            eprintln!("export index is corrupt; the next export runs full");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let flatten = config.export.flatten_paths.unwrap_or(false);
    let documents = scan_vault(vault_dir)?;
    let listings: Vec<DocumentListing> = documents
        .iter()
        .map(|doc| {
            let target = page_target(doc.path(), flatten);
            let state = match &index {
                None => "new",
                Some(index) if index.lookup(&target).is_none() => "new",
                Some(index) if index.has_changed(&target, doc.modified(), doc.byte_len()) => {
                    "modified"
                }
                Some(_) => "unchanged",
            };
            DocumentListing {
                path: doc.path().to_string(),
                state: state.to_string(),
            }
        })
        .collect();

    print_listings(&args.cli_format, &listings);
    Ok(())
}

fn print_listings(format: &OutputFormat, listings: &[DocumentListing]) {
    match format {
        OutputFormat::Human => {
            for listing in listings {
                println!("{:10} {}", listing.state, listing.path);
            }
            let pending = listings.iter().filter(|l| l.state != "unchanged").count();
            println!(
                "{} document(s), {} would rebuild",
                listings.len(),
                pending
            );
        }
        OutputFormat::Json => {
            let output = serde_json::json!({ "data": listings });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
        }
        OutputFormat::Paths => {
            for listing in listings.iter().filter(|l| l.state != "unchanged") {
                println!("{}", listing.path);
            }
        }
    }
}
