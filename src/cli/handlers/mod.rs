//! Command handlers for the CLI.

mod completions;
mod export;
mod status;

use std::path::{Path, PathBuf};

use crate::export::{DocumentResult, ProgressReporter};

// Re-export public items
pub use completions::handle_completions;
pub use export::handle_export;
pub use status::handle_status;

/// Progress reporter that prints to stdout.
pub(crate) struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub(crate) fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn on_document(&mut self, path: &str, result: DocumentResult) {
        if self.verbose {
            match result {
                DocumentResult::Rebuilt => println!("  rebuilt: {path}"),
                DocumentResult::Skipped => println!("  skipped: {path}"),
                DocumentResult::NoOutput => println!("  no output: {path}"),
                DocumentResult::Failed(msg) => eprintln!("  error: {path}: {msg}"),
            }
        }
    }

    fn on_complete(&mut self, summary: &crate::export::ExportSummary) {
        if self.verbose && summary.failed > 0 {
            eprintln!("  {} document(s) failed", summary.failed);
        }
    }
}

/// Returns the export index path inside a destination directory.
pub(crate) fn export_index_path(output_dir: &Path) -> PathBuf {
    output_dir.join(crate::index::INDEX_FILE)
}
