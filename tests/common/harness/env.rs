//! Isolated test environment with temp vault and destination directories.

use super::{TestDocument, WarrenCommand};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment: a vault directory of source documents and a
/// destination directory for exported output.
///
/// Both temp directories are cleaned up automatically on drop.
pub struct TestEnv {
    vault: TempDir,
    dest: TempDir,
}

impl TestEnv {
    /// Creates a new isolated test environment.
    pub fn new() -> Self {
        Self {
            vault: TempDir::new().expect("Failed to create vault temp directory"),
            dest: TempDir::new().expect("Failed to create destination temp directory"),
        }
    }

    /// Returns the vault directory path.
    pub fn vault_dir(&self) -> &Path {
        self.vault.path()
    }

    /// Returns the destination directory path.
    pub fn output_dir(&self) -> &Path {
        self.dest.path()
    }

    /// Returns the path where the export index is stored.
    pub fn index_path(&self) -> PathBuf {
        self.dest.path().join(".export-index.json")
    }

    /// Writes a document fixture into the vault.
    pub fn add_document(&self, document: &TestDocument) -> PathBuf {
        self.write_file(document.path(), document.content().as_bytes())
    }

    /// Writes raw bytes into the vault (attachments, fonts).
    pub fn write_file(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.vault.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, bytes).expect("Failed to write vault file");
        path
    }

    /// Reads an exported output file as a string.
    pub fn read_output(&self, relative: &str) -> String {
        std::fs::read_to_string(self.dest.path().join(relative))
            .unwrap_or_else(|e| panic!("Failed to read output {relative}: {e}"))
    }

    /// True when an exported output file exists.
    pub fn output_exists(&self, relative: &str) -> bool {
        self.dest.path().join(relative).exists()
    }

    /// Returns a command wrapper pointed at this environment's vault.
    pub fn cmd(&self) -> WarrenCommand {
        WarrenCommand::new(self.vault.path())
    }

    /// Returns an export command pointed at this environment's destination.
    pub fn export_cmd(&self) -> WarrenCommand {
        self.cmd().export(self.dest.path())
    }

    /// Returns a status command pointed at this environment's destination.
    pub fn status_cmd(&self) -> WarrenCommand {
        self.cmd().status(self.dest.path())
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
