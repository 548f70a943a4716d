//! Source document handles scanned from a vault.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// The kind of a source document, decided once from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// A markdown document.
    Markdown,
    /// A canvas document (JSON node graph).
    Canvas,
}

impl DocumentKind {
    /// Classifies a vault-relative path by extension.
    pub fn from_path(path: &str) -> Self {
        if path.rsplit('.').next().is_some_and(|ext| ext == "canvas") {
            DocumentKind::Canvas
        } else {
            DocumentKind::Markdown
        }
    }
}

/// A handle to one source document.
///
/// Owned by the caller and read-only to the export pipeline. The content
/// fingerprint is the pair of `byte_len` and `modified`; the body itself is
/// read by the renderer collaborator, not carried here.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    path: String,
    kind: DocumentKind,
    byte_len: u64,
    modified: DateTime<Utc>,
    metadata: BTreeMap<String, String>,
}

impl SourceDocument {
    /// Creates a new document handle.
    ///
    /// `path` must be vault-relative with forward slashes.
    pub fn new(
        path: impl Into<String>,
        byte_len: u64,
        modified: DateTime<Utc>,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        let path = path.into();
        let kind = DocumentKind::from_path(&path);
        Self {
            path,
            kind,
            byte_len,
            modified,
            metadata,
        }
    }

    /// Returns the vault-relative source path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the document kind.
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Returns the source file's length in bytes.
    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// Returns the source file's modification time.
    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Returns a scalar frontmatter field, if present.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Returns the file name without its extension.
    pub fn file_stem(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
    }
}
