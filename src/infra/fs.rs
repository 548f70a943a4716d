//! Vault scanning and file metadata for the export pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;
use walkdir::WalkDir;

use crate::domain::SourceDocument;
use crate::infra::frontmatter;

/// Source extensions that produce pages.
const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown", "canvas"];

/// Errors during file system operations on the vault.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    InvalidEncoding { path: PathBuf },
}

/// Converts a path to a forward-slash string regardless of host conventions.
pub fn normalize_path(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    out
}

/// Normalizes an href-style path string: backslashes become forward slashes
/// and a leading `./` is stripped.
pub fn normalize_path_str(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").unwrap_or(&path).to_string()
}

/// Scans a vault directory for source documents.
///
/// Hidden files and directories (starting with `.`) are skipped, which also
/// excludes any export index placed inside the vault. Documents are returned
/// sorted by path so batch processing order is stable.
pub fn scan_vault(vault_dir: &Path) -> Result<Vec<SourceDocument>, FsError> {
    let mut documents = Vec::new();

    let walker = WalkDir::new(vault_dir)
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = entry.map_err(|e| FsError::Io {
            path: vault_dir.to_path_buf(),
            source: std::io::Error::other(e.to_string()),
        })?;

        if !entry.file_type().is_file() || !is_document(entry.path()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(vault_dir)
            .unwrap_or(entry.path());
        documents.push(read_document(vault_dir, &normalize_path(relative))?);
    }

    documents.sort_by(|a, b| a.path().cmp(b.path()));
    Ok(documents)
}

/// Reads one document's handle: file metadata plus frontmatter fields.
///
/// Unparseable frontmatter yields empty metadata; the document itself still
/// exports.
pub fn read_document(vault_dir: &Path, relative: &str) -> Result<SourceDocument, FsError> {
    let full_path = vault_dir.join(relative);
    let (byte_len, modified) = file_stat(&full_path)?;
    let content = read_to_string(&full_path)?;

    let metadata = frontmatter::parse(&content)
        .map(|parsed| parsed.metadata)
        .unwrap_or_default();

    Ok(SourceDocument::new(relative, byte_len, modified, metadata))
}

/// Reads a file's content as UTF-8.
pub fn read_to_string(path: &Path) -> Result<String, FsError> {
    let bytes = read_bytes(path)?;
    String::from_utf8(bytes).map_err(|_| FsError::InvalidEncoding {
        path: path.to_path_buf(),
    })
}

/// Reads a file's raw bytes.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, FsError> {
    std::fs::read(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => FsError::NotFound {
            path: path.to_path_buf(),
        },
        _ => FsError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Returns a file's length and modification time.
///
/// The modification time is truncated to millisecond precision, the
/// resolution the export index persists, so a stored record compares equal
/// to a fresh stat of the same file.
pub fn file_stat(path: &Path) -> Result<(u64, DateTime<Utc>), FsError> {
    let meta = std::fs::metadata(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => FsError::NotFound {
            path: path.to_path_buf(),
        },
        _ => FsError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let modified = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .map_err(|source| FsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let modified = Utc
        .timestamp_millis_opt(modified.timestamp_millis())
        .single()
        .unwrap_or(modified);

    Ok((meta.len(), modified))
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
