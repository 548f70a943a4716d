//! Persisted export index: the prior run's record of emitted files.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the persisted index inside the destination directory.
pub const INDEX_FILE: &str = ".export-index.json";

/// Errors that can occur loading or persisting the export index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The persisted structure could not be parsed. Incremental mode falls
    /// back to a full export; the batch itself continues.
    #[error("export index is corrupt: {source}")]
    Corrupt {
        #[source]
        source: serde_json::Error,
    },

    /// The index file could not be read or written.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// What is known about one previously emitted file.
///
/// The values describe the *source* that produced the target: the source's
/// modification time and byte length at export time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Source modification time, milliseconds since the Unix epoch.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub modified: DateTime<Utc>,
    /// Source length in bytes.
    pub byte_len: u64,
}

/// The export index: a mapping from forward-slash-normalized relative
/// target path to the record of the source that produced it.
///
/// Held exclusively by one export batch for its duration; running two
/// batches against the same index concurrently is a caller error.
#[derive(Debug, Default)]
pub struct ExportIndex {
    records: BTreeMap<String, IndexRecord>,
    dirty: bool,
}

impl ExportIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the index from `path`.
    ///
    /// Returns `Ok(None)` when no index file exists (first export, or the
    /// destination was cleared). Returns `IndexError::Corrupt` when the file
    /// exists but cannot be parsed.
    pub fn load(path: &Path) -> IndexResult<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(IndexError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let records: BTreeMap<String, IndexRecord> =
            serde_json::from_str(&content).map_err(|source| IndexError::Corrupt { source })?;

        Ok(Some(Self {
            records,
            dirty: false,
        }))
    }

    /// Looks up the record for a target path.
    pub fn lookup(&self, target_path: &str) -> Option<&IndexRecord> {
        self.records.get(target_path)
    }

    /// Answers "has this target changed since the last export?".
    ///
    /// True when no record exists, when `modified` is newer than the
    /// record's, or when `byte_len` differs. Byte length is a cheap proxy
    /// for content change, not a cryptographic check: a same-size edit with
    /// an unchanged mtime goes undetected.
    pub fn has_changed(&self, target_path: &str, modified: DateTime<Utc>, byte_len: u64) -> bool {
        match self.records.get(target_path) {
            None => true,
            Some(record) => modified > record.modified || byte_len != record.byte_len,
        }
    }

    /// Inserts or overwrites the record for a target path.
    pub fn upsert(&mut self, target_path: impl Into<String>, record: IndexRecord) {
        let target_path = target_path.into();
        if self.records.get(&target_path) != Some(&record) {
            self.records.insert(target_path, record);
            self.dirty = true;
        }
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all records.
    pub fn records(&self) -> impl Iterator<Item = (&str, &IndexRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Persists the index to `path`, atomically, via a temporary file in the
    /// same directory followed by a rename.
    ///
    /// A no-op when nothing changed since load, which keeps the index file
    /// byte-identical across runs that rebuilt nothing.
    pub fn save(&mut self, path: &Path) -> IndexResult<()> {
        if !self.dirty {
            return Ok(());
        }

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|source| IndexError::Io {
            path: parent.to_path_buf(),
            source,
        })?;

        let io_err = |source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        };

        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|source| IndexError::Corrupt { source })?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.persist(path)
            .map_err(|e| io_err(e.error))?;

        self.dirty = false;
        Ok(())
    }
}
