//! Batch export orchestration: incremental skip decisions, dependency
//! aggregation, the dedup/filter pass, and the index commit.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{Attachment, Page, SourceDocument};
use crate::export::page::PageBuilder;
use crate::export::paths::page_target;
use crate::export::render::{AssetProvider, RenderOutcome, Renderer};
use crate::export::resolver::PathRegistry;
use crate::index::{ExportIndex, IndexError, IndexRecord};

/// Options recognized by the export pipeline.
///
/// Each field changes exactly one behavior; components receive this as an
/// explicit read-only context rather than reading ambient state.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Skip rebuilding documents whose output is unchanged per the index.
    pub incremental: bool,
    /// Drop directory parts so every output lands in the destination root.
    pub flatten_paths: bool,
    /// Rewrite hrefs and srcs to resolved output paths.
    pub fix_links: bool,
    /// Media refs produce no attachments; inlining is the renderer's job.
    pub inline_media: bool,
    /// Qualify bare heading anchors with the page's own target path.
    pub relative_header_links: bool,
    /// Frontmatter field consulted first for page titles.
    pub title_property: String,
    /// Icon token for non-media documents without an authored icon.
    pub default_file_icon: String,
    /// Icon token for media files without an authored icon.
    pub default_media_icon: String,
    /// Site base URL for canonical head links.
    pub site_url: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            incremental: true,
            flatten_paths: false,
            fix_links: true,
            inline_media: false,
            relative_header_links: false,
            title_property: "title".to_string(),
            default_file_icon: "file".to_string(),
            default_media_icon: "image".to_string(),
            site_url: None,
        }
    }
}

/// Fatal batch errors. Everything else is collected per document.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The export index could not be loaded or persisted. The batch aborts
    /// and no index commit happens.
    #[error("export aborted: {source}")]
    Aborted {
        #[from]
        source: IndexError,
    },
}

/// Cooperative cancellation signal, checked once per document boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. The batch stops at the next document
    /// boundary; a render already in flight finishes first.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of processing a single document.
#[derive(Debug, Clone)]
pub enum DocumentResult {
    /// The document was rendered and produced a page.
    Rebuilt,
    /// The index reported no change; nothing was rendered.
    Skipped,
    /// The render produced nothing this run; the index record is untouched.
    NoOutput,
    /// The document failed; the batch continues.
    Failed(String),
}

/// Trait for receiving progress updates during an export batch.
pub trait ProgressReporter {
    /// Called after each document is processed.
    fn on_document(&mut self, path: &str, result: DocumentResult);
    /// Called when the batch finishes or is cancelled.
    fn on_complete(&mut self, summary: &ExportSummary);
}

/// A no-op progress reporter.
#[derive(Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_document(&mut self, _path: &str, _result: DocumentResult) {}
    fn on_complete(&mut self, _summary: &ExportSummary) {}
}

/// Per-batch counters and collected non-fatal errors.
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// Documents rendered into pages this run.
    pub rebuilt: usize,
    /// Documents skipped: unchanged per the index, or no output produced.
    pub skipped: usize,
    /// Documents that errored.
    pub failed: usize,
    /// Human-readable error and warning lines.
    pub errors: Vec<String>,
}

/// How the batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Completed,
    /// Stopped at a document boundary; no index commit happened.
    Cancelled,
}

/// Everything a batch hands back to the caller, which writes the files.
#[derive(Debug)]
pub struct BatchOutcome {
    pub status: BatchStatus,
    pub pages: Vec<Page>,
    pub attachments: Vec<Arc<Attachment>>,
    pub summary: ExportSummary,
}

/// Drives one export batch over a set of source documents.
///
/// The index, once loaded, is held exclusively for the run; running two
/// batches against the same index concurrently is a caller error.
pub struct Exporter<'a> {
    renderer: &'a dyn Renderer,
    assets: &'a dyn AssetProvider,
    options: ExportOptions,
}

impl<'a> Exporter<'a> {
    /// Creates an exporter over the given collaborators and options.
    pub fn new(
        renderer: &'a dyn Renderer,
        assets: &'a dyn AssetProvider,
        options: ExportOptions,
    ) -> Self {
        Self {
            renderer,
            assets,
            options,
        }
    }

    /// Returns the export options.
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Runs one batch without progress reporting.
    pub fn export(
        &self,
        documents: &[SourceDocument],
        index_path: &Path,
        cancel: &CancelFlag,
    ) -> Result<BatchOutcome, ExportError> {
        self.export_with_progress(documents, index_path, cancel, &mut NoopReporter)
    }

    /// Runs one batch with progress reporting.
    ///
    /// Documents are processed one at a time in stable path order. Failures
    /// of individual documents never abort the batch; only an unreadable or
    /// unpersistable index does. On cancellation the prior index is left
    /// untouched.
    pub fn export_with_progress<P: ProgressReporter>(
        &self,
        documents: &[SourceDocument],
        index_path: &Path,
        cancel: &CancelFlag,
        progress: &mut P,
    ) -> Result<BatchOutcome, ExportError> {
        let mut summary = ExportSummary::default();

        // Init: load the prior index and decide whether this run can skip
        // unchanged documents. A corrupt index degrades to a full export; a
        // missing one just means there is nothing to be incremental against.
        let (mut index, incremental) = match ExportIndex::load(index_path) {
            Ok(Some(index)) => (index, self.options.incremental),
            Ok(None) => (ExportIndex::new(), false),
            Err(IndexError::Corrupt { source }) => {
                summary
                    .errors
                    .push(format!("export index is corrupt, running full export: {source}"));
                (ExportIndex::new(), false)
            }
            Err(e) => return Err(e.into()),
        };

        let mut ordered: Vec<&SourceDocument> = documents.iter().collect();
        ordered.sort_by(|a, b| a.path().cmp(b.path()));

        // Register every page target up front so links between documents
        // resolve even when their targets are skipped this run.
        let mut registry = PathRegistry::new();
        let mut source_stats: HashMap<String, (DateTime<Utc>, u64)> = HashMap::new();
        for doc in &ordered {
            let target = page_target(doc.path(), self.options.flatten_paths);
            registry.register_page(doc.path(), &target);
            source_stats.insert(doc.path().to_string(), (doc.modified(), doc.byte_len()));
        }

        let builder = PageBuilder::new(&self.options);
        let mut pages: Vec<Page> = Vec::new();

        for doc in &ordered {
            if cancel.is_cancelled() {
                progress.on_complete(&summary);
                return Ok(BatchOutcome {
                    status: BatchStatus::Cancelled,
                    pages,
                    attachments: Vec::new(),
                    summary,
                });
            }

            let target = page_target(doc.path(), self.options.flatten_paths);
            if incremental && !index.has_changed(&target, doc.modified(), doc.byte_len()) {
                summary.skipped += 1;
                progress.on_document(doc.path(), DocumentResult::Skipped);
                continue;
            }

            match self.renderer.render(doc, &self.options) {
                Err(e) => {
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {e}", doc.path()));
                    progress.on_document(doc.path(), DocumentResult::Failed(e.to_string()));
                }
                Ok(RenderOutcome::Cancelled) => {
                    summary.skipped += 1;
                    progress.on_document(doc.path(), DocumentResult::NoOutput);
                }
                Ok(RenderOutcome::Rendered(rendered)) => {
                    match builder.build(doc, &rendered, &mut registry, self.renderer) {
                        None => {
                            summary.skipped += 1;
                            progress.on_document(doc.path(), DocumentResult::NoOutput);
                        }
                        Some(built) => {
                            for missing in &built.missing_attachments {
                                summary.errors.push(format!(
                                    "{}: attachment not found: {missing}",
                                    doc.path()
                                ));
                            }
                            pages.push(built.page);
                            summary.rebuilt += 1;
                            progress.on_document(doc.path(), DocumentResult::Rebuilt);
                        }
                    }
                }
            }
        }

        // Aggregate: every page's attachments plus process-wide shared assets.
        let mut attachments: Vec<Arc<Attachment>> = pages
            .iter()
            .flat_map(|p| p.attachments().iter().cloned())
            .collect();
        for asset in self.assets.shared_assets() {
            attachments.push(Arc::new(asset));
        }

        // Dedup: keep the first occurrence of each target path, pages first.
        let mut seen: HashSet<String> = HashSet::new();
        let mut kept_pages = Vec::with_capacity(pages.len());
        for page in pages {
            if seen.insert(page.target_path().to_string()) {
                kept_pages.push(page);
            }
        }
        let mut kept_attachments = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            if seen.insert(attachment.target_path().to_string()) {
                kept_attachments.push(attachment);
            }
        }

        // Filter (incremental runs only): pages always survive; a font with
        // a record of the same length is treated as immutable and dropped
        // even when its mtime moved; everything else is kept only when the
        // index says it changed.
        if incremental {
            kept_attachments.retain(|attachment| {
                if attachment.kind().is_font()
                    && index
                        .lookup(attachment.target_path())
                        .is_some_and(|record| record.byte_len == attachment.byte_len())
                {
                    return false;
                }
                index.has_changed(
                    attachment.target_path(),
                    attachment.modified(),
                    attachment.byte_len(),
                )
            });
        }

        // Commit: one record per kept output. Page records carry the stats
        // of the source document that produced them.
        for page in &kept_pages {
            if let Some((modified, byte_len)) = source_stats.get(page.source_path()) {
                index.upsert(
                    page.target_path(),
                    IndexRecord {
                        modified: *modified,
                        byte_len: *byte_len,
                    },
                );
            }
        }
        for attachment in &kept_attachments {
            index.upsert(
                attachment.target_path(),
                IndexRecord {
                    modified: attachment.modified(),
                    byte_len: attachment.byte_len(),
                },
            );
        }
        index.save(index_path)?;

        progress.on_complete(&summary);

        Ok(BatchOutcome {
            status: BatchStatus::Completed,
            pages: kept_pages,
            attachments: kept_attachments,
            summary,
        })
    }
}
