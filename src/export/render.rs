//! Renderer and asset-provider collaborators consumed by the orchestrator.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{Attachment, DocumentKind, SourceDocument};
use crate::export::html::{add_heading_anchors, markdown_to_html};
use crate::export::orchestrator::ExportOptions;
use crate::export::paths::attachment_target;
use crate::infra::{self, FsError};

/// Errors from a renderer collaborator.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("invalid document {path}: {message}")]
    InvalidDocument { path: PathBuf, message: String },
}

/// A document rendered into a placeable body.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Rendered body markup.
    pub body: String,
    /// The document kind that was rendered.
    pub kind: DocumentKind,
    /// Every resource reference (`src` value) found in the body, in order.
    pub resource_refs: Vec<String>,
}

/// Outcome of a render call.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    Rendered(RenderedDocument),
    /// The renderer gave up cooperatively; the document is skipped this run.
    Cancelled,
}

/// Converts one source document into a rendered body.
///
/// Implementations must be deterministic for identical inputs: the
/// incremental skip decision assumes an unchanged source re-renders to the
/// same output.
pub trait Renderer {
    /// Renders one document.
    fn render(
        &self,
        document: &SourceDocument,
        options: &ExportOptions,
    ) -> Result<RenderOutcome, RenderError>;

    /// Loads an attachment referenced by a rendered body.
    fn load_attachment(
        &self,
        source_path: &str,
        options: &ExportOptions,
    ) -> Result<Attachment, RenderError>;
}

/// Supplies process-wide shared assets, independent of any single page.
pub trait AssetProvider {
    fn shared_assets(&self) -> Vec<Attachment>;
}

/// An asset provider with nothing to add.
#[derive(Debug, Default)]
pub struct NoAssets;

impl AssetProvider for NoAssets {
    fn shared_assets(&self) -> Vec<Attachment> {
        Vec::new()
    }
}

/// Supplies the site stylesheet as a shared asset.
///
/// Built-in themes carry a fixed epoch timestamp so change detection keys
/// on the stylesheet's length; a custom CSS file keeps its real mtime.
#[derive(Debug)]
pub struct ThemeAssets {
    css: String,
    modified: chrono::DateTime<chrono::Utc>,
}

impl ThemeAssets {
    /// Resolves the theme once up front.
    ///
    /// `theme` is a built-in name (`default`, `dark`) or a CSS file path,
    /// as accepted by [`super::theme::get_theme_css`].
    pub fn new(theme: Option<&str>) -> anyhow::Result<Self> {
        let css = super::theme::get_theme_css(theme)?;
        let modified = match theme {
            Some(path) if Path::new(path).exists() => {
                infra::file_stat(Path::new(path)).map(|(_, m)| m)?
            }
            _ => chrono::DateTime::UNIX_EPOCH,
        };
        Ok(Self { css, modified })
    }
}

impl AssetProvider for ThemeAssets {
    fn shared_assets(&self) -> Vec<Attachment> {
        vec![Attachment::new(
            "style.css",
            "style.css",
            self.css.clone().into_bytes(),
            self.modified,
        )]
    }
}

/// Default renderer over a vault directory: markdown via pulldown-cmark,
/// canvas documents as a node list.
#[derive(Debug)]
pub struct VaultRenderer {
    vault_root: PathBuf,
}

impl VaultRenderer {
    /// Creates a renderer reading sources under `vault_root`.
    pub fn new(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
        }
    }

    fn render_markdown(&self, content: &str) -> RenderedDocument {
        // Frontmatter is metadata, not body
        let body_source = infra::parse(content)
            .map(|parsed| parsed.body)
            .unwrap_or_else(|_| content.to_string());

        let body = add_heading_anchors(&markdown_to_html(&body_source));
        let resource_refs = super::html::resource_references(&body);

        RenderedDocument {
            body,
            kind: DocumentKind::Markdown,
            resource_refs,
        }
    }

    fn render_canvas(&self, content: &str, path: &Path) -> Result<RenderedDocument, RenderError> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| RenderError::InvalidDocument {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut body = String::from("<div class=\"canvas\">\n");
        let mut resource_refs = Vec::new();

        let nodes = value
            .get("nodes")
            .and_then(|n| n.as_array())
            .cloned()
            .unwrap_or_default();

        for node in &nodes {
            match node.get("type").and_then(|t| t.as_str()) {
                Some("text") => {
                    let text = node.get("text").and_then(|t| t.as_str()).unwrap_or("");
                    body.push_str("<div class=\"canvas-node\">");
                    body.push_str(&markdown_to_html(text));
                    body.push_str("</div>\n");
                }
                Some("file") => {
                    let Some(file) = node.get("file").and_then(|f| f.as_str()) else {
                        continue;
                    };
                    body.push_str(&format!(
                        "<div class=\"canvas-node canvas-embed\"><img src=\"{file}\"></div>\n"
                    ));
                    resource_refs.push(file.to_string());
                }
                _ => {}
            }
        }

        body.push_str("</div>\n");

        Ok(RenderedDocument {
            body,
            kind: DocumentKind::Canvas,
            resource_refs,
        })
    }
}

impl Renderer for VaultRenderer {
    fn render(
        &self,
        document: &SourceDocument,
        _options: &ExportOptions,
    ) -> Result<RenderOutcome, RenderError> {
        let full_path = self.vault_root.join(document.path());
        let content = infra::read_to_string(&full_path)?;

        let rendered = match document.kind() {
            DocumentKind::Markdown => self.render_markdown(&content),
            DocumentKind::Canvas => self.render_canvas(&content, &full_path)?,
        };

        Ok(RenderOutcome::Rendered(rendered))
    }

    fn load_attachment(
        &self,
        source_path: &str,
        options: &ExportOptions,
    ) -> Result<Attachment, RenderError> {
        let full_path = self.vault_root.join(source_path);
        let bytes = infra::read_bytes(&full_path)?;
        let (_, modified) = infra::file_stat(&full_path)?;
        let target = attachment_target(source_path, options.flatten_paths);

        Ok(Attachment::new(source_path, target, bytes, modified))
    }
}
