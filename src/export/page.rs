//! Page building: one rendered document into an exportable page.

use std::collections::HashSet;
use std::sync::Arc;

use regex::{Captures, Regex};

use crate::domain::{Attachment, DocumentKind, HeadMeta, MediaKind, OutboundLink, Page, SourceDocument};
use crate::export::html::strip_tags;
use crate::export::orchestrator::ExportOptions;
use crate::export::paths::page_target;
use crate::export::render::{RenderedDocument, Renderer};
use crate::export::resolver::{is_external, percent_decoded, LinkResolver, PathRegistry};
use crate::infra::{comparison_key, normalize_path_str, normalized_distance};

/// Icon override for canvas documents.
const CANVAS_ICON: &str = "canvas";

/// Collapse threshold for a first `<h1>` heading: normalized edit distance
/// to the resolved title at or below this removes the heading.
const H1_COLLAPSE_DISTANCE: f64 = 0.2;

/// Looser threshold for a first heading one level deeper.
const H2_COLLAPSE_DISTANCE: f64 = 0.4;

/// Alternate frontmatter title field consulted after the configured one.
const ALTERNATE_TITLE_FIELD: &str = "name";

/// Resolved title and icon for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleMeta {
    pub title: String,
    pub icon: String,
    /// True when the title was explicitly authored in frontmatter. A
    /// defaulted title may later be replaced by a matching first heading.
    pub authored: bool,
}

/// A built page together with its non-fatal discovery failures.
#[derive(Debug)]
pub struct BuiltPage {
    pub page: Page,
    /// Resource references that could not be loaded; the refs stay
    /// unresolved in the body.
    pub missing_attachments: Vec<String>,
}

/// Builds exportable pages from rendered documents.
///
/// Holds only the read-only export options; all batch state (the path
/// registry) is passed in explicitly by the orchestrator.
pub struct PageBuilder<'a> {
    options: &'a ExportOptions,
}

impl<'a> PageBuilder<'a> {
    /// Creates a builder over the given options.
    pub fn new(options: &'a ExportOptions) -> Self {
        Self { options }
    }

    /// Produces a page from one rendered document.
    ///
    /// Returns `None` when the rendered body is empty: no page is produced
    /// this run and the caller leaves the document's index record alone.
    pub fn build(
        &self,
        document: &SourceDocument,
        rendered: &RenderedDocument,
        registry: &mut PathRegistry,
        renderer: &dyn Renderer,
    ) -> Option<BuiltPage> {
        if rendered.body.trim().is_empty() {
            return None;
        }

        let target_path = page_target(document.path(), self.options.flatten_paths);
        let meta = self.resolve_title_and_icon(document);

        let (body, title) =
            self.collapse_redundant_heading(rendered.body.clone(), meta.title, meta.authored);

        let (attachments, missing_attachments) =
            self.discover_attachments(rendered, registry, renderer);

        let (body, outbound_links) = if self.options.fix_links {
            let resolver = LinkResolver::new(registry, self.options.relative_header_links);
            let (body, links) = remap_links(&body, &target_path, &resolver);
            let body = remap_embeds(&body, &target_path, &resolver);
            (body, links)
        } else {
            (body, Vec::new())
        };

        let head = HeadMeta {
            title: title.clone(),
            icon: meta.icon.clone(),
            canonical_url: self
                .options
                .site_url
                .as_deref()
                .map(|base| format!("{}/{}", base.trim_end_matches('/'), target_path)),
            description: document.metadata("description").map(String::from),
        };

        let page = Page {
            source_path: document.path().to_string(),
            target_path,
            title,
            icon: meta.icon,
            head,
            body,
            outbound_links,
            attachments,
        };

        Some(BuiltPage {
            page,
            missing_attachments,
        })
    }

    /// Resolves the page title and icon from frontmatter, with defaults.
    ///
    /// Title: the configured title field, else `name`, else the file stem.
    /// Icon: the `icon` field, else the media/file default, with a fixed
    /// override for canvas documents.
    pub fn resolve_title_and_icon(&self, document: &SourceDocument) -> TitleMeta {
        let authored_title = document
            .metadata(&self.options.title_property)
            .or_else(|| document.metadata(ALTERNATE_TITLE_FIELD));
        let authored = authored_title.is_some();
        let title = authored_title
            .map(String::from)
            .unwrap_or_else(|| document.file_stem().to_string());

        let icon = match document.metadata("icon") {
            Some(icon) => icon.to_string(),
            None if document.kind() == DocumentKind::Canvas => CANVAS_ICON.to_string(),
            None if MediaKind::from_path(document.path()).is_media() => {
                self.options.default_media_icon.clone()
            }
            None => self.options.default_file_icon.clone(),
        };

        TitleMeta {
            title,
            icon,
            authored,
        }
    }

    /// Removes a first heading that duplicates the page title.
    ///
    /// Applies only when the title was not explicitly authored and the
    /// heading's visible text is within the edit-distance threshold of the
    /// title (`<h1>` strict, `<h2>` looser). The removed heading's text
    /// becomes the title, so the emitted page carries exactly one title
    /// element.
    pub fn collapse_redundant_heading(
        &self,
        body: String,
        title: String,
        authored: bool,
    ) -> (String, String) {
        if authored {
            return (body, title);
        }

        let re = Regex::new(r"(?s)<h([1-6])[^>]*>(.*?)</h[1-6]>\n?").unwrap();
        let Some(caps) = re.captures(&body) else {
            return (body, title);
        };

        let threshold = match &caps[1] {
            "1" => H1_COLLAPSE_DISTANCE,
            "2" => H2_COLLAPSE_DISTANCE,
            _ => return (body, title),
        };

        let heading_text = strip_tags(&caps[2]);
        let distance = normalized_distance(
            &comparison_key(&heading_text),
            &comparison_key(&title),
        );
        if distance > threshold {
            return (body, title);
        }

        let whole = caps.get(0).unwrap();
        let mut collapsed = String::with_capacity(body.len());
        collapsed.push_str(&body[..whole.start()]);
        collapsed.push_str(&body[whole.end()..]);

        (collapsed, heading_text.trim().to_string())
    }

    /// Resolves every resource reference to a shared attachment.
    ///
    /// `data:` URIs and external URLs are skipped, as are media references
    /// when `inline_media` is set (the renderer inlines those itself).
    /// Known attachments are reused; new ones are requested from the
    /// renderer and registered for later pages. Load failures are non-fatal
    /// and reported back as missing.
    pub fn discover_attachments(
        &self,
        rendered: &RenderedDocument,
        registry: &mut PathRegistry,
        renderer: &dyn Renderer,
    ) -> (Vec<Arc<Attachment>>, Vec<String>) {
        let mut attachments = Vec::new();
        let mut missing = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for reference in &rendered.resource_refs {
            if is_external(reference) {
                continue;
            }

            let path = normalize_path_str(&percent_decoded(reference));
            if self.options.inline_media && MediaKind::from_path(&path).is_media() {
                continue;
            }

            let source = registry
                .resolve_source(&path)
                .map(String::from)
                .unwrap_or_else(|| path.clone());
            if !seen.insert(source.clone()) {
                continue;
            }

            if let Some(existing) = registry.attachment(&source) {
                attachments.push(Arc::clone(existing));
                continue;
            }
            if registry.target_for(&source).is_some() {
                // The reference embeds another page, not an attachment
                continue;
            }

            match renderer.load_attachment(&source, self.options) {
                Ok(attachment) => {
                    let attachment = Arc::new(attachment);
                    registry.register_attachment(Arc::clone(&attachment));
                    attachments.push(attachment);
                }
                Err(_) => missing.push(reference.clone()),
            }
        }

        (attachments, missing)
    }
}

/// Rewrites every `<a href>` through the resolver.
///
/// Resolved hrefs are written back; unresolved links keep the original href
/// and gain a marker class so styling can flag them.
fn remap_links(
    body: &str,
    current_page: &str,
    resolver: &LinkResolver<'_>,
) -> (String, Vec<OutboundLink>) {
    let re = Regex::new(r#"<a href="([^"]*)""#).unwrap();
    let mut links = Vec::new();

    let remapped = re.replace_all(body, |caps: &Captures| {
        let raw = &caps[1];
        let resolution = resolver.resolve(raw, current_page);
        match resolution.resolved_href() {
            Some(href) => {
                links.push(OutboundLink {
                    raw: raw.to_string(),
                    resolved: Some(href.clone()),
                });
                format!(r#"<a href="{href}""#)
            }
            None => {
                links.push(OutboundLink {
                    raw: raw.to_string(),
                    resolved: None,
                });
                format!(r#"<a class="unresolved-link" href="{raw}""#)
            }
        }
    });

    (remapped.into_owned(), links)
}

/// Rewrites every `src` through the resolver; unresolved references are
/// left untouched.
fn remap_embeds(body: &str, current_page: &str, resolver: &LinkResolver<'_>) -> String {
    let re = Regex::new(r#"src="([^"]*)""#).unwrap();
    re.replace_all(body, |caps: &Captures| {
        let raw = &caps[1];
        match resolver.resolve(raw, current_page).resolved_href() {
            Some(href) => format!(r#"src="{href}""#),
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentKind;
    use crate::export::render::{RenderError, RenderOutcome};
    use chrono::Utc;
    use std::collections::BTreeMap;

    /// Renderer over an in-memory attachment set.
    struct FakeRenderer {
        available: Vec<&'static str>,
    }

    impl Renderer for FakeRenderer {
        fn render(
            &self,
            _document: &SourceDocument,
            _options: &ExportOptions,
        ) -> Result<RenderOutcome, RenderError> {
            unimplemented!("page builder tests render externally")
        }

        fn load_attachment(
            &self,
            source_path: &str,
            options: &ExportOptions,
        ) -> Result<Attachment, RenderError> {
            if !self.available.contains(&source_path) {
                return Err(RenderError::Fs(crate::infra::FsError::NotFound {
                    path: source_path.into(),
                }));
            }
            let target =
                crate::export::paths::attachment_target(source_path, options.flatten_paths);
            Ok(Attachment::new(
                source_path,
                target,
                vec![0u8; 16],
                Utc::now(),
            ))
        }
    }

    fn doc(path: &str, metadata: &[(&str, &str)]) -> SourceDocument {
        let metadata: BTreeMap<String, String> = metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SourceDocument::new(path, 100, Utc::now(), metadata)
    }

    fn rendered(body: &str, refs: &[&str]) -> RenderedDocument {
        RenderedDocument {
            body: body.to_string(),
            kind: DocumentKind::Markdown,
            resource_refs: refs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn title_prefers_configured_property() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);

        let meta = builder.resolve_title_and_icon(&doc("a.md", &[("title", "Authored")]));
        assert_eq!(meta.title, "Authored");
        assert!(meta.authored);
    }

    #[test]
    fn title_falls_back_to_name_then_stem() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);

        let meta = builder.resolve_title_and_icon(&doc("a.md", &[("name", "Named")]));
        assert_eq!(meta.title, "Named");
        assert!(meta.authored);

        let meta = builder.resolve_title_and_icon(&doc("notes/child.md", &[]));
        assert_eq!(meta.title, "child");
        assert!(!meta.authored);
    }

    #[test]
    fn custom_title_property_is_honored() {
        let options = ExportOptions {
            title_property: "headline".to_string(),
            ..ExportOptions::default()
        };
        let builder = PageBuilder::new(&options);

        let meta = builder.resolve_title_and_icon(&doc("a.md", &[("headline", "Front Page")]));
        assert_eq!(meta.title, "Front Page");
    }

    #[test]
    fn icon_defaults_by_kind_with_canvas_override() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);

        let meta = builder.resolve_title_and_icon(&doc("a.md", &[]));
        assert_eq!(meta.icon, options.default_file_icon);

        let meta = builder.resolve_title_and_icon(&doc("board.canvas", &[]));
        assert_eq!(meta.icon, CANVAS_ICON);

        let meta = builder.resolve_title_and_icon(&doc("a.md", &[("icon", "compass")]));
        assert_eq!(meta.icon, "compass");
    }

    #[test]
    fn collapse_removes_matching_first_heading() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);

        let body = "<h1 id=\"My_Document\">My Document</h1>\n<p>Text.</p>".to_string();
        let (body, title) =
            builder.collapse_redundant_heading(body, "my document".to_string(), false);

        assert!(!body.contains("<h1"));
        assert_eq!(title, "My Document");
    }

    #[test]
    fn collapse_skips_authored_titles() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);

        let body = "<h1>My Document</h1>".to_string();
        let (body, title) =
            builder.collapse_redundant_heading(body, "My Document".to_string(), true);

        assert!(body.contains("<h1>"));
        assert_eq!(title, "My Document");
    }

    #[test]
    fn collapse_skips_dissimilar_heading() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);

        let body = "<h1>Completely Different</h1>".to_string();
        let (body, title) =
            builder.collapse_redundant_heading(body, "my document".to_string(), false);

        assert!(body.contains("<h1>"));
        assert_eq!(title, "my document");
    }

    #[test]
    fn collapse_threshold_is_looser_one_level_deeper() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);

        // ~27% distance: too far for an h1, close enough for an h2
        let title = "my document".to_string();
        let h1 = "<h1>my documentxxx</h1>".to_string();
        let (body, _) = builder.collapse_redundant_heading(h1, title.clone(), false);
        assert!(body.contains("<h1>"));

        let h2 = "<h2>my documentxxx</h2>".to_string();
        let (body, _) = builder.collapse_redundant_heading(h2, title, false);
        assert!(!body.contains("<h2>"));
    }

    #[test]
    fn discover_loads_and_registers_new_attachments() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);
        let renderer = FakeRenderer {
            available: vec!["img/a.png"],
        };
        let mut registry = PathRegistry::new();

        let (attachments, missing) = builder.discover_attachments(
            &rendered("", &["img/a.png", "img/a.png"]),
            &mut registry,
            &renderer,
        );

        assert_eq!(attachments.len(), 1); // deduplicated within the page
        assert!(missing.is_empty());
        assert!(registry.attachment("img/a.png").is_some());
    }

    #[test]
    fn discover_reuses_registered_attachments() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);
        let renderer = FakeRenderer { available: vec![] };
        let mut registry = PathRegistry::new();
        let shared = Arc::new(Attachment::new(
            "img/a.png",
            "img/a.png",
            vec![1u8],
            Utc::now(),
        ));
        registry.register_attachment(Arc::clone(&shared));

        let (attachments, missing) =
            builder.discover_attachments(&rendered("", &["img/a.png"]), &mut registry, &renderer);

        assert_eq!(attachments.len(), 1);
        assert!(Arc::ptr_eq(&attachments[0], &shared));
        assert!(missing.is_empty());
    }

    #[test]
    fn discover_reports_missing_attachments() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);
        let renderer = FakeRenderer { available: vec![] };
        let mut registry = PathRegistry::new();

        let (attachments, missing) =
            builder.discover_attachments(&rendered("", &["img/gone.png"]), &mut registry, &renderer);

        assert!(attachments.is_empty());
        assert_eq!(missing, vec!["img/gone.png"]);
    }

    #[test]
    fn discover_skips_external_and_data_refs() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);
        let renderer = FakeRenderer { available: vec![] };
        let mut registry = PathRegistry::new();

        let (attachments, missing) = builder.discover_attachments(
            &rendered("", &["https://cdn.example.com/x.png", "data:image/png;base64,AA"]),
            &mut registry,
            &renderer,
        );

        assert!(attachments.is_empty());
        assert!(missing.is_empty());
    }

    #[test]
    fn discover_skips_media_when_inlining() {
        let options = ExportOptions {
            inline_media: true,
            ..ExportOptions::default()
        };
        let builder = PageBuilder::new(&options);
        let renderer = FakeRenderer {
            available: vec!["img/a.png", "fonts/a.woff2"],
        };
        let mut registry = PathRegistry::new();

        let (attachments, _) = builder.discover_attachments(
            &rendered("", &["img/a.png", "fonts/a.woff2"]),
            &mut registry,
            &renderer,
        );

        // Fonts are not media and still collected
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].source_path(), "fonts/a.woff2");
    }

    #[test]
    fn build_produces_page_with_remapped_links() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);
        let renderer = FakeRenderer { available: vec![] };
        let mut registry = PathRegistry::new();
        registry.register_page("index.md", "index.html");
        registry.register_page("notes/child.md", "notes/child.html");

        let body = r##"<p><a href="notes/child.md#Section One">child</a> and <a href="nowhere.md">missing</a></p>"##;
        let built = builder
            .build(
                &doc("index.md", &[]),
                &rendered(body, &[]),
                &mut registry,
                &renderer,
            )
            .unwrap();

        let page = &built.page;
        assert_eq!(page.target_path(), "index.html");
        assert!(page
            .body()
            .contains(r#"<a href="notes/child.html#Section_One""#));
        assert!(page
            .body()
            .contains(r#"<a class="unresolved-link" href="nowhere.md""#));

        assert_eq!(page.outbound_links().len(), 2);
        assert_eq!(
            page.outbound_links()[0].resolved.as_deref(),
            Some("notes/child.html#Section_One")
        );
        assert!(page.outbound_links()[1].resolved.is_none());
    }

    #[test]
    fn build_returns_none_for_empty_body() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);
        let renderer = FakeRenderer { available: vec![] };
        let mut registry = PathRegistry::new();

        let built = builder.build(
            &doc("empty.md", &[]),
            &rendered("   \n", &[]),
            &mut registry,
            &renderer,
        );

        assert!(built.is_none());
    }

    #[test]
    fn build_leaves_links_alone_when_fixing_disabled() {
        let options = ExportOptions {
            fix_links: false,
            ..ExportOptions::default()
        };
        let builder = PageBuilder::new(&options);
        let renderer = FakeRenderer { available: vec![] };
        let mut registry = PathRegistry::new();
        registry.register_page("notes/child.md", "notes/child.html");

        let body = r#"<p><a href="notes/child.md">child</a></p>"#;
        let built = builder
            .build(
                &doc("index.md", &[]),
                &rendered(body, &[]),
                &mut registry,
                &renderer,
            )
            .unwrap();

        assert!(built.page.body().contains(r#"href="notes/child.md""#));
        assert!(built.page.outbound_links().is_empty());
    }

    #[test]
    fn build_assembles_head_metadata() {
        let options = ExportOptions {
            site_url: Some("https://notes.example.com/".to_string()),
            ..ExportOptions::default()
        };
        let builder = PageBuilder::new(&options);
        let renderer = FakeRenderer { available: vec![] };
        let mut registry = PathRegistry::new();

        let built = builder
            .build(
                &doc("notes/child.md", &[("description", "A child page")]),
                &rendered("<p>hi</p>", &[]),
                &mut registry,
                &renderer,
            )
            .unwrap();

        let head = built.page.head();
        assert_eq!(
            head.canonical_url.as_deref(),
            Some("https://notes.example.com/notes/child.html")
        );
        assert_eq!(head.description.as_deref(), Some("A child page"));
    }

    #[test]
    fn build_remaps_embed_sources() {
        let options = ExportOptions::default();
        let builder = PageBuilder::new(&options);
        let renderer = FakeRenderer {
            available: vec!["img/a.png"],
        };
        let mut registry = PathRegistry::new();

        let body = r#"<img src="img/a.png" alt="a">"#;
        let built = builder
            .build(
                &doc("index.md", &[]),
                &rendered(body, &["img/a.png"]),
                &mut registry,
                &renderer,
            )
            .unwrap();

        assert!(built.page.body().contains(r#"src="img/a.png""#));
        assert_eq!(built.page.attachments().len(), 1);
    }
}
