//! Link classification and resolution against the batch's known paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::domain::Attachment;
use crate::export::paths::is_page_target;
use crate::infra::{heading_slug, normalize_path_str};

/// Per-batch registry of known source paths and their output targets.
///
/// Filled by the orchestrator before any document renders (pages) and as
/// attachments are discovered, so every page resolves against the same
/// path set. Bare file names resolve to the first-registered source with
/// that name; later registrations never steal a name.
#[derive(Debug, Default)]
pub struct PathRegistry {
    pages: BTreeMap<String, String>,
    attachments: BTreeMap<String, Arc<Attachment>>,
    by_name: HashMap<String, String>,
}

impl PathRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document's page target.
    pub fn register_page(&mut self, source_path: &str, target_path: &str) {
        self.remember_name(source_path);
        self.pages
            .insert(source_path.to_string(), target_path.to_string());
    }

    /// Registers a discovered attachment for reuse by later pages.
    pub fn register_attachment(&mut self, attachment: Arc<Attachment>) {
        self.remember_name(attachment.source_path());
        self.attachments
            .insert(attachment.source_path().to_string(), attachment);
    }

    /// Returns the already-loaded attachment for a source path, if any.
    pub fn attachment(&self, source_path: &str) -> Option<&Arc<Attachment>> {
        self.attachments.get(source_path)
    }

    /// Returns the output target for a known source path.
    pub fn target_for(&self, source_path: &str) -> Option<&str> {
        if let Some(target) = self.pages.get(source_path) {
            return Some(target);
        }
        self.attachments
            .get(source_path)
            .map(|a| a.target_path())
    }

    /// Resolves a raw path to a known source path: exact match first, then
    /// bare file name.
    pub fn resolve_source(&self, path: &str) -> Option<&str> {
        if let Some((key, _)) = self.pages.get_key_value(path) {
            return Some(key);
        }
        if let Some((key, _)) = self.attachments.get_key_value(path) {
            return Some(key);
        }
        let name = path.rsplit('/').next().unwrap_or(path);
        self.by_name.get(name).map(String::as_str)
    }

    fn remember_name(&mut self, source_path: &str) {
        let name = source_path.rsplit('/').next().unwrap_or(source_path);
        self.by_name
            .entry(name.to_string())
            .or_insert_with(|| source_path.to_string());
    }
}

/// Outcome of classifying one href or src.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// External URL or data URI, left verbatim.
    External(String),
    /// Pure heading fragment, already formatted as an href.
    Heading(String),
    /// A matched output target with an optional fragment.
    Target {
        path: String,
        fragment: Option<String>,
    },
    /// No known output path matched; the caller keeps the original href and
    /// marks the link.
    Unresolved,
}

impl Resolution {
    /// Returns the href to write back, or `None` for unresolved links.
    pub fn resolved_href(&self) -> Option<String> {
        match self {
            Resolution::External(href) | Resolution::Heading(href) => Some(href.clone()),
            Resolution::Target { path, fragment } => Some(match fragment {
                Some(fragment) => format!("{path}#{fragment}"),
                None => path.clone(),
            }),
            Resolution::Unresolved => None,
        }
    }
}

/// Classifies and resolves hrefs against a registry.
///
/// Resolution is a pure function over the registry; attachment discovery is
/// a separate page-builder step.
pub struct LinkResolver<'a> {
    registry: &'a PathRegistry,
    /// Qualify bare heading anchors with the current page's target path.
    relative_header_links: bool,
}

impl<'a> LinkResolver<'a> {
    /// Creates a resolver over the batch registry.
    pub fn new(registry: &'a PathRegistry, relative_header_links: bool) -> Self {
        Self {
            registry,
            relative_header_links,
        }
    }

    /// Resolves one href found in the page whose target is `current_page`.
    ///
    /// Classification order: external URLs and data URIs pass through
    /// untouched; pure `#fragment` hrefs become heading slugs; everything
    /// else is looked up in the registry after splitting off any
    /// `#fragment` or `?query` suffix (the query is dropped). Fragments on
    /// page targets are re-derived as heading slugs.
    pub fn resolve(&self, href: &str, current_page: &str) -> Resolution {
        if href.is_empty() {
            return Resolution::Unresolved;
        }

        if is_external(href) {
            return Resolution::External(href.to_string());
        }

        if let Some(fragment) = href.strip_prefix('#') {
            let slug = heading_slug(&percent_decoded(fragment));
            let href = if self.relative_header_links {
                format!("{current_page}#{slug}")
            } else {
                format!("#{slug}")
            };
            return Resolution::Heading(href);
        }

        let (path_part, fragment) = match href.split_once('#') {
            Some((path, fragment)) => (path, Some(percent_decoded(fragment))),
            None => (href, None),
        };
        let path_part = path_part.split_once('?').map_or(path_part, |(p, _)| p);
        let path = normalize_path_str(&percent_decoded(path_part));

        let Some(source) = self.registry.resolve_source(&path) else {
            return Resolution::Unresolved;
        };
        // resolve_source only answers for registered paths
        let target = self.registry.target_for(source).unwrap_or_default();

        let fragment = fragment.map(|f| {
            if is_page_target(target) {
                heading_slug(&f)
            } else {
                f
            }
        });

        Resolution::Target {
            path: target.to_string(),
            fragment,
        }
    }
}

/// Decodes percent-escapes the way markdown renderers write them into
/// href/src attributes.
pub(crate) fn percent_decoded(text: &str) -> String {
    percent_encoding::percent_decode_str(text)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| text.to_string())
}

/// Checks whether an href points outside the export: a URL with a scheme,
/// a protocol-relative URL, or a data URI.
pub(crate) fn is_external(href: &str) -> bool {
    if href.starts_with("//") {
        return true;
    }
    match href.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        None => false,
    }
}
