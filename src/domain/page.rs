//! Exportable pages produced from rendered documents.

use std::sync::Arc;

use crate::domain::Attachment;

/// Head metadata assembled for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadMeta {
    /// Resolved page title.
    pub title: String,
    /// Resolved page icon token.
    pub icon: String,
    /// Canonical URL, present when a site URL is configured.
    pub canonical_url: Option<String>,
    /// Description, when authored in frontmatter.
    pub description: Option<String>,
}

/// One link found in a page body, with its resolution outcome.
///
/// `resolved` is `None` for links whose destination could not be matched to
/// any known output path; the original href is preserved in the body with a
/// marker class in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundLink {
    pub raw: String,
    pub resolved: Option<String>,
}

/// A placeable output page.
///
/// Pages are created fresh per export pass and never persisted as objects;
/// only their emitted bytes and index records survive the run.
#[derive(Debug, Clone)]
pub struct Page {
    pub(crate) source_path: String,
    pub(crate) target_path: String,
    pub(crate) title: String,
    pub(crate) icon: String,
    pub(crate) head: HeadMeta,
    pub(crate) body: String,
    pub(crate) outbound_links: Vec<OutboundLink>,
    pub(crate) attachments: Vec<Arc<Attachment>>,
}

impl Page {
    /// Returns the vault-relative source path.
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Returns the destination-relative target path (always `.html`).
    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    /// Returns the resolved title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the resolved icon token.
    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Returns the assembled head metadata.
    pub fn head(&self) -> &HeadMeta {
        &self.head
    }

    /// Returns the remapped body content.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the links found in the body, in document order.
    pub fn outbound_links(&self) -> &[OutboundLink] {
        &self.outbound_links
    }

    /// Returns the attachments this page depends on.
    pub fn attachments(&self) -> &[Arc<Attachment>] {
        &self.attachments
    }
}
