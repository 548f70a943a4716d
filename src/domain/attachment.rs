//! Attachments referenced by exported pages.

use chrono::{DateTime, Utc};

/// Media classification for output files.
///
/// Decided once per file from its extension and carried as data so the
/// pipeline never re-derives it from ad hoc string checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Document,
    Canvas,
    Image,
    Audio,
    Video,
    Font,
    Style,
    Script,
    Other,
}

impl MediaKind {
    /// Classifies a path by its file extension.
    pub fn from_path(path: &str) -> Self {
        let ext = path
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "md" | "markdown" | "html" => MediaKind::Document,
            "canvas" => MediaKind::Canvas,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "avif" | "bmp" => MediaKind::Image,
            "mp3" | "wav" | "ogg" | "flac" | "m4a" => MediaKind::Audio,
            "mp4" | "webm" | "mov" | "mkv" => MediaKind::Video,
            "woff" | "woff2" | "ttf" | "otf" => MediaKind::Font,
            "css" => MediaKind::Style,
            "js" | "mjs" => MediaKind::Script,
            _ => MediaKind::Other,
        }
    }

    /// True for kinds that render as embedded media (image, audio, video).
    pub fn is_media(self) -> bool {
        matches!(self, MediaKind::Image | MediaKind::Audio | MediaKind::Video)
    }

    /// True for font-family files.
    pub fn is_font(self) -> bool {
        matches!(self, MediaKind::Font)
    }
}

/// One output file that is not a page: an image, font, stylesheet, or any
/// other resource referenced by a page.
///
/// Identity for deduplication purposes is `target_path`. An attachment is
/// shared between the pages that reference it and owned by the batch's
/// aggregate set once added.
#[derive(Debug, Clone)]
pub struct Attachment {
    source_path: String,
    target_path: String,
    bytes: Vec<u8>,
    modified: DateTime<Utc>,
    byte_len: u64,
    kind: MediaKind,
}

impl Attachment {
    /// Creates an attachment from loaded bytes.
    ///
    /// Both paths must be forward-slash normalized; `target_path` is
    /// destination-relative and keeps the original media extension.
    pub fn new(
        source_path: impl Into<String>,
        target_path: impl Into<String>,
        bytes: Vec<u8>,
        modified: DateTime<Utc>,
    ) -> Self {
        let source_path = source_path.into();
        let byte_len = bytes.len() as u64;
        let kind = MediaKind::from_path(&source_path);
        Self {
            source_path,
            target_path: target_path.into(),
            bytes,
            modified,
            byte_len,
            kind,
        }
    }

    /// Returns the vault-relative source path.
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Returns the destination-relative target path.
    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    /// Returns the file content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the source modification time.
    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Returns the content length in bytes.
    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// Returns the media kind.
    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}
