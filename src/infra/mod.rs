//! Vault I/O, frontmatter parsing, slugs, similarity

mod frontmatter;
mod fs;
mod similarity;
mod slug;

pub use frontmatter::{parse, ParseError, ParsedDocument};
pub use fs::{
    file_stat, normalize_path, normalize_path_str, read_bytes, read_document, read_to_string,
    scan_vault, FsError,
};
pub use similarity::{comparison_key, levenshtein, normalized_distance};
pub use slug::heading_slug;
