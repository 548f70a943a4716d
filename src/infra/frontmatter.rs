//! Frontmatter parser for extracting YAML metadata from source documents.

use std::collections::BTreeMap;

use thiserror::Error;

/// Result of splitting a document into frontmatter metadata and body.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Scalar frontmatter fields, flattened to strings.
    pub metadata: BTreeMap<String, String>,
    /// Everything after the closing delimiter (or the whole input when no
    /// frontmatter block is present).
    pub body: String,
}

/// Errors during frontmatter parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing closing frontmatter delimiter '---'")]
    MissingClosingDelimiter,

    #[error("invalid YAML in frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Parses document content with optional YAML frontmatter.
///
/// # Format
/// ```text
/// ---
/// title: Page Title
/// icon: compass
/// ---
/// Body content here...
/// ```
///
/// A document without a leading `---` line is returned whole as the body
/// with empty metadata. Only scalar values (strings, numbers, booleans) are
/// kept; sequences and nested mappings are ignored.
///
/// # Errors
///
/// Returns `ParseError` if an opened frontmatter block is never closed, or
/// if the YAML between the delimiters is invalid.
pub fn parse(content: &str) -> Result<ParsedDocument, ParseError> {
    let after_opening = if content.starts_with("---\r\n") {
        5
    } else if content.starts_with("---\n") {
        4
    } else {
        // No frontmatter block at all
        return Ok(ParsedDocument {
            metadata: BTreeMap::new(),
            body: content.to_string(),
        });
    };

    let yaml_and_rest = &content[after_opening..];
    let closing_pos = find_closing_delimiter(yaml_and_rest)?;

    let yaml_content = &yaml_and_rest[..closing_pos];

    // Body starts after the closing delimiter line
    let after_closing = &yaml_and_rest[closing_pos..];
    let body_start = if after_closing.starts_with("---\r\n") {
        closing_pos + 5
    } else if after_closing.starts_with("---\n") {
        closing_pos + 4
    } else {
        closing_pos + 3
    };

    let body = yaml_and_rest
        .get(body_start..)
        .unwrap_or_default()
        .to_string();

    let metadata = flatten_scalars(yaml_content)?;

    Ok(ParsedDocument { metadata, body })
}

/// Finds the byte offset of the closing `---` line within the text that
/// follows the opening delimiter.
fn find_closing_delimiter(text: &str) -> Result<usize, ParseError> {
    if text.starts_with("---\n") || text.starts_with("---\r\n") || text == "---" {
        return Ok(0);
    }

    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed == "---" && offset > 0 {
            return Ok(offset);
        }
        offset += line.len();
    }

    Err(ParseError::MissingClosingDelimiter)
}

/// Parses the YAML block and keeps only scalar top-level values.
fn flatten_scalars(yaml: &str) -> Result<BTreeMap<String, String>, ParseError> {
    let mut metadata = BTreeMap::new();

    if yaml.trim().is_empty() {
        return Ok(metadata);
    }

    let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    if let serde_yaml::Value::Mapping(mapping) = value {
        for (key, value) in mapping {
            let Some(key) = key.as_str() else { continue };
            let scalar = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            metadata.insert(key.to_string(), scalar);
        }
    }

    Ok(metadata)
}
