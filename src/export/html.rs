//! Markdown to HTML conversion and body inspection helpers.

use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

use crate::infra::heading_slug;

/// Converts markdown text to HTML.
///
/// Enables common markdown extensions:
/// - Tables
/// - Footnotes
/// - Strikethrough
/// - Task lists
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// Adds `id` anchors to headings so fragment links can land on them.
///
/// The anchor is the heading slug of the heading's visible text.
pub fn add_heading_anchors(body: &str) -> String {
    let re = Regex::new(r"(?s)<h([1-6])>(.*?)</h[1-6]>").unwrap();
    re.replace_all(body, |caps: &regex::Captures| {
        let level = &caps[1];
        let inner = &caps[2];
        let slug = heading_slug(&strip_tags(inner));
        format!(r#"<h{level} id="{slug}">{inner}</h{level}>"#)
    })
    .into_owned()
}

/// Collects every `src` attribute value in a rendered body, in order.
pub fn resource_references(body: &str) -> Vec<String> {
    let re = Regex::new(r#"src="([^"]*)""#).unwrap();
    re.captures_iter(body)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Removes markup tags, leaving visible text.
pub(crate) fn strip_tags(html: &str) -> String {
    let re = Regex::new(r"<[^>]+>").unwrap();
    re.replace_all(html, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_html_basic() {
        let html = markdown_to_html("# Heading\n\nParagraph text.");

        assert!(html.contains("<h1>Heading</h1>"));
        assert!(html.contains("<p>Paragraph text.</p>"));
    }

    #[test]
    fn test_markdown_to_html_links() {
        let html = markdown_to_html("[link](https://example.com)");

        assert!(html.contains(r#"<a href="https://example.com">link</a>"#));
    }

    #[test]
    fn test_markdown_to_html_image() {
        let html = markdown_to_html("![alt text](image.png)");

        assert!(html.contains("<img"));
        assert!(html.contains(r#"src="image.png""#));
    }

    #[test]
    fn test_markdown_to_html_tables() {
        let html = markdown_to_html("| A | B |\n|---|---|\n| 1 | 2 |");

        assert!(html.contains("<table>"));
        assert!(html.contains("<th>A</th>"));
    }

    #[test]
    fn test_markdown_to_html_strikethrough() {
        let html = markdown_to_html("This is ~~deleted~~ text.");

        assert!(html.contains("<del>deleted</del>"));
    }

    #[test]
    fn test_markdown_to_html_task_list() {
        let html = markdown_to_html("- [x] Done\n- [ ] Todo");

        assert!(html.contains("checked"));
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn test_markdown_to_html_empty() {
        assert!(markdown_to_html("").is_empty());
    }

    #[test]
    fn anchors_added_to_headings() {
        let body = "<h1>Getting Started</h1>\n<h2>Intro: Setup</h2>";
        let anchored = add_heading_anchors(body);

        assert!(anchored.contains(r#"<h1 id="Getting_Started">Getting Started</h1>"#));
        assert!(anchored.contains(r#"<h2 id="Intro_Setup">Intro: Setup</h2>"#));
    }

    #[test]
    fn anchors_use_visible_text_for_marked_up_headings() {
        let body = "<h1>The <em>Real</em> Title</h1>";
        let anchored = add_heading_anchors(body);

        assert!(anchored.contains(r#"<h1 id="The_Real_Title">The <em>Real</em> Title</h1>"#));
    }

    #[test]
    fn resource_references_collects_src_values() {
        let body = r#"<img src="a.png" alt="a"><video src="clips/b.mp4"></video>"#;
        let refs = resource_references(body);

        assert_eq!(refs, vec!["a.png", "clips/b.mp4"]);
    }

    #[test]
    fn strip_tags_leaves_text() {
        assert_eq!(strip_tags("<em>hi</em> there"), "hi there");
        assert_eq!(strip_tags("plain"), "plain");
    }
}
