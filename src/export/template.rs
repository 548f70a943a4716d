//! HTML shell rendering for exported pages.

use std::path::Path;

use anyhow::Result;
use minijinja::{context, Environment};

use crate::domain::Page;

/// Default HTML shell wrapped around every page body.
pub const DEFAULT_PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{{ title }}</title>
    {% if canonical_url %}<link rel="canonical" href="{{ canonical_url }}">
    {% endif %}{% if description %}<meta name="description" content="{{ description }}">
    {% endif %}<meta name="doc-icon" content="{{ icon }}">
    <link rel="stylesheet" href="{{ root_path }}style.css">
</head>
<body>
    <article>
        <header>
            <h1 class="page-title"><span class="page-icon" aria-hidden="true">{{ icon }}</span>{{ title }}</h1>
        </header>
        <main>{{ content }}</main>
    </article>
</body>
</html>"##;

/// Options for shell rendering.
#[derive(Default)]
pub struct ShellOptions<'a> {
    /// Path to a custom template file.
    pub template_path: Option<&'a Path>,
}

/// Renders a page into a complete HTML document.
///
/// The page body is inserted as-is; link remapping already happened in the
/// page builder. The stylesheet link climbs back to the destination root
/// with one `../` per directory level of the page's target path.
pub fn render_page_html(page: &Page, options: &ShellOptions) -> Result<String> {
    let template_str = match options.template_path {
        Some(p) => std::fs::read_to_string(p)?,
        None => DEFAULT_PAGE_TEMPLATE.to_string(),
    };

    let mut env = Environment::new();
    env.add_template("page", &template_str)?;
    let tmpl = env.get_template("page")?;

    let html = tmpl.render(context! {
        title => page.title(),
        icon => page.icon(),
        canonical_url => page.head().canonical_url.as_deref(),
        description => page.head().description.as_deref(),
        content => page.body(),
        root_path => root_prefix(page.target_path()),
    })?;

    Ok(html)
}

/// Returns `../` repeated once per directory level of a target path.
fn root_prefix(target_path: &str) -> String {
    "../".repeat(target_path.matches('/').count())
}
