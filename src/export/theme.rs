//! CSS themes shipped as the site's shared stylesheet.

use std::path::Path;

use anyhow::{anyhow, Result};

/// Default light theme CSS.
pub const THEME_DEFAULT: &str = r#"
body {
    font-family: system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    line-height: 1.6;
    max-width: 800px;
    margin: 0 auto;
    padding: 2rem;
    color: #333;
}
h1.page-title { border-bottom: 1px solid #eee; padding-bottom: 0.5rem; }
h1, h2, h3, h4, h5, h6 { margin-top: 1.5em; margin-bottom: 0.5em; }
a { color: #0066cc; text-decoration: none; }
a:hover { text-decoration: underline; }
a.unresolved-link {
    color: #a33;
    text-decoration: underline dotted;
    cursor: help;
}
.page-icon { margin-right: 0.4rem; font-size: 0.8em; color: #888; }
pre {
    background: #f5f5f5;
    padding: 1rem;
    overflow-x: auto;
    border-radius: 4px;
}
code {
    font-family: 'SF Mono', Monaco, 'Cascadia Code', monospace;
    font-size: 0.9em;
}
:not(pre) > code {
    background: #f0f0f0;
    padding: 0.1rem 0.3rem;
    border-radius: 3px;
}
blockquote {
    border-left: 3px solid #ddd;
    margin-left: 0;
    padding-left: 1rem;
    color: #666;
}
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 0.5rem; text-align: left; }
th { background: #f5f5f5; }
img { max-width: 100%; height: auto; }
.canvas { display: flex; flex-wrap: wrap; gap: 1rem; }
.canvas-node {
    border: 1px solid #ddd;
    border-radius: 6px;
    padding: 0.75rem;
    max-width: 320px;
}
"#;

/// Dark theme CSS.
pub const THEME_DARK: &str = r#"
body {
    font-family: system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    line-height: 1.6;
    max-width: 800px;
    margin: 0 auto;
    padding: 2rem;
    background: #1a1a1a;
    color: #e0e0e0;
}
h1.page-title { border-bottom: 1px solid #333; padding-bottom: 0.5rem; }
h1, h2, h3, h4, h5, h6 { margin-top: 1.5em; margin-bottom: 0.5em; }
a { color: #6af; text-decoration: none; }
a:hover { text-decoration: underline; }
a.unresolved-link {
    color: #e77;
    text-decoration: underline dotted;
    cursor: help;
}
.page-icon { margin-right: 0.4rem; font-size: 0.8em; color: #888; }
pre {
    background: #2a2a2a;
    padding: 1rem;
    overflow-x: auto;
    border-radius: 4px;
}
code {
    font-family: 'SF Mono', Monaco, 'Cascadia Code', monospace;
    font-size: 0.9em;
}
:not(pre) > code {
    background: #333;
    padding: 0.1rem 0.3rem;
    border-radius: 3px;
}
blockquote {
    border-left: 3px solid #444;
    margin-left: 0;
    padding-left: 1rem;
    color: #aaa;
}
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #444; padding: 0.5rem; text-align: left; }
th { background: #2a2a2a; }
img { max-width: 100%; height: auto; }
.canvas { display: flex; flex-wrap: wrap; gap: 1rem; }
.canvas-node {
    border: 1px solid #444;
    border-radius: 6px;
    padding: 0.75rem;
    max-width: 320px;
}
"#;

/// Gets CSS for the specified theme.
///
/// # Arguments
///
/// * `theme` - Theme name ("default", "dark") or path to a custom CSS file.
///   If None, returns the default theme.
///
/// # Errors
///
/// Returns an error if the theme name is unknown or the CSS file cannot be
/// read.
pub fn get_theme_css(theme: Option<&str>) -> Result<String> {
    match theme {
        None | Some("default") => Ok(THEME_DEFAULT.to_string()),
        Some("dark") => Ok(THEME_DARK.to_string()),
        Some(path) => {
            let path = Path::new(path);
            if path.exists() {
                Ok(std::fs::read_to_string(path)?)
            } else {
                Err(anyhow!(
                    "Unknown theme: '{}'. Use 'default', 'dark', or a path to a CSS file.",
                    path.display()
                ))
            }
        }
    }
}
