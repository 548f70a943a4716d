//! Source document fixtures.

/// A source document fixture with optional frontmatter fields.
pub struct TestDocument {
    path: String,
    fields: Vec<(String, String)>,
    body: String,
}

impl TestDocument {
    /// Creates a fixture at the given vault-relative path with a default
    /// body.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            fields: Vec::new(),
            body: "Some body text.".to_string(),
        }
    }

    /// Sets the frontmatter title.
    pub fn with_title(self, title: &str) -> Self {
        self.with_field("title", title)
    }

    /// Adds a frontmatter field.
    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    /// Sets the markdown body.
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    /// Returns the vault-relative path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Renders the document file content.
    pub fn content(&self) -> String {
        if self.fields.is_empty() {
            return self.body.clone();
        }

        let mut out = String::from("---\n");
        for (key, value) in &self.fields {
            out.push_str(&format!("{key}: {value}\n"));
        }
        out.push_str("---\n");
        out.push_str(&self.body);
        out
    }
}
