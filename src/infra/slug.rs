//! Heading anchor slugs for exported pages.

/// Converts heading text to its anchor slug.
///
/// - Trims surrounding whitespace
/// - Removes colons
/// - Replaces remaining whitespace with underscores
///
/// Case is preserved so anchors match the visible heading text.
///
/// # Examples
///
/// ```
/// use warren::infra::heading_slug;
///
/// assert_eq!(heading_slug("Intro: Setup"), "Intro_Setup");
/// assert_eq!(heading_slug("Section One"), "Section_One");
/// ```
pub fn heading_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c == ':' {
            continue;
        }
        if c.is_whitespace() {
            slug.push('_');
        } else {
            slug.push(c);
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_slug_replaces_spaces_with_underscores() {
        assert_eq!(heading_slug("Section One"), "Section_One");
        assert_eq!(heading_slug("a b c"), "a_b_c");
    }

    #[test]
    fn heading_slug_removes_colons() {
        assert_eq!(heading_slug("Intro: Setup"), "Intro_Setup");
        assert_eq!(heading_slug("A:B"), "AB");
    }

    #[test]
    fn heading_slug_preserves_case() {
        assert_eq!(heading_slug("Getting Started"), "Getting_Started");
    }

    #[test]
    fn heading_slug_trims_surrounding_whitespace() {
        assert_eq!(heading_slug("  Padded  Heading "), "Padded_Heading");
    }

    #[test]
    fn heading_slug_empty_input() {
        assert_eq!(heading_slug(""), "");
        assert_eq!(heading_slug("   "), "");
    }

    #[test]
    fn heading_slug_keeps_punctuation_other_than_colons() {
        assert_eq!(heading_slug("FAQ (v2)"), "FAQ_(v2)");
        assert_eq!(heading_slug("Why? Because"), "Why?_Because");
    }
}
