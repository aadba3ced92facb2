//! Heading id helpers.

use std::collections::HashSet;

/// Convert heading text to an anchor name.
///
/// Letters and digits are kept (lowercased); every run of other characters
/// becomes a single dash between words. Leading and trailing separators are
/// dropped.
///
/// # Examples
///
/// ```
/// use folio_renderer::sanitize_anchor_name;
///
/// assert_eq!(sanitize_anchor_name("Id test"), "id-test");
/// assert_eq!(sanitize_anchor_name("  What's new?  "), "what-s-new");
/// ```
#[must_use]
pub fn sanitize_anchor_name(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !result.is_empty() {
                result.push('-');
            }
            pending_dash = false;
            result.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    result
}

/// Tracks generated heading ids within one document.
#[derive(Debug, Default)]
pub(crate) struct HeadingIds {
    used: HashSet<String>,
}

impl HeadingIds {
    /// Generate a unique id for heading text.
    ///
    /// Repeated headings get `-1`, `-2`, ... suffixes. Returns `None` when the
    /// text has no letters or digits.
    pub(crate) fn generate(&mut self, text: &str) -> Option<String> {
        let base = sanitize_anchor_name(text);
        if base.is_empty() {
            return None;
        }

        let mut id = base.clone();
        let mut n = 0;
        while self.used.contains(&id) {
            n += 1;
            id = format!("{base}-{n}");
        }
        self.used.insert(id.clone());
        Some(id)
    }
}
