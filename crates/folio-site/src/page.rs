//! Page model.

use std::collections::BTreeMap;

use folio_anchor::Anchor;
use serde::Serialize;

/// Per-language strings, keyed by language tag (`""` is the default language).
pub type LangLookup = BTreeMap<String, String>;

/// Per-language anchor lists.
pub type LangAnchorLookup = BTreeMap<String, Vec<Anchor>>;

/// One content directory, aggregated over all of its languages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Human-readable titles from metadata.
    pub titles: LangLookup,
    /// Final segment of the directory path (`/` for the content root).
    pub slug: String,
    /// Last change of each body file.
    pub updated_at: LangLookup,
    /// Path, URL or placeholder for the page image.
    pub image: String,
    /// Message shown at the top of the page.
    pub message: String,
    /// Rendered bodies.
    pub bodies: LangLookup,
    /// Rendered sidebars.
    pub sidebars: LangLookup,
    /// Position among siblings. `None` sorts after every page that has one.
    pub sort: Option<i64>,
    /// Always show this page's children in navigation.
    pub expanded: bool,
    /// Heading anchors of each body.
    pub anchors: LangAnchorLookup,
}

/// A page resolved for a single language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LocalizedPage<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub updated_at: &'a str,
    pub image: &'a str,
    pub message: &'a str,
    pub body: &'a str,
    pub sidebar: &'a str,
    pub anchors: &'a [Anchor],
}

impl Page {
    /// Whether every per-language field is present for `lang`.
    #[must_use]
    pub fn is_complete(&self, lang: &str) -> bool {
        self.titles.contains_key(lang)
            && self.bodies.contains_key(lang)
            && self.sidebars.contains_key(lang)
            && self.updated_at.contains_key(lang)
            && self.anchors.contains_key(lang)
    }

    /// Languages this page can be served in, in sorted order.
    #[must_use]
    pub fn languages(&self) -> Vec<&str> {
        self.titles
            .keys()
            .map(String::as_str)
            .filter(|lang| self.is_complete(lang))
            .collect()
    }

    /// Title for menus and indexes: `lang`, then the default language, then
    /// whichever title comes first.
    #[must_use]
    pub fn display_title(&self, lang: &str) -> &str {
        display_title(&self.titles, lang)
    }

    /// Resolve the page for one language. `None` unless the page is complete
    /// for `lang`.
    #[must_use]
    pub fn localize(&self, lang: &str) -> Option<LocalizedPage<'_>> {
        Some(LocalizedPage {
            title: self.titles.get(lang)?,
            slug: &self.slug,
            updated_at: self.updated_at.get(lang)?,
            image: &self.image,
            message: &self.message,
            body: self.bodies.get(lang)?,
            sidebar: self.sidebars.get(lang)?,
            anchors: self.anchors.get(lang)?,
        })
    }
}

pub(crate) fn display_title<'a>(titles: &'a LangLookup, lang: &str) -> &'a str {
    titles
        .get(lang)
        .or_else(|| titles.get(""))
        .or_else(|| titles.values().next())
        .map_or("", String::as_str)
}
