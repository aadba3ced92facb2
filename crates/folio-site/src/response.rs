//! Page responses.

use folio_anchor::Anchor;
use serde::Serialize;

use crate::nav::{Node, build_nav};
use crate::path::normalize_path;
use crate::store::PageStore;

/// Error resolving a request against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// No page at this path.
    #[error("Page not found: {0}")]
    NotFound(String),
    /// The page exists but is missing a field in this language.
    #[error("Page {path} is not available in language {lang:?}")]
    LanguageUnavailable { path: String, lang: String },
}

/// A page resolved for one language, with its navigation menu.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Response {
    pub title: String,
    pub slug: String,
    pub updated_at: String,
    pub image: String,
    pub message: String,
    pub body: String,
    pub sidebar: String,
    pub anchors: Vec<Anchor>,
    /// Menu, omitted when it would only contain the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav: Option<Node>,
}

impl Response {
    /// Assemble the response for `path` in `lang`.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::NotFound`] for unknown paths and
    /// [`ResponseError::LanguageUnavailable`] unless the page is complete in
    /// `lang`.
    pub fn assemble(store: &PageStore, path: &str, lang: &str) -> Result<Self, ResponseError> {
        let path = normalize_path(path);
        let page = store
            .get(&path)
            .ok_or_else(|| ResponseError::NotFound(path.clone()))?;
        let Some(localized) = page.localize(lang) else {
            return Err(ResponseError::LanguageUnavailable {
                path,
                lang: lang.to_owned(),
            });
        };

        let mut nav = build_nav(&store.nav_entries(), &path, lang);
        nav.sort_children();

        Ok(Self {
            title: localized.title.to_owned(),
            slug: localized.slug.to_owned(),
            updated_at: localized.updated_at.to_owned(),
            image: localized.image.to_owned(),
            message: localized.message.to_owned(),
            body: localized.body.to_owned(),
            sidebar: localized.sidebar.to_owned(),
            anchors: localized.anchors.to_vec(),
            nav: (nav.num() > 1).then_some(nav),
        })
    }
}
