//! Search index for the frontend's fuzzy finder.

use serde::Serialize;

use crate::page::display_title;
use crate::store::PageStore;

/// One searchable page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Fuzz {
    /// Page title.
    pub name: String,
    /// Page slug.
    pub str: String,
    /// Absolute link to the page.
    pub href: String,
}

/// Search index document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FuzzyFile {
    #[serde(rename = "@type")]
    pub kind: String,
    pub fuzzes: Vec<Fuzz>,
}

impl FuzzyFile {
    /// Index every page of `store`, in path order, linking under `base_url`.
    #[must_use]
    pub fn from_store(store: &PageStore, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let fuzzes = store
            .iter()
            .map(|(path, page)| Fuzz {
                name: display_title(&page.titles, "").to_owned(),
                str: page.slug.clone(),
                href: format!("{base_url}{path}"),
            })
            .collect();

        Self {
            kind: "fuzzyfile".to_owned(),
            fuzzes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn page(slug: &str, titles: &[(&str, &str)]) -> Page {
        Page {
            slug: slug.to_owned(),
            titles: titles
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            ..Page::default()
        }
    }

    #[test]
    fn test_from_store() {
        let mut pages = BTreeMap::new();
        pages.insert("/om".to_owned(), page("om", &[("en", "About"), ("", "Om")]));
        pages.insert("/".to_owned(), page("/", &[("en", "Home")]));
        pages.insert("/tom".to_owned(), page("tom", &[]));
        let store = PageStore::new(pages);

        let file = FuzzyFile::from_store(&store, "https://example.org/");

        assert_eq!(
            serde_json::to_value(&file).unwrap(),
            json!({
                "@type": "fuzzyfile",
                "fuzzes": [
                    {"name": "Home", "str": "/", "href": "https://example.org/"},
                    {"name": "Om", "str": "om", "href": "https://example.org/om"},
                    {"name": "", "str": "tom", "href": "https://example.org/tom"},
                ]
            })
        );
    }

    #[test]
    fn test_empty_store() {
        let file = FuzzyFile::from_store(&PageStore::default(), "http://localhost");
        assert_eq!(file.kind, "fuzzyfile");
        assert!(file.fuzzes.is_empty());
    }
}
