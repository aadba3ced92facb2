//! Immutable page collection.

use std::collections::BTreeMap;

use crate::nav::NavEntry;
use crate::page::Page;

/// Every loaded page keyed by normalized URL path.
///
/// A store is never modified after loading. Reloads build a new store and
/// swap it in (see [`crate::Site`]).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageStore {
    pages: BTreeMap<String, Page>,
}

impl PageStore {
    #[must_use]
    pub fn new(pages: BTreeMap<String, Page>) -> Self {
        Self { pages }
    }

    /// Look up a page by normalized path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Page> {
        self.pages.get(path)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.pages.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages in lexicographic path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Page)> {
        self.pages.iter().map(|(path, page)| (path.as_str(), page))
    }

    /// Paths in lexicographic order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// Navigation inputs for every page, in path order.
    #[must_use]
    pub fn nav_entries(&self) -> Vec<NavEntry<'_>> {
        self.iter()
            .map(|(path, page)| NavEntry {
                slug: path,
                titles: &page.titles,
                image: &page.image,
                sort: page.sort,
                expanded: page.expanded,
            })
            .collect()
    }
}
