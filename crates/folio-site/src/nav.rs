//! Navigation tree.
//!
//! A menu is rebuilt for every request from the current snapshot. Only the
//! part relevant to the requested page is materialized: every ancestor of
//! the page with all of its siblings, the page's own children, and the
//! children of pages marked `expanded`.

use std::collections::HashSet;

use serde::Serialize;

use crate::page::{LangLookup, display_title};
use crate::path::path_segments;

/// Navigation input for one page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavEntry<'a> {
    /// Full URL path of the page.
    pub slug: &'a str,
    pub titles: &'a LangLookup,
    pub image: &'a str,
    pub sort: Option<i64>,
    pub expanded: bool,
}

/// Navigation tree vertex.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Node {
    #[serde(skip)]
    segment: String,
    /// Full URL path.
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
    /// This is the requested page.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub active: bool,
    /// Children are shown regardless of the requested page.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub expanded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
    #[serde(rename = "nav", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node for one path segment.
    pub fn new(segment: impl Into<String>, slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            slug: slug.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Empty tree root at `/`.
    #[must_use]
    pub fn root() -> Self {
        Self::new("", "/", "")
    }

    /// Path segment this node was inserted under (empty for the root).
    #[must_use]
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// Direct child for a path segment.
    #[must_use]
    pub fn child(&self, segment: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.segment == segment)
    }

    /// Insert a page below this node.
    ///
    /// `chain` holds the segments of the requested page still to be matched
    /// and `paths` the segments of the inserted page. A new child is created
    /// for every missing segment. An existing child is descended into only
    /// while it lies on the chain or is expanded. Leaving the chain through
    /// an expanded child drops the rest of it, so nothing below can turn
    /// active. A single remaining segment that matches an existing off-chain
    /// child re-populates that child.
    ///
    /// Pages must be inserted parents first.
    #[allow(clippy::too_many_arguments)]
    pub fn add_node(
        &mut self,
        chain: &[&str],
        slug: &str,
        title: &str,
        image: &str,
        paths: &[&str],
        active: bool,
        expanded: bool,
        sort: Option<i64>,
    ) {
        let mut node = self;
        let mut chain = chain;
        let mut paths = paths;
        let mut active = active;
        let mut expanded = expanded;

        while let Some((&parent, rest)) = paths.split_first() {
            if let Some(idx) = node.children.iter().position(|c| c.segment == parent) {
                let child_expanded = node.children[idx].expanded;
                match chain.split_first() {
                    Some((&head, chain_rest)) if head == parent => chain = chain_rest,
                    // Below the requested page, or off its chain for good
                    _ if child_expanded => chain = &[],
                    Some(_) if rest.is_empty() => {}
                    _ => return,
                }
                active = false;
                paths = rest;
                node = &mut node.children[idx];
            } else {
                let on_chain = chain.first() == Some(&parent);
                active = on_chain && chain.len() == 1;
                expanded = expanded || (on_chain && chain.len() > 1);
                node.children.push(Node::new(parent, slug, title));
                paths = rest;
                let last = node.children.len() - 1;
                node = &mut node.children[last];
            }
        }

        node.title = title.to_owned();
        node.slug = slug.to_owned();
        node.sort = sort;
        node.image = image.to_owned();
        node.expanded = expanded;
        node.active = active;
    }

    /// Number of nodes in this tree, including itself.
    #[must_use]
    pub fn num(&self) -> usize {
        1 + self.children.iter().map(Node::num).sum::<usize>()
    }

    /// Order children by `sort` at every level. Pages without a sort value
    /// go last. Ties keep insertion order.
    pub fn sort_children(&mut self) {
        self.children.sort_by_key(|c| (c.sort.is_none(), c.sort));
        for child in &mut self.children {
            child.sort_children();
        }
    }
}

/// Build the menu for `requested` (a normalized path) with titles in `lang`.
///
/// Pages whose parent is not in `entries` (e.g. below a sensitive directory
/// left out in restricted mode) are not linked from the menu. Children keep
/// insertion order; call [`Node::sort_children`] for display order.
#[must_use]
pub fn build_nav(entries: &[NavEntry<'_>], requested: &str, lang: &str) -> Node {
    let chain = path_segments(requested);

    let mut ordered: Vec<&NavEntry<'_>> = entries.iter().collect();
    ordered.sort_by_key(|e| e.slug);

    let mut inserted: HashSet<&str> = HashSet::from(["/"]);
    let mut root = Node::root();
    for entry in ordered {
        if let Some(parent) = parent_path(entry.slug)
            && !inserted.contains(parent)
        {
            tracing::trace!(slug = entry.slug, "Parent not in menu, skipping");
            continue;
        }
        inserted.insert(entry.slug);
        root.add_node(
            &chain,
            entry.slug,
            display_title(entry.titles, lang),
            entry.image,
            &path_segments(entry.slug),
            entry.slug == requested,
            entry.expanded,
            entry.sort,
        );
    }
    root
}

/// URL path of the parent page, `None` for the root.
fn parent_path(slug: &str) -> Option<&str> {
    match slug.rsplit_once('/')? {
        (_, "") => None,
        ("", _) => Some("/"),
        (parent, _) => Some(parent),
    }
}
