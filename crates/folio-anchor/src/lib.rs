//! Heading anchor extraction for Folio.
//!
//! Rendered page bodies carry `id` attributes on their headings. This crate
//! turns those headings into an ordered list of [`Anchor`]s that the frontend
//! uses to build an in-page table of contents.
//!
//! # Example
//!
//! ```
//! use folio_anchor::{Anchor, extract_anchors};
//!
//! let anchors = extract_anchors(r#"<h2 id="setup">Setup</h2><p>text</p>"#);
//! assert_eq!(anchors, vec![Anchor::new("setup", "Setup", 2)]);
//! ```

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use serde::{Deserialize, Serialize};

/// In-page link target built from a heading element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Value of the heading's `id` attribute.
    pub id: String,
    /// Heading text (see [`extract_anchors`] for how it is chosen).
    pub value: String,
    /// Heading level, 1 through 6.
    pub level: u8,
}

impl Anchor {
    /// Create an anchor.
    #[must_use]
    pub fn new(id: impl Into<String>, value: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            level,
        }
    }
}

/// Extract anchors from `<h1>`..`<h6>` elements in document order.
///
/// The input is parsed as an HTML document, so malformed markup is repaired
/// the way a browser would repair it. A heading becomes an anchor only when
/// both its `id` attribute and its text are non-empty.
///
/// The text of a heading is found by following the *first* child repeatedly
/// until a text node is reached. `<h1 id="a"><b>x</b> y</h1>` therefore yields
/// `"x"`, not `"x y"`. Existing content relies on this.
#[must_use]
pub fn extract_anchors(html: &str) -> Vec<Anchor> {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);

    let mut anchors = Vec::new();
    let mut stack: Vec<Handle> = vec![dom.document.clone()];

    while let Some(node) = stack.pop() {
        if let Some(anchor) = heading_anchor(&node) {
            anchors.push(anchor);
        }
        // Reverse so the first child is popped next (pre-order).
        stack.extend(node.children.borrow().iter().rev().cloned());
    }

    anchors
}

/// Build an anchor from a heading element, if it qualifies.
fn heading_anchor(node: &Handle) -> Option<Anchor> {
    let NodeData::Element { name, attrs, .. } = &node.data else {
        return None;
    };
    let level = heading_level(&name.local)?;

    let id = attrs
        .borrow()
        .iter()
        .find(|attr| &*attr.name.local == "id")
        .map(|attr| String::from(&*attr.value))
        .unwrap_or_default();
    let value = first_text(node);

    if id.is_empty() || value.is_empty() {
        return None;
    }

    Some(Anchor { id, value, level })
}

/// Map a tag name to its heading level.
fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Text reached by descending through first children only.
fn first_text(node: &Handle) -> String {
    let mut current = node.clone();
    loop {
        if let NodeData::Text { contents } = &current.data {
            let text: &str = &contents.borrow();
            return text.to_owned();
        }
        let next = current.children.borrow().first().cloned();
        match next {
            Some(child) => current = child,
            None => return String::new(),
        }
    }
}
