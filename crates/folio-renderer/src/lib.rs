//! Templated markdown rendering for Folio.
//!
//! Content files go through two stages:
//! 1. A [`minijinja`] template pass with a single boolean variable,
//!    `restricted`, so authors can hide passages in restricted mode.
//! 2. Markdown to HTML with [`pulldown_cmark`], tables and fenced code
//!    enabled, and an `id` generated for every heading.
//!
//! # Example
//!
//! ```
//! use folio_renderer::MarkdownRenderer;
//!
//! let renderer = MarkdownRenderer::new().with_restricted(true);
//! let html = renderer
//!     .render("# Welcome\n{% if not restricted %}Internal notes{% endif %}\n")
//!     .unwrap();
//! assert_eq!(html, "<h1 id=\"welcome\">Welcome</h1>\n");
//! ```

mod renderer;
mod util;

pub use renderer::{MarkdownRenderer, RenderError};
pub use util::sanitize_anchor_name;
