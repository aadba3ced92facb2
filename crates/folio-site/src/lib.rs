//! Content loading, page snapshots and navigation for Folio.
//!
//! This crate provides:
//! - [`Loader`] / [`load`]: turn a content directory tree into a [`PageStore`]
//! - [`Site`]: the currently published snapshot, with build-then-swap reloads
//! - [`Node`] / [`build_nav`]: per-request navigation trees
//! - [`Response`]: a page assembled for one language, with its menu
//! - [`FuzzyFile`]: the search index consumed by the frontend
//!
//! # Content Layout
//!
//! Every directory under the content root is a page:
//!
//! ```text
//! content/
//! ├── body.md            # default-language body
//! ├── body_en.md         # English body
//! ├── sidebar.md
//! ├── meta.toml          # title, title_en, image, message, sort, expanded, sensitive
//! └── about/
//!     └── body.md
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use folio_site::{Loader, Site};
//!
//! let site = Site::new("content", Loader::new(false));
//! site.reload()?;
//!
//! let response = site.respond("/about", "en")?;
//! println!("{}", response.title);
//! # Ok(())
//! # }
//! ```

mod fuzzy;
mod loader;
mod meta;
mod nav;
mod page;
mod parser;
mod path;
mod response;
mod scanner;
mod site;
mod store;

pub use fuzzy::{Fuzz, FuzzyFile};
pub use loader::{LoadError, Loader, load};
pub use meta::{META_FILENAME, Meta};
pub use nav::{NavEntry, Node, build_nav};
pub use page::{LangAnchorLookup, LangLookup, LocalizedPage, Page};
pub use path::{normalize_path, path_segments};
pub use response::{Response, ResponseError};
pub use scanner::Scanner;
pub use site::Site;
pub use store::PageStore;

pub use folio_anchor::Anchor;
