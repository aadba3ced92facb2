//! Published content snapshot.
//!
//! # Thread Safety
//!
//! `Site` is designed for concurrent access:
//! - `snapshot()` returns `Arc<PageStore>` with minimal locking (just an Arc clone)
//! - `reload()` is serialized by a mutex and builds the new store without
//!   holding the snapshot lock, so readers are never blocked by a load
//! - A failed reload leaves the previous snapshot published
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use folio_config::Config;
//! use folio_site::Site;
//!
//! let config = Config::load(None)?;
//! let site = Arc::new(Site::from_config(&config));
//! site.reload()?;
//!
//! let menu = site.navigation("/", "en");
//! println!("{} pages in menu", menu.num());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use folio_config::Config;

use crate::fuzzy::FuzzyFile;
use crate::loader::{LoadError, Loader};
use crate::nav::{Node, build_nav};
use crate::path::normalize_path;
use crate::response::{Response, ResponseError};
use crate::store::PageStore;

/// The current page snapshot of one content root.
pub struct Site {
    root: PathBuf,
    base_url: String,
    loader: Loader,
    /// Serializes reloads.
    reload_lock: Mutex<()>,
    current: RwLock<Arc<PageStore>>,
    generation: AtomicU64,
}

impl Site {
    /// Create a site with an empty snapshot. Call [`Site::reload`] to load
    /// content.
    pub fn new(root: impl Into<PathBuf>, loader: Loader) -> Self {
        Self {
            root: root.into(),
            base_url: folio_config::SiteConfig::default().base_url,
            loader,
            reload_lock: Mutex::new(()),
            current: RwLock::new(Arc::new(PageStore::default())),
            generation: AtomicU64::new(0),
        }
    }

    /// Create a site from resolved configuration, using git commit times.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.content_resolved.root.clone(),
            Loader::new(config.content_resolved.restricted),
        )
        .with_base_url(config.site.base_url.clone())
    }

    /// Set the base URL used for search index links.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current snapshot. Holding it doesn't block reloads.
    #[must_use]
    pub fn snapshot(&self) -> Arc<PageStore> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful reloads so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Load the content root and publish the result.
    ///
    /// # Errors
    ///
    /// Returns the [`LoadError`] that aborted loading. The previous snapshot
    /// stays published.
    pub fn reload(&self) -> Result<Arc<PageStore>, LoadError> {
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let store = match self.loader.load(&self.root) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::warn!(
                    root = %self.root.display(),
                    error = %e,
                    "Reload failed, keeping previous snapshot"
                );
                return Err(e);
            }
        };

        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::clone(&store);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        tracing::info!(generation, page_count = store.len(), "Snapshot published");
        Ok(store)
    }

    /// Sorted navigation menu for `path` with titles in `lang`.
    #[must_use]
    pub fn navigation(&self, path: &str, lang: &str) -> Node {
        let store = self.snapshot();
        let mut nav = build_nav(&store.nav_entries(), &normalize_path(path), lang);
        nav.sort_children();
        nav
    }

    /// Assemble the page at `path` in `lang` from the current snapshot.
    ///
    /// # Errors
    ///
    /// See [`Response::assemble`].
    pub fn respond(&self, path: &str, lang: &str) -> Result<Response, ResponseError> {
        Response::assemble(&self.snapshot(), path, lang)
    }

    /// Search index of the current snapshot.
    #[must_use]
    pub fn fuzzy_index(&self) -> FuzzyFile {
        FuzzyFile::from_store(&self.snapshot(), &self.base_url)
    }
}
