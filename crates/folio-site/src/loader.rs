//! Content tree loading.
//!
//! Loading runs in two phases: [`Scanner`] lists directories, then every
//! directory is parsed on the rayon pool. The result is a fresh
//! [`PageStore`]; nothing shared is touched, so a failed load leaves
//! whatever was published before intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use folio_renderer::{MarkdownRenderer, RenderError};
use folio_vcs::{GitTimestamps, TimestampProvider};
use rayon::prelude::*;

use crate::page::Page;
use crate::parser::DirParser;
use crate::path::url_path;
use crate::scanner::Scanner;
use crate::store::PageStore;

/// Error aborting a content load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A directory or file couldn't be listed or read.
    #[error("Cannot read {}: {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A template failed to parse or evaluate.
    #[error("Cannot render {}: {source}", .path.display())]
    Markup {
        path: PathBuf,
        #[source]
        source: RenderError,
    },
    /// A metadata file is malformed.
    #[error("Invalid metadata in {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl LoadError {
    /// File or directory the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::FileSystem { path, .. } | Self::Markup { path, .. } | Self::Config { path, .. } => {
                path
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Loads a content tree into a [`PageStore`].
pub struct Loader {
    restricted: bool,
    renderer: MarkdownRenderer,
    /// `None` reads commit times from the repository holding the root.
    timestamps: Option<Arc<dyn TimestampProvider>>,
}

impl Loader {
    /// Create a loader using git commit times.
    ///
    /// In restricted mode directories marked `sensitive` are left out and
    /// templates see `restricted = true`. The repository containing the
    /// content root is opened once per load; without one every body is
    /// stamped with the load time.
    #[must_use]
    pub fn new(restricted: bool) -> Self {
        Self {
            restricted,
            renderer: MarkdownRenderer::new().with_restricted(restricted),
            timestamps: None,
        }
    }

    /// Replace the timestamp source.
    #[must_use]
    pub fn with_timestamps(mut self, timestamps: Arc<dyn TimestampProvider>) -> Self {
        self.timestamps = Some(timestamps);
        self
    }

    #[must_use]
    pub fn restricted(&self) -> bool {
        self.restricted
    }

    /// Load every page under `root`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing directory in scan order. No
    /// partial store is returned.
    pub fn load(&self, root: &Path) -> Result<PageStore, LoadError> {
        let start = Instant::now();
        let dirs = Scanner::new(root).scan()?;

        let timestamps = self.timestamps.clone().or_else(|| git_timestamps(root));
        let parser = DirParser {
            root,
            restricted: self.restricted,
            renderer: &self.renderer,
            timestamps: timestamps.as_deref(),
        };
        // Collected in scan order so the reported error doesn't depend on
        // thread scheduling
        let results: Vec<Result<(String, Option<Page>), LoadError>> = dirs
            .par_iter()
            .map(|dir| parser.parse(dir).map(|page| (url_path(root, dir), page)))
            .collect();
        let parsed = results.into_iter().collect::<Result<Vec<_>, _>>()?;

        let pages: BTreeMap<String, Page> = parsed
            .into_iter()
            .filter_map(|(path, page)| page.map(|page| (path, page)))
            .collect();

        tracing::info!(
            root = %root.display(),
            restricted = self.restricted,
            dir_count = dirs.len(),
            page_count = pages.len(),
            elapsed_ms = elapsed_ms(start),
            "Content loaded"
        );
        Ok(PageStore::new(pages))
    }
}

fn git_timestamps(root: &Path) -> Option<Arc<dyn TimestampProvider>> {
    match GitTimestamps::discover(root) {
        Ok(git) => Some(Arc::new(git)),
        Err(e) => {
            tracing::debug!(
                root = %root.display(),
                error = %e,
                "No content repository, using load time for bodies"
            );
            None
        }
    }
}

/// Load `root` with git commit times.
///
/// # Errors
///
/// See [`Loader::load`].
pub fn load(restricted: bool, root: &Path) -> Result<PageStore, LoadError> {
    Loader::new(restricted).load(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use folio_vcs::FixedTimestamps;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn loader(restricted: bool) -> Loader {
        let time = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        Loader::new(restricted).with_timestamps(Arc::new(FixedTimestamps(time)))
    }

    fn write(root: &Path, file: &str, content: &str) {
        let path = root.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sample_tree() -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(root, "meta.toml", "title = \"Hem\"\ntitle_en = \"Home\"\n");
        write(root, "body.md", "# Hem\n");
        write(root, "body_en.md", "# Home\n");
        write(root, "sidebar.md", "");
        write(root, "sidebar_en.md", "");
        write(root, "om/meta.toml", "title = \"Om\"\nsort = 1\n");
        write(root, "om/body.md", "## Historia\n");
        write(root, "om/sidebar.md", "");
        write(root, "styrelse/meta.toml", "title = \"Styrelse\"\nsensitive = true\n");
        write(root, "styrelse/body.md", "Secret\n");
        write(root, "styrelse/protokoll/body.md", "Minutes\n");
        write(root, ".git/body.md", "# Hidden\n");
        temp_dir
    }

    #[test]
    fn test_load_tree() {
        let temp_dir = sample_tree();

        let store = loader(false).load(temp_dir.path()).unwrap();

        assert_eq!(
            store.paths().collect::<Vec<_>>(),
            vec!["/", "/om", "/styrelse", "/styrelse/protokoll"]
        );
        let home = store.get("/").unwrap();
        assert_eq!(home.slug, "/");
        assert_eq!(home.languages(), vec!["", "en"]);
        assert_eq!(home.updated_at["en"], "2020-01-02T03:04:05Z");

        let about = store.get("/om").unwrap();
        assert_eq!(about.slug, "om");
        assert_eq!(about.sort, Some(1));
        assert_eq!(about.anchors[""][0].id, "historia");
        assert_eq!(about.anchors[""][0].level, 2);
    }

    #[test]
    fn test_restricted_drops_sensitive_only() {
        let temp_dir = sample_tree();

        let store = loader(true).load(temp_dir.path()).unwrap();

        // Descendants of a sensitive directory are still loaded
        assert_eq!(
            store.paths().collect::<Vec<_>>(),
            vec!["/", "/om", "/styrelse/protokoll"]
        );
    }

    #[test]
    fn test_load_is_idempotent() {
        let temp_dir = sample_tree();
        let loader = loader(false);

        let first = loader.load(temp_dir.path()).unwrap();
        let second = loader.load(temp_dir.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_meta_fails_load() {
        let temp_dir = sample_tree();
        write(temp_dir.path(), "om/meta.toml", "title = ");

        let err = loader(false).load(temp_dir.path()).unwrap_err();

        assert!(matches!(err, LoadError::Config { .. }));
        assert_eq!(err.path(), temp_dir.path().join("om/meta.toml"));
    }

    #[test]
    fn test_template_error_fails_load() {
        let temp_dir = sample_tree();
        write(temp_dir.path(), "om/body.md", "{% endif %}\n");

        let err = loader(false).load(temp_dir.path()).unwrap_err();

        assert!(matches!(err, LoadError::Markup { .. }));
        assert_eq!(err.path(), temp_dir.path().join("om/body.md"));
    }

    #[test]
    fn test_missing_root_fails_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nope");

        let err = loader(false).load(&missing).unwrap_err();

        assert!(matches!(err, LoadError::FileSystem { .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_empty_root_yields_root_page() {
        let temp_dir = tempfile::tempdir().unwrap();

        let store = loader(false).load(temp_dir.path()).unwrap();

        assert_eq!(store.len(), 1);
        let root = store.get("/").unwrap();
        assert!(root.bodies.is_empty());
        assert!(root.languages().is_empty());
    }

    #[test]
    fn test_first_error_in_scan_order() {
        let temp_dir = sample_tree();
        write(temp_dir.path(), "aaa/meta.toml", "title = ");
        write(temp_dir.path(), "zzz/body.md", "{% endif %}\n");
        let loader = loader(false);

        for _ in 0..10 {
            let err = loader.load(temp_dir.path()).unwrap_err();
            assert_eq!(err.path(), temp_dir.path().join("aaa/meta.toml"));
        }
    }

    #[test]
    fn test_commit_times_from_repository() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(root, "body.md", "# Hem\n");
        write(root, "om/body.md", "# Om\n");
        let git = |args: &[&str]| {
            let status = std::process::Command::new("git")
                .current_dir(root)
                .args(["-c", "user.name=Folio", "-c", "user.email=folio@example.org"])
                .args(["-c", "commit.gpgsign=false"])
                .args(args)
                .env("GIT_AUTHOR_DATE", "1447024470 +0000")
                .env("GIT_COMMITTER_DATE", "1447024470 +0000")
                .status()
                .unwrap();
            assert!(status.success());
        };
        git(&["init", "-q"]);
        git(&["add", "-A"]);
        git(&["commit", "-q", "-m", "content"]);

        let store = Loader::new(false).load(root).unwrap();

        assert_eq!(store.get("/").unwrap().updated_at[""], "2015-11-08T23:14:30Z");
        assert_eq!(store.get("/om").unwrap().updated_at[""], "2015-11-08T23:14:30Z");
    }

    #[test]
    fn test_without_repository_uses_load_time() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "body.md", "# Hem\n");
        let before = folio_vcs::format_timestamp(Utc::now());

        let store = Loader::new(false).load(temp_dir.path()).unwrap();

        let updated = &store.get("/").unwrap().updated_at[""];
        assert!(updated.as_str() >= before.as_str());
    }
}
