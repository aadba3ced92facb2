//! Per-directory page parsing.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use folio_anchor::extract_anchors;
use folio_renderer::MarkdownRenderer;
use folio_vcs::{TimestampProvider, format_timestamp};

use crate::loader::LoadError;
use crate::meta::{Meta, is_lang_tag};
use crate::page::Page;
use crate::path::{slug_of, url_path};

/// Builds a [`Page`] from one content directory.
pub(crate) struct DirParser<'a> {
    pub root: &'a Path,
    pub restricted: bool,
    pub renderer: &'a MarkdownRenderer,
    /// `None` stamps every body with the current time.
    pub timestamps: Option<&'a dyn TimestampProvider>,
}

impl DirParser<'_> {
    /// Parse `dir` into a page.
    ///
    /// Returns `Ok(None)` for a sensitive directory in restricted mode. Its
    /// markdown is never read.
    pub fn parse(&self, dir: &Path) -> Result<Option<Page>, LoadError> {
        let meta = Meta::load(dir)?;
        if meta.sensitive && self.restricted {
            tracing::debug!(dir = %dir.display(), "Skipping sensitive directory");
            return Ok(None);
        }

        let path = url_path(self.root, dir);
        let mut page = Page {
            titles: meta.titles,
            slug: slug_of(&path).to_owned(),
            image: meta.image,
            message: meta.message,
            sort: meta.sort,
            expanded: meta.expanded,
            ..Page::default()
        };

        for (name, file) in files(dir)? {
            if let Some(lang) = content_lang(&name, "body") {
                let html = self.render_file(&file)?;
                page.updated_at.insert(lang.clone(), self.updated_at(&file));
                page.anchors.insert(lang.clone(), extract_anchors(&html));
                page.bodies.insert(lang, html);
            } else if let Some(lang) = content_lang(&name, "sidebar") {
                let html = self.render_file(&file)?;
                page.sidebars.insert(lang, html);
            }
        }

        Ok(Some(page))
    }

    fn render_file(&self, file: &Path) -> Result<String, LoadError> {
        let source = fs::read_to_string(file).map_err(|e| LoadError::FileSystem {
            path: file.to_path_buf(),
            source: e,
        })?;
        self.renderer
            .render(&source)
            .map_err(|e| LoadError::Markup {
                path: file.to_path_buf(),
                source: e,
            })
    }

    fn updated_at(&self, file: &Path) -> String {
        let Some(timestamps) = self.timestamps else {
            return format_timestamp(Utc::now());
        };
        let time = timestamps.last_modified(self.root, file).unwrap_or_else(|e| {
            tracing::debug!(
                file = %file.display(),
                error = %e,
                "No commit time, using current time"
            );
            Utc::now()
        });
        format_timestamp(time)
    }
}

/// Regular files of `dir`, sorted by name.
fn files(dir: &Path) -> Result<Vec<(String, PathBuf)>, LoadError> {
    let fs_error = |source| LoadError::FileSystem {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(fs_error)? {
        let entry = entry.map_err(fs_error)?;
        if entry.file_type().map_err(fs_error)?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        files.push((name, entry.path()));
    }
    files.sort();
    Ok(files)
}

/// Language of a `<stem>.md` or `<stem>_<lang>.md` filename.
fn content_lang(name: &str, stem: &str) -> Option<String> {
    let rest = name.strip_prefix(stem)?.strip_suffix(".md")?;
    if rest.is_empty() {
        return Some(String::new());
    }
    let lang = rest.strip_prefix('_')?;
    is_lang_tag(lang).then(|| lang.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use folio_vcs::FixedTimestamps;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_content_lang() {
        assert_eq!(content_lang("body.md", "body"), Some(String::new()));
        assert_eq!(content_lang("body_en.md", "body"), Some("en".to_owned()));
        assert_eq!(
            content_lang("sidebar_sv.md", "sidebar"),
            Some("sv".to_owned())
        );
        assert_eq!(content_lang("body_.md", "body"), None);
        assert_eq!(content_lang("body-en.md", "body"), None);
        assert_eq!(content_lang("body.markdown", "body"), None);
        assert_eq!(content_lang("nobody.md", "body"), None);
        assert_eq!(content_lang("sidebar.md", "body"), None);
    }

    fn parse(dir: &Path, restricted: bool) -> Result<Option<Page>, LoadError> {
        let renderer = MarkdownRenderer::new().with_restricted(restricted);
        let timestamps = FixedTimestamps(Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap());
        DirParser {
            root: dir,
            restricted,
            renderer: &renderer,
            timestamps: Some(&timestamps),
        }
        .parse(dir)
    }

    #[test]
    fn test_parse_languages() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("meta.toml"), "title = \"Hem\"\ntitle_en = \"Home\"\n").unwrap();
        fs::write(dir.join("body.md"), "# Välkommen\n").unwrap();
        fs::write(dir.join("body_en.md"), "# Welcome\n").unwrap();
        fs::write(dir.join("sidebar.md"), "Sidopanel\n").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let page = parse(dir, false).unwrap().unwrap();

        assert_eq!(page.slug, "/");
        assert_eq!(
            page.bodies.get("en").map(String::as_str),
            Some("<h1 id=\"welcome\">Welcome</h1>\n")
        );
        assert_eq!(page.anchors["en"].len(), 1);
        assert_eq!(page.anchors["en"][0].id, "welcome");
        assert_eq!(page.updated_at["en"], "2021-03-04T05:06:07Z");
        assert_eq!(page.updated_at[""], "2021-03-04T05:06:07Z");
        assert_eq!(page.sidebars.get("").map(String::as_str), Some("<p>Sidopanel</p>\n"));
        assert!(page.is_complete(""));
        assert!(!page.is_complete("en"));
    }

    #[test]
    fn test_parse_without_meta() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("body.md"), "text\n").unwrap();

        let page = parse(dir, false).unwrap().unwrap();

        assert!(page.titles.is_empty());
        assert_eq!(page.sort, None);
        assert!(!page.expanded);
        assert!(page.bodies.contains_key(""));
    }

    #[test]
    fn test_sensitive_skipped_only_when_restricted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("meta.toml"), "sensitive = true\n").unwrap();
        // Would fail to render if it were ever read
        fs::write(dir.join("body.md"), "{% if %}\n").unwrap();

        assert_eq!(parse(dir, true).unwrap(), None);
        assert!(matches!(parse(dir, false), Err(LoadError::Markup { .. })));
    }

    #[test]
    fn test_restricted_template() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        fs::write(
            dir.join("body.md"),
            "{% if restricted %}public{% else %}members{% endif %}\n",
        )
        .unwrap();

        let open = parse(dir, false).unwrap().unwrap();
        let restricted = parse(dir, true).unwrap().unwrap();

        assert_eq!(open.bodies[""], "<p>members</p>\n");
        assert_eq!(restricted.bodies[""], "<p>public</p>\n");
    }

    #[test]
    fn test_timestamp_fallback() {
        struct NoHistory;
        impl TimestampProvider for NoHistory {
            fn last_modified(
                &self,
                _root: &Path,
                file: &Path,
            ) -> Result<chrono::DateTime<Utc>, folio_vcs::VcsError> {
                Err(folio_vcs::VcsError::NoHistory(file.to_path_buf()))
            }
        }

        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("body.md"), "text\n").unwrap();
        let renderer = MarkdownRenderer::new();
        let before = format_timestamp(Utc::now());

        let page = DirParser {
            root: dir,
            restricted: false,
            renderer: &renderer,
            timestamps: Some(&NoHistory),
        }
        .parse(dir)
        .unwrap()
        .unwrap();

        let updated = &page.updated_at[""];
        assert_eq!(updated.len(), "2021-03-04T05:06:07Z".len());
        assert!(updated.ends_with('Z'));
        assert!(updated.as_str() >= before.as_str());
    }
}
