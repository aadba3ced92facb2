//! Directory metadata (`meta.toml`).
//!
//! ```toml
//! title = "Sektionen"
//! title_en = "The Chapter"
//! image = "/images/chapter.jpg"
//! message = "Under construction"
//! sort = 2
//! expanded = true
//! sensitive = false
//! ```

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;

use crate::loader::LoadError;
use crate::page::LangLookup;

/// Metadata filename looked up in every content directory.
pub const META_FILENAME: &str = "meta.toml";

/// Parsed directory metadata. A directory without `meta.toml` gets defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Meta {
    /// `title` under `""`, `title_<lang>` under `<lang>`.
    pub titles: LangLookup,
    pub image: String,
    pub message: String,
    pub sort: Option<i64>,
    pub expanded: bool,
    pub sensitive: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMeta {
    title: Option<String>,
    image: String,
    message: String,
    sort: Option<i64>,
    expanded: bool,
    sensitive: bool,
    #[serde(flatten)]
    extra: BTreeMap<String, toml::Value>,
}

impl Meta {
    /// Parse metadata from TOML source. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed TOML or mistyped known keys.
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        let raw: RawMeta = toml::from_str(source)?;

        let mut titles = LangLookup::new();
        if let Some(title) = raw.title {
            titles.insert(String::new(), title);
        }
        for (key, value) in raw.extra {
            let Some(lang) = key.strip_prefix("title_") else {
                continue;
            };
            if !is_lang_tag(lang) {
                continue;
            }
            if let toml::Value::String(title) = value {
                titles.insert(lang.to_owned(), title);
            }
        }

        Ok(Self {
            titles,
            image: raw.image,
            message: raw.message,
            sort: raw.sort,
            expanded: raw.expanded,
            sensitive: raw.sensitive,
        })
    }

    /// Load `meta.toml` from a content directory.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::FileSystem`] if the file exists but can't be read
    /// and [`LoadError::Config`] if it doesn't parse.
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        let path = dir.join(META_FILENAME);
        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(LoadError::FileSystem { path, source: e }),
        };
        Self::from_toml(&source).map_err(|e| LoadError::Config { path, source: e })
    }
}

/// Language tags are non-empty runs of ASCII word characters.
pub(crate) fn is_lang_tag(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_meta() {
        let meta = Meta::from_toml(
            r#"
title = "Sektionen"
title_en = "The Chapter"
image = "/img/chapter.jpg"
message = "Hello"
sort = 3
expanded = true
sensitive = true
"#,
        )
        .unwrap();

        assert_eq!(meta.titles.get(""), Some(&"Sektionen".to_owned()));
        assert_eq!(meta.titles.get("en"), Some(&"The Chapter".to_owned()));
        assert_eq!(meta.image, "/img/chapter.jpg");
        assert_eq!(meta.message, "Hello");
        assert_eq!(meta.sort, Some(3));
        assert!(meta.expanded);
        assert!(meta.sensitive);
    }

    #[test]
    fn test_empty_meta_defaults() {
        let meta = Meta::from_toml("").unwrap();
        assert_eq!(meta, Meta::default());
        assert!(meta.titles.is_empty());
        assert_eq!(meta.sort, None);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let meta = Meta::from_toml("title = \"A\"\nauthor = \"someone\"\ntitle_ = \"x\"\n").unwrap();
        assert_eq!(meta.titles.len(), 1);
    }

    #[test]
    fn test_non_string_title_lang_ignored() {
        let meta = Meta::from_toml("title_en = 5\n").unwrap();
        assert!(meta.titles.is_empty());
    }

    #[test]
    fn test_mistyped_known_key_fails() {
        assert!(Meta::from_toml("sort = \"first\"\n").is_err());
        assert!(Meta::from_toml("title = [1, 2]\n").is_err());
    }

    #[test]
    fn test_malformed_toml_fails() {
        assert!(Meta::from_toml("title = \"unterminated\n").is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert_eq!(Meta::load(temp_dir.path()).unwrap(), Meta::default());
    }

    #[test]
    fn test_load_malformed_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join(META_FILENAME), "title = ").unwrap();
        let err = Meta::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::Config { .. }));
    }

    #[test]
    fn test_is_lang_tag() {
        assert!(is_lang_tag("en"));
        assert!(is_lang_tag("en_GB"));
        assert!(!is_lang_tag(""));
        assert!(!is_lang_tag("en-GB"));
    }
}
