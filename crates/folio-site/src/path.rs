//! URL path helpers.
//!
//! Pages are keyed by normalized URL paths: `/` for the content root,
//! `/section/page` below it. No trailing slash, no empty, `.` or `..`
//! segments.

use std::path::{Component, Path};

/// Normalize a request path.
///
/// Collapses repeated slashes, drops `.` segments, resolves `..` without
/// climbing above the root, and strips any trailing slash.
///
/// # Examples
///
/// ```
/// use folio_site::normalize_path;
///
/// assert_eq!(normalize_path(""), "/");
/// assert_eq!(normalize_path("about//team/"), "/about/team");
/// assert_eq!(normalize_path("/a/./b/../c"), "/a/c");
/// assert_eq!(normalize_path("/../.."), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    join_segments(&segments)
}

/// Split a normalized path into its segments. The root has none.
#[must_use]
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// URL path of a content directory relative to the content root.
pub(crate) fn url_path(root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    join_segments(&segments)
}

/// Final segment of a URL path; the root's slug is `/`.
pub(crate) fn slug_of(url_path: &str) -> &str {
    match url_path.rsplit('/').next() {
        Some(last) if !last.is_empty() => last,
        _ => "/",
    }
}

fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    if segments.is_empty() {
        return "/".to_owned();
    }
    let mut path = String::new();
    for segment in segments {
        path.push('/');
        path.push_str(segment.as_ref());
    }
    path
}
