//! Content directory discovery.
//!
//! Discovery only lists directories. Reading and rendering their files is
//! the parser's job, which lets the loader fan directories out in parallel.

use std::fs;
use std::path::{Path, PathBuf};

use crate::loader::LoadError;

/// Lists every content directory under a root.
#[derive(Clone, Debug)]
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    /// Create a scanner for `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory being scanned.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and return the root followed by every descendant
    /// directory, parents before children, siblings in name order.
    ///
    /// Directories whose name starts with `.` are skipped along with their
    /// subtrees. Symlinks are not followed.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::FileSystem`] if the root or any visited directory
    /// can't be listed.
    pub fn scan(&self) -> Result<Vec<PathBuf>, LoadError> {
        let mut dirs = Vec::new();
        let mut stack = vec![self.root.clone()];

        while let Some(dir) = stack.pop() {
            let mut children = subdirectories(&dir)?;
            children.sort();
            dirs.push(dir);
            stack.extend(children.into_iter().rev());
        }

        tracing::debug!(
            root = %self.root.display(),
            dir_count = dirs.len(),
            "Content scan completed"
        );
        Ok(dirs)
    }
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let fs_error = |source| LoadError::FileSystem {
        path: dir.to_path_buf(),
        source,
    };

    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(fs_error)? {
        let entry = entry.map_err(fs_error)?;
        // DirEntry::file_type doesn't traverse symlinks
        if !entry.file_type().map_err(fs_error)?.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        children.push(entry.path());
    }
    Ok(children)
}
