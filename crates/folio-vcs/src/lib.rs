//! Git-aware file timestamps for Folio.
//!
//! Page bodies report when they were last changed. That time comes from the
//! content repository's history rather than the filesystem, because a fresh
//! clone resets every mtime. [`TimestampProvider`] abstracts the lookup so the
//! loading pipeline can run against a fake in tests.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use gix::ThreadSafeRepository;
use gix::hash::ObjectId;
use gix::revision::walk::Sorting;
use gix::traverse::commit::simple::CommitTimeOrder;

/// Format used for page timestamps (`2006-01-02T15:04:05Z`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format a timestamp the way pages expose it.
#[must_use]
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Error returned when a history lookup fails.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// No repository contains the content root.
    #[error("Cannot open git repository at {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: Box<gix::discover::Error>,
    },
    /// The repository has no work tree.
    #[error("Repository at {} is bare", .0.display())]
    Bare(PathBuf),
    /// A path could not be resolved on disk.
    #[error("Cannot resolve {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file lies outside the repository's work tree.
    #[error("{} is outside the repository work tree", .0.display())]
    OutsideWorkTree(PathBuf),
    /// Reading objects or walking commits failed.
    #[error("Cannot read history of {}: {source}", .path.display())]
    History {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// No commit touches the file (e.g. untracked).
    #[error("No history for {}", .0.display())]
    NoHistory(PathBuf),
    /// The commit time is out of range.
    #[error("Invalid commit time {0}")]
    Time(i64),
}

fn history_error<E>(path: &Path, source: E) -> VcsError
where
    E: std::error::Error + Send + Sync + 'static,
{
    VcsError::History {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}

/// Source of last-modified times for content files.
pub trait TimestampProvider: Send + Sync {
    /// Time of the last change to `file`, which lives under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError`] if the history cannot be read. Callers decide on
    /// a fallback.
    fn last_modified(&self, root: &Path, file: &Path) -> Result<DateTime<Utc>, VcsError>;
}

/// Reads commit times from the repository containing the content root.
///
/// The repository is opened once and shared between threads; every lookup
/// works on its own thread-local handle.
pub struct GitTimestamps {
    repo: ThreadSafeRepository,
    workdir: PathBuf,
}

impl GitTimestamps {
    /// Open the repository that contains `root`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Open`] if no repository is found and
    /// [`VcsError::Bare`] if it has no work tree.
    pub fn discover(root: &Path) -> Result<Self, VcsError> {
        let repo = gix::discover(root).map_err(|e| VcsError::Open {
            path: root.to_path_buf(),
            source: Box::new(e),
        })?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| VcsError::Bare(repo.path().to_path_buf()))?;
        let workdir = canonicalize(workdir)?;

        tracing::debug!(workdir = %workdir.display(), "Opened content repository");
        Ok(Self {
            repo: repo.into_sync(),
            workdir,
        })
    }

    /// Work tree root of the opened repository.
    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Commit time of the newest commit that changed `relative`.
    fn last_change(&self, relative: &Path) -> Result<i64, VcsError> {
        let repo = self.repo.to_thread_local();
        let head = repo
            .head_id()
            .map_err(|e| history_error(relative, e))?
            .detach();
        let walk = repo
            .rev_walk([head])
            .sorting(Sorting::ByCommitTime(CommitTimeOrder::NewestFirst))
            .all()
            .map_err(|e| history_error(relative, e))?;

        for info in walk {
            let info = info.map_err(|e| history_error(relative, e))?;
            let commit = info.object().map_err(|e| history_error(relative, e))?;
            let current = entry_id(&commit, relative)?;

            // Same rule as `git log -- <path>`: a commit counts when the path
            // differs from every parent.
            let mut parents = 0;
            let mut touched = true;
            for parent_id in commit.parent_ids() {
                parents += 1;
                let parent = repo
                    .find_commit(parent_id.detach())
                    .map_err(|e| history_error(relative, e))?;
                if entry_id(&parent, relative)? == current {
                    touched = false;
                    break;
                }
            }
            if parents == 0 {
                touched = current.is_some();
            }

            if touched {
                let time = commit.time().map_err(|e| history_error(relative, e))?;
                return Ok(time.seconds);
            }
        }
        Err(VcsError::NoHistory(relative.to_path_buf()))
    }
}

/// Blob id of `relative` in a commit's tree, if present.
fn entry_id(commit: &gix::Commit<'_>, relative: &Path) -> Result<Option<ObjectId>, VcsError> {
    let tree = commit.tree().map_err(|e| history_error(relative, e))?;
    let entry = tree
        .lookup_entry_by_path(relative)
        .map_err(|e| history_error(relative, e))?;
    Ok(entry.map(|e| e.object_id()))
}

fn canonicalize(path: &Path) -> Result<PathBuf, VcsError> {
    std::fs::canonicalize(path).map_err(|source| VcsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl TimestampProvider for GitTimestamps {
    fn last_modified(&self, _root: &Path, file: &Path) -> Result<DateTime<Utc>, VcsError> {
        let file = canonicalize(file)?;
        let relative = file
            .strip_prefix(&self.workdir)
            .map_err(|_| VcsError::OutsideWorkTree(file.clone()))?;

        let seconds = self.last_change(relative)?;
        DateTime::from_timestamp(seconds, 0).ok_or(VcsError::Time(seconds))
    }
}

/// Provider that reports the same time for every file.
///
/// Useful for reproducible builds and tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedTimestamps(pub DateTime<Utc>);

impl TimestampProvider for FixedTimestamps {
    fn last_modified(&self, _root: &Path, _file: &Path) -> Result<DateTime<Utc>, VcsError> {
        Ok(self.0)
    }
}
