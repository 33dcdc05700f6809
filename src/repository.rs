//! # Repository Client
//!
//! The orchestrator never runs git directly. It talks to a
//! [`RepositoryClient`], which exposes the handful of primitives a snapshot
//! needs (fetch, checkout, merge, status, rm, add, commit, log) against a
//! working directory.
//!
//! [`GitCli`] is the real implementation and delegates to the functions in
//! [`crate::git`]. Tests substitute a scripted in-memory client so the merge
//! state machine can be driven without touching a real repository.

use std::path::Path;

use crate::error::Result;
use crate::git::{LogEntry, StatusEntry};

/// Version-control primitives used by the merge orchestrator and the
/// snapshot driver. Every call is synchronous and scoped to `cwd`.
pub trait RepositoryClient {
    /// Fetch `url`, optionally into `refspec`.
    fn fetch(&self, cwd: &Path, url: &str, refspec: Option<&str>, force: bool) -> Result<()>;

    /// Create and check out `branch`, tracking `upstream`.
    fn checkout_tracking_branch(&self, cwd: &Path, branch: &str, upstream: &str) -> Result<()>;

    /// Whether `revision` carries history not yet in `HEAD`.
    fn has_new_commits(&self, cwd: &Path, revision: &str) -> Result<bool>;

    /// Start a merge of `revision` without committing it.
    ///
    /// Returns `false` when the merge stopped with conflicts; that is an
    /// expected outcome, not an error.
    fn merge_no_commit(&self, cwd: &Path, revision: &str) -> Result<bool>;

    /// Working tree and index status.
    fn status(&self, cwd: &Path) -> Result<Vec<StatusEntry>>;

    /// Remove paths from tracking, ignoring paths that do not match.
    fn rm(&self, cwd: &Path, paths: &[&str], recursive: bool) -> Result<()>;

    /// Stage paths. Fails when a pathspec matches nothing.
    fn add(&self, cwd: &Path, paths: &[&str], force: bool) -> Result<()>;

    /// Commit the index.
    fn commit(&self, cwd: &Path, message: &str) -> Result<()>;

    /// Commits reachable from `revision` whose message matches `pattern`,
    /// most recent first.
    fn log_grep(
        &self,
        cwd: &Path,
        revision: &str,
        pattern: &str,
        max_count: Option<usize>,
    ) -> Result<Vec<LogEntry>>;

    /// Contents of `path` at `revision`.
    fn show_file(&self, cwd: &Path, revision: &str, path: &str) -> Result<String>;

    /// Tracked files below `cwd`, relative to it.
    fn ls_files(&self, cwd: &Path) -> Result<Vec<String>>;

    /// Whether the index holds staged changes.
    fn has_staged_changes(&self, cwd: &Path) -> Result<bool> {
        Ok(self.status(cwd)?.iter().any(StatusEntry::is_staged))
    }
}

/// The default implementation of `RepositoryClient`, which uses the system's
/// `git` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl RepositoryClient for GitCli {
    fn fetch(&self, cwd: &Path, url: &str, refspec: Option<&str>, force: bool) -> Result<()> {
        crate::git::fetch(cwd, url, refspec, force)
    }

    fn checkout_tracking_branch(&self, cwd: &Path, branch: &str, upstream: &str) -> Result<()> {
        crate::git::checkout_tracking_branch(cwd, branch, upstream)
    }

    fn has_new_commits(&self, cwd: &Path, revision: &str) -> Result<bool> {
        crate::git::has_new_commits(cwd, revision)
    }

    fn merge_no_commit(&self, cwd: &Path, revision: &str) -> Result<bool> {
        crate::git::merge_no_commit(cwd, revision)
    }

    fn status(&self, cwd: &Path) -> Result<Vec<StatusEntry>> {
        crate::git::status(cwd)
    }

    fn rm(&self, cwd: &Path, paths: &[&str], recursive: bool) -> Result<()> {
        crate::git::rm(cwd, paths, recursive)
    }

    fn add(&self, cwd: &Path, paths: &[&str], force: bool) -> Result<()> {
        crate::git::add(cwd, paths, force)
    }

    fn commit(&self, cwd: &Path, message: &str) -> Result<()> {
        crate::git::commit(cwd, message)
    }

    fn log_grep(
        &self,
        cwd: &Path,
        revision: &str,
        pattern: &str,
        max_count: Option<usize>,
    ) -> Result<Vec<LogEntry>> {
        crate::git::log_grep(cwd, revision, pattern, max_count)
    }

    fn show_file(&self, cwd: &Path, revision: &str, path: &str) -> Result<String> {
        crate::git::show_file(cwd, revision, path)
    }

    fn ls_files(&self, cwd: &Path) -> Result<Vec<String>> {
        crate::git::ls_files(cwd)
    }
}
