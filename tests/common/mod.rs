//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let upstream = GitRepo::init(temp.path().join("upstream"), "git-svn");
//! let sha1 = upstream.commit_file("a.txt", "hello", "Add a.txt");
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git, BuildTop, GitRepo};
}

/// Run git in `dir`, panicking with its stderr on failure.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {} failed in {}: {}",
        args.join(" "),
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A throwaway repository on disk.
#[allow(dead_code)]
pub struct GitRepo {
    pub path: PathBuf,
}

#[allow(dead_code)]
impl GitRepo {
    /// Create a repository whose first branch is `branch`.
    pub fn init(path: impl Into<PathBuf>, branch: &str) -> Self {
        let path = path.into();
        std::fs::create_dir_all(&path).expect("Failed to create repository directory");
        git(&path, &["init", "-q"]);
        git(&path, &["symbolic-ref", "HEAD", &format!("refs/heads/{}", branch)]);
        let repo = Self { path };
        repo.configure_identity();
        repo
    }

    /// Clone `source` with `origin` as the remote name and `branch` checked out.
    pub fn clone_from(
        source: &GitRepo,
        path: impl Into<PathBuf>,
        origin: &str,
        branch: &str,
    ) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create clone parent");
        }
        let source = source.path.display().to_string();
        let target = path.display().to_string();
        git(
            Path::new("."),
            &["clone", "-q", "-o", origin, "-b", branch, &source, &target],
        );
        let repo = Self { path };
        repo.configure_identity();
        repo
    }

    fn configure_identity(&self) {
        git(&self.path, &["config", "user.name", "Test"]);
        git(&self.path, &["config", "user.email", "test@example.com"]);
        git(&self.path, &["config", "commit.gpgsign", "false"]);
    }

    /// Write a file, commit it and return the new HEAD.
    pub fn commit_file(&self, file: &str, content: &str, message: &str) -> String {
        let child = assert_fs::fixture::ChildPath::new(self.path.join(file));
        if let Some(parent) = child.path().parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        child.write_str(content).expect("Failed to write file");
        git(&self.path, &["add", "-f", file]);
        git(&self.path, &["commit", "-q", "-m", message]);
        self.head()
    }

    pub fn head(&self) -> String {
        git(&self.path, &["rev-parse", "HEAD"])
    }

    /// Check out `branch`, creating it at HEAD first when `create` is set.
    pub fn switch(&self, branch: &str, create: bool) {
        if create {
            git(&self.path, &["checkout", "-q", "-b", branch]);
        } else {
            git(&self.path, &["checkout", "-q", branch]);
        }
    }

    /// Delete a file and commit the removal.
    pub fn remove_file(&self, file: &str, message: &str) -> String {
        git(&self.path, &["rm", "-q", file]);
        git(&self.path, &["commit", "-q", "-m", message]);
        self.head()
    }

    pub fn tracked_files(&self) -> Vec<String> {
        git(&self.path, &["ls-files"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Commit subjects on HEAD, most recent first.
    pub fn subjects(&self) -> Vec<String> {
        git(&self.path, &["log", "--format=%s"])
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// A fake `ANDROID_BUILD_TOP` with the checkout at its usual location.
#[allow(dead_code)]
pub struct BuildTop {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl BuildTop {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Where the downstream checkout lives.
    pub fn repository_root(&self) -> PathBuf {
        self.path().join("external/chromium_org")
    }

    /// Scratch space for upstream and remote repositories.
    pub fn scratch(&self, name: &str) -> PathBuf {
        self.path().join("scratch").join(name)
    }

    /// A command for the binary with the environment marker set.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("merge-upstream");
        cmd.env("ANDROID_BUILD_TOP", self.path())
            .env_remove("MERGE_UPSTREAM_ROOT")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for BuildTop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_top_layout() {
        let top = BuildTop::new();
        assert!(top.repository_root().ends_with("external/chromium_org"));
        assert!(top.scratch("up").starts_with(top.path()));
    }
}
