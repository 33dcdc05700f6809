//! Default values derived from the process environment.

use std::path::{Path, PathBuf};

use crate::config::{BUILD_ENV_MARKER, REPOSITORY_SUBDIR};

/// Returns the build tree root announced by the environment setup scripts,
/// or `None` when they have not been run.
pub fn build_top() -> Option<PathBuf> {
    std::env::var_os(BUILD_ENV_MARKER).map(PathBuf::from)
}

/// Returns the default location of the upstream checkout under `build_top`.
///
/// This can be overridden by the `--repository-root` CLI flag or the
/// `MERGE_UPSTREAM_ROOT` environment variable.
pub fn default_repository_root(build_top: &Path) -> PathBuf {
    build_top.join(REPOSITORY_SUBDIR)
}
