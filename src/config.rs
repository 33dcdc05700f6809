//! # Snapshot Configuration
//!
//! Fixed values that define what a snapshot merges and how the generated
//! commits are labelled, plus the `SnapshotConfig` assembled from the command
//! line for a single run.
//!
//! The project list is intentionally static: it names the third-party
//! repositories needed to build the downstream product, not every repository
//! the upstream manifest mentions.

use std::path::PathBuf;

/// Provenance marker appended to every commit message this tool generates.
pub const AUTOGEN_MESSAGE: &str = "This commit was generated by merge-upstream.";

/// Upstream repository merged when `--git_url` is not given.
pub const DEFAULT_GIT_URL: &str = "http://git.chromium.org/chromium/src.git";

/// Upstream branch merged when `--git_branch` is not given.
pub const DEFAULT_GIT_BRANCH: &str = "git-svn";

/// Environment variable set by the downstream environment setup scripts.
pub const BUILD_ENV_MARKER: &str = "ANDROID_BUILD_TOP";

/// Location of the upstream checkout relative to `BUILD_ENV_MARKER`.
pub const REPOSITORY_SUBDIR: &str = "external/chromium_org";

/// Local branch each merge is performed on.
pub const MERGE_BRANCH: &str = "merge-from-chromium";

/// Remote-tracking branch the merge branch is based on.
pub const TRACKING_BRANCH: &str = "goog/master-chromium";

/// Local ref the upstream branch is fetched into.
pub const CACHED_UPSTREAM_REF: &str = "cached_upstream";

/// Dependency manifest path inside the upstream tree.
pub const DEPS_FILE: &str = ".DEPS.git";

/// Prefix the manifest puts in front of every project path.
pub const DEPS_PATH_PREFIX: &str = "src";

/// Exclusion list inside the merged tree, read after the root merge.
pub const EXCLUSIONS_FILE: &str = "android_webview/tools/known_incompatible.yaml";

/// License scanning script inside the merged tree.
pub const LICENSE_SCRIPT: &str = "android_webview/tools/webview_licenses.py";

/// Notice file written at the repository root.
pub const NOTICE_FILE: &str = "NOTICE";

/// Generated build files, removed before and re-added after regeneration.
pub const GENERATED_BUILD_FILES: &[&str] = &["GypAndroid.mk", "*.target.mk", "*.host.mk", "*.tmp"];

/// Projects that need to be merged to build the downstream product.
pub const THIRD_PARTY_PROJECTS: &[&str] = &[
    "googleurl",
    "sdch/open-vcdiff",
    "testing/gmock",
    "testing/gtest",
    "third_party/WebKit",
    "third_party/angle",
    "third_party/cacheinvalidation/files/src/google",
    "third_party/freetype",
    "third_party/hunspell",
    "third_party/hunspell_dictionaries",
    "third_party/icu",
    "third_party/leveldatabase/src",
    "third_party/libjingle/source",
    "third_party/libphonenumber/src/phonenumbers",
    "third_party/libphonenumber/src/resources",
    "third_party/libphonenumber/src/test",
    "third_party/openssl",
    "third_party/ots",
    "third_party/pyftpdlib/src",
    "third_party/skia/include",
    "third_party/skia/gyp",
    "third_party/skia/src",
    "third_party/smhasher/src",
    "tools/grit",
    "tools/gyp",
    "v8",
];

/// Settings for one snapshot run.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// URL of the upstream git server.
    pub git_url: String,
    /// Upstream branch to merge.
    pub git_branch: String,
    /// Upstream SVN revision to merge; `None` means the latest one.
    pub svn_revision: Option<String>,
    /// Root of the downstream checkout of the upstream tree.
    pub repository_root: PathBuf,
    /// Projects merged in addition to the root tree, in merge order.
    pub projects: Vec<String>,
}

impl SnapshotConfig {
    /// Creates a configuration for the fixed project list.
    pub fn new(
        git_url: impl Into<String>,
        git_branch: impl Into<String>,
        svn_revision: Option<String>,
        repository_root: PathBuf,
    ) -> Self {
        Self {
            git_url: git_url.into(),
            git_branch: git_branch.into(),
            svn_revision,
            repository_root,
            projects: THIRD_PARTY_PROJECTS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// The root tree (`.`) followed by every configured project.
    pub fn all_projects(&self) -> Vec<&str> {
        std::iter::once(".")
            .chain(self.projects.iter().map(String::as_str))
            .collect()
    }

    /// Working directory of a project, `.` being the root tree.
    pub fn project_dir(&self, project: &str) -> PathBuf {
        if project == "." {
            self.repository_root.clone()
        } else {
            self.repository_root.join(project)
        }
    }
}
