//! # Snapshot Driver
//!
//! Top-level sequencing of one run:
//!
//! 1. Resolve the upstream revision to merge into a [`SnapshotTarget`].
//! 2. Stop early if the root tree already contains it.
//! 3. Merge every project and the root tree, then strip excluded paths.
//! 4. Regenerate the notice file.
//! 5. Regenerate the makefiles.
//!
//! Each step runs only if the previous one succeeded. Nothing is rolled back
//! on failure; commits made before the failing step stay in place.

use std::fmt;

use log::info;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{SnapshotConfig, CACHED_UPSTREAM_REF};
use crate::error::{Error, Result};
use crate::licenses::{LicenseScanner, NoticeGenerator};
use crate::merge::{MergeOrchestrator, MergeOutcome};
use crate::prompt::ConflictPrompt;
use crate::regen::{self, BuildFileGenerator};
use crate::repository::RepositoryClient;

/// The upstream commit a run merges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotTarget {
    pub git_url: String,
    pub git_branch: String,
    pub svn_revision: String,
    pub sha1: String,
}

impl fmt::Display for SnapshotTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} branch {} at r{} ({})",
            self.git_url, self.git_branch, self.svn_revision, self.sha1
        )
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// The root tree already contained the target.
    UpToDate(SnapshotTarget),
    Merged {
        target: SnapshotTarget,
        projects: Vec<(String, MergeOutcome)>,
    },
}

impl SnapshotOutcome {
    pub fn target(&self) -> &SnapshotTarget {
        match self {
            SnapshotOutcome::UpToDate(target) => target,
            SnapshotOutcome::Merged { target, .. } => target,
        }
    }
}

/// Find the upstream commit for the configured revision, or for the latest
/// revision when none was given.
pub fn resolve_target(
    repo: &dyn RepositoryClient,
    config: &SnapshotConfig,
) -> Result<SnapshotTarget> {
    if let Some(revision) = &config.svn_revision {
        if revision.is_empty() || !revision.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidRevision {
                revision: revision.clone(),
            });
        }
    }
    info!("Getting SVN revision and SHA1 ...");
    let root = &config.repository_root;
    let refspec = format!("{}:{}", config.git_branch, CACHED_UPSTREAM_REF);
    repo.fetch(root, &config.git_url, Some(&refspec), true)?;

    let (svn_revision, sha1) = match &config.svn_revision {
        Some(revision) => {
            // The svn id is always followed by the repository UUID, so the
            // trailing space keeps r200 from matching r2001. Several commits
            // may carry the same provenance line; the most recent one wins.
            let pattern = format!("git-svn-id: .*@{} ", revision);
            let entry = repo
                .log_grep(root, CACHED_UPSTREAM_REF, &pattern, None)?
                .into_iter()
                .next()
                .ok_or_else(|| Error::RevisionNotFound {
                    revision: revision.clone(),
                })?;
            (revision.clone(), entry.sha1)
        }
        None => {
            let not_found = || Error::RevisionNotFound {
                revision: "latest".to_string(),
            };
            let entry = repo
                .log_grep(root, CACHED_UPSTREAM_REF, "git-svn-id:", Some(1))?
                .into_iter()
                .next()
                .ok_or_else(not_found)?;
            let re = Regex::new(r"(?m)^git-svn-id: .*@([0-9]+)")?;
            let revision = re
                .captures(&entry.body)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .ok_or_else(not_found)?;
            (revision, entry.sha1)
        }
    };

    Ok(SnapshotTarget {
        git_url: config.git_url.clone(),
        git_branch: config.git_branch.clone(),
        svn_revision,
        sha1,
    })
}

/// Everything a run talks to, passed in explicitly.
pub struct Snapshot<'a> {
    pub repo: &'a dyn RepositoryClient,
    pub prompt: &'a dyn ConflictPrompt,
    pub scanner: &'a dyn LicenseScanner,
    pub notices: &'a dyn NoticeGenerator,
    pub build_files: &'a dyn BuildFileGenerator,
    pub config: &'a SnapshotConfig,
}

impl Snapshot<'_> {
    /// Run a full snapshot.
    pub fn run(&self) -> Result<SnapshotOutcome> {
        let target = resolve_target(self.repo, self.config)?;
        if !self
            .repo
            .has_new_commits(&self.config.repository_root, &target.sha1)?
        {
            info!("No new commits to merge from {}", target);
            return Ok(SnapshotOutcome::UpToDate(target));
        }

        info!("Snapshotting Chromium from {}", target);
        let projects =
            MergeOrchestrator::new(self.repo, self.prompt, self.config).run(&target, self.scanner)?;
        regen::regenerate_notice(self.repo, self.notices, self.config, &target.svn_revision)?;
        regen::regenerate_build_files(
            self.repo,
            self.build_files,
            self.config,
            &target.svn_revision,
        )?;
        Ok(SnapshotOutcome::Merged { target, projects })
    }
}
