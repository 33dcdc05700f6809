//! # Merge Orchestrator
//!
//! Merges each third-party project, then the root tree, at the revisions
//! recorded upstream. Every merge follows the same steps:
//!
//! 1. create the merge branch from the tracking branch,
//! 2. fetch the upstream objects,
//! 3. skip the project if the target revision brings nothing new,
//! 4. merge without committing (conflicts are expected, not fatal),
//! 5. settle conflicts, asking the operator when needed, and commit.
//!
//! Once everything is merged, license-incompatible paths are removed and
//! the tree is checked for leftovers.
//!
//! Projects are merged one at a time. Each merge may block on the operator,
//! and every project shares the same checkout.

pub mod conflicts;
pub mod exclusions;

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info, warn};

use crate::config::{SnapshotConfig, AUTOGEN_MESSAGE, MERGE_BRANCH, TRACKING_BRANCH};
use crate::error::{Error, Result};
use crate::licenses::LicenseScanner;
use crate::manifest::fetch_manifest;
use crate::prompt::ConflictPrompt;
use crate::repository::RepositoryClient;
use crate::resolver::{resolve_projects, ProjectMergeInfo};
use crate::snapshot::SnapshotTarget;

/// What happened to one project during a merge pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The target revision had nothing new.
    NoOp,
    /// Merged and committed without conflicts.
    MergedClean,
    /// Merged and committed after conflicts were settled.
    MergedWithConflictsResolved,
}

impl MergeOutcome {
    fn merged(saw_conflicts: bool) -> Self {
        if saw_conflicts {
            MergeOutcome::MergedWithConflictsResolved
        } else {
            MergeOutcome::MergedClean
        }
    }

    /// Whether a merge commit was produced.
    pub fn committed(&self) -> bool {
        !matches!(self, MergeOutcome::NoOp)
    }
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeOutcome::NoOp => write!(f, "nothing new"),
            MergeOutcome::MergedClean => write!(f, "merged"),
            MergeOutcome::MergedWithConflictsResolved => write!(f, "merged, conflicts resolved"),
        }
    }
}

/// Commit message for a third-party project merge.
pub fn project_commit_message(path: &str, info: &ProjectMergeInfo) -> String {
    format!(
        "Merge {} from {} at {}\n\n{}",
        path, info.url, info.sha1, AUTOGEN_MESSAGE
    )
}

/// Commit message for the root tree merge.
pub fn root_commit_message(target: &SnapshotTarget) -> String {
    format!(
        "Merge Chromium from {} branch {} at r{} ({})\n\n{}",
        target.git_url, target.git_branch, target.svn_revision, target.sha1, AUTOGEN_MESSAGE
    )
}

/// Drives the per-project merges of one snapshot.
pub struct MergeOrchestrator<'a> {
    repo: &'a dyn RepositoryClient,
    prompt: &'a dyn ConflictPrompt,
    config: &'a SnapshotConfig,
}

impl<'a> MergeOrchestrator<'a> {
    pub fn new(
        repo: &'a dyn RepositoryClient,
        prompt: &'a dyn ConflictPrompt,
        config: &'a SnapshotConfig,
    ) -> Self {
        Self {
            repo,
            prompt,
            config,
        }
    }

    /// Merge one third-party project at its resolved revision.
    pub fn merge_project(&self, path: &str, info: &ProjectMergeInfo) -> Result<MergeOutcome> {
        let dir = self.config.project_dir(path);
        self.repo
            .checkout_tracking_branch(&dir, MERGE_BRANCH, TRACKING_BRANCH)?;
        info!("Fetching project {} at {} ...", path, info.sha1);
        self.repo.fetch(&dir, &info.url, None, false)?;
        if !self.repo.has_new_commits(&dir, &info.sha1)? {
            info!("No new commits to merge in project {}", path);
            return Ok(MergeOutcome::NoOp);
        }
        info!("Merging project {} at {} ...", path, info.sha1);
        if !self.repo.merge_no_commit(&dir, &info.sha1)? {
            warn!("Merge of project {} stopped with conflicts", path);
        }
        let saw_conflicts = conflicts::resolve_and_commit(
            self.repo,
            self.prompt,
            &dir,
            &project_commit_message(path, info),
        )?;
        Ok(MergeOutcome::merged(saw_conflicts))
    }

    /// Merge the root tree at the snapshot target.
    pub fn merge_root(&self, target: &SnapshotTarget) -> Result<MergeOutcome> {
        let root = &self.config.repository_root;
        self.repo
            .checkout_tracking_branch(root, MERGE_BRANCH, TRACKING_BRANCH)?;
        info!("Fetching Chromium at {} ...", target.sha1);
        self.repo
            .fetch(root, &target.git_url, Some(&target.git_branch), false)?;
        info!("Merging Chromium at {} ...", target.sha1);
        if !self.repo.merge_no_commit(root, &target.sha1)? {
            warn!("Merge of Chromium at {} stopped with conflicts", target.sha1);
        }
        let saw_conflicts = conflicts::resolve_and_commit(
            self.repo,
            self.prompt,
            root,
            &root_commit_message(target),
        )?;
        Ok(MergeOutcome::merged(saw_conflicts))
    }

    /// Merge every configured project in list order, then the root tree.
    ///
    /// The returned outcomes are in merge order, the root tree last as `.`.
    pub fn merge_all(
        &self,
        target: &SnapshotTarget,
        merge_info: &BTreeMap<String, ProjectMergeInfo>,
    ) -> Result<Vec<(String, MergeOutcome)>> {
        let mut outcomes = Vec::with_capacity(self.config.projects.len() + 1);
        for path in &self.config.projects {
            let info = merge_info
                .get(path)
                .ok_or_else(|| Error::MissingDependency { path: path.clone() })?;
            outcomes.push((path.clone(), self.merge_project(path, info)?));
        }
        outcomes.push((".".to_string(), self.merge_root(target)?));
        Ok(outcomes)
    }

    /// Resolve project revisions from the upstream manifest, merge
    /// everything, and strip license-incompatible paths.
    pub fn run(
        &self,
        target: &SnapshotTarget,
        scanner: &dyn LicenseScanner,
    ) -> Result<Vec<(String, MergeOutcome)>> {
        let manifest = fetch_manifest(
            self.repo,
            &self.config.repository_root,
            &target.git_url,
            &target.git_branch,
            &target.sha1,
        )?;
        let merge_info = resolve_projects(&manifest, &self.config.projects)?;
        if let Ok(json) = serde_json::to_string_pretty(&merge_info) {
            debug!("Resolved projects:\n{}", json);
        }

        let outcomes = self.merge_all(target, &merge_info)?;

        info!("Getting directories to exclude ...");
        let exclusions = scanner.known_incompatible()?;
        exclusions::apply(self.repo, self.config, &exclusions)?;
        exclusions::verify(self.repo, self.config, &exclusions, scanner)?;
        Ok(outcomes)
    }
}
