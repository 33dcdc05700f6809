//! Removal of license-incompatible paths after a merge.

use std::path::Path;

use log::info;

use crate::config::SnapshotConfig;
use crate::error::{Error, Result};
use crate::licenses::{path_matches, ExclusionSet, LicenseScanner};
use crate::repository::RepositoryClient;

/// Commit message used when the exclusion pass changed a project.
pub const EXCLUDE_MESSAGE: &str = "Exclude incompatible directories";

/// Remove every excluded path from its project and commit per project when
/// something was actually removed.
pub fn apply(
    repo: &dyn RepositoryClient,
    config: &SnapshotConfig,
    exclusions: &ExclusionSet,
) -> Result<()> {
    for (path, patterns) in exclusions.iter() {
        info!(
            "  {}",
            patterns
                .iter()
                .map(|p| format!("{}/{}", path, p))
                .collect::<Vec<_>>()
                .join("\n  ")
        );
        let dir = config.project_dir(path);
        let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
        repo.rm(&dir, &patterns, true)?;
        if repo.has_staged_changes(&dir)? {
            repo.commit(&dir, EXCLUDE_MESSAGE)?;
        }
    }
    Ok(())
}

/// Tracked files that are still covered by an exclusion, as paths relative
/// to the repository root.
pub fn remaining(
    repo: &dyn RepositoryClient,
    config: &SnapshotConfig,
    exclusions: &ExclusionSet,
) -> Result<Vec<String>> {
    let mut left = Vec::new();
    for (path, patterns) in exclusions.iter() {
        let dir = config.project_dir(path);
        for file in repo.ls_files(&dir)? {
            if patterns.iter().any(|p| path_matches(p, &file)) {
                left.push(join(path, &file));
            }
        }
    }
    Ok(left)
}

/// Fail unless both the exclusion list and the license scanner agree the
/// tree is clean.
pub fn verify(
    repo: &dyn RepositoryClient,
    config: &SnapshotConfig,
    exclusions: &ExclusionSet,
    scanner: &dyn LicenseScanner,
) -> Result<()> {
    let left = remaining(repo, config, exclusions)?;
    if !left.is_empty() {
        return Err(Error::IncompatibleLicense { paths: left });
    }
    let directories = scanner.incompatible_directories()?;
    if !directories.is_empty() {
        return Err(Error::IncompatibleLicense { paths: directories });
    }
    Ok(())
}

fn join(project: &str, file: &str) -> String {
    if project == "." {
        file.to_string()
    } else {
        Path::new(project).join(file).display().to_string()
    }
}
