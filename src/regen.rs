//! # Downstream Regeneration
//!
//! After a merge the tree carries files that are derived from the merged
//! sources rather than merged themselves: the top-level notice file and the
//! generated makefiles. Both are rebuilt and committed here, but only when
//! the result actually differs from what is already committed.

use std::path::Path;
use std::process::Command;

use log::{debug, info};

use crate::config::{SnapshotConfig, AUTOGEN_MESSAGE, GENERATED_BUILD_FILES, NOTICE_FILE};
use crate::error::{Error, Result};
use crate::licenses::NoticeGenerator;
use crate::repository::RepositoryClient;

/// Regenerates the downstream build files for a merged tree.
pub trait BuildFileGenerator {
    fn generate(&self, root: &Path) -> Result<()>;
}

/// Runs the in-tree gyp wrapper from the downstream environment setup.
#[derive(Debug, Default, Clone, Copy)]
pub struct GypGenerator;

impl GypGenerator {
    const SCRIPT: &'static str = ". build/android/envsetup.sh && android_gyp";
}

impl BuildFileGenerator for GypGenerator {
    fn generate(&self, root: &Path) -> Result<()> {
        let rendered = format!("bash -c '{}'", Self::SCRIPT);
        debug!("Running {} in {}", rendered, root.display());
        let output = Command::new("bash")
            .arg("-c")
            .arg(Self::SCRIPT)
            .env("CHROME_ANDROID_BUILD_WEBVIEW", "1")
            .env("CHROME_SRC", root)
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .current_dir(root)
            .output()
            .map_err(|e| Error::CommandExecution {
                command: rendered.clone(),
                cwd: root.display().to_string(),
                stderr: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(Error::CommandExecution {
                command: rendered,
                cwd: root.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(())
    }
}

pub fn notice_commit_message(svn_revision: &str) -> String {
    format!(
        "Update NOTICE file after merge of Chromium at r{}\n\n{}",
        svn_revision, AUTOGEN_MESSAGE
    )
}

pub fn makefiles_commit_message(svn_revision: &str) -> String {
    format!(
        "Update makefiles after merge of Chromium at r{}\n\n{}",
        svn_revision, AUTOGEN_MESSAGE
    )
}

/// Rewrite the notice file at the repository root and commit it if it
/// changed. Returns whether a commit was made.
pub fn regenerate_notice(
    repo: &dyn RepositoryClient,
    generator: &dyn NoticeGenerator,
    config: &SnapshotConfig,
    svn_revision: &str,
) -> Result<bool> {
    info!("Regenerating NOTICE file ...");
    let root = &config.repository_root;
    let contents = generator.generate_notice()?;
    std::fs::write(root.join(NOTICE_FILE), contents)?;
    repo.add(root, &[NOTICE_FILE], false)?;
    if !repo.has_staged_changes(root)? {
        return Ok(false);
    }
    repo.commit(root, &notice_commit_message(svn_revision))?;
    Ok(true)
}

/// Replace the generated makefiles in every project with freshly generated
/// ones, committing per project. Returns the projects that got a commit.
pub fn regenerate_build_files(
    repo: &dyn RepositoryClient,
    generator: &dyn BuildFileGenerator,
    config: &SnapshotConfig,
    svn_revision: &str,
) -> Result<Vec<String>> {
    info!("Regenerating makefiles ...");
    let projects = config.all_projects();

    for project in &projects {
        repo.rm(&config.project_dir(project), GENERATED_BUILD_FILES, false)?;
    }

    generator.generate(&config.repository_root)?;

    let mut committed = Vec::new();
    for project in &projects {
        let dir = config.project_dir(project);
        // git add has no --ignore-unmatch, so each pattern is added on its own
        for &pattern in GENERATED_BUILD_FILES {
            if let Err(e) = repo.add(&dir, &[pattern], true) {
                debug!("Nothing to add for {} in {}: {}", pattern, project, e);
            }
        }
        if repo.has_staged_changes(&dir)? {
            repo.commit(&dir, &makefiles_commit_message(svn_revision))?;
            committed.push(project.to_string());
        }
    }
    Ok(committed)
}
