//! Conflict handling for an in-progress merge.

use std::path::Path;

use log::info;

use crate::error::Result;
use crate::git::StatusEntry;
use crate::prompt::ConflictPrompt;
use crate::repository::RepositoryClient;

/// Resolve what can be resolved automatically, wait for the operator to
/// resolve the rest, then commit.
///
/// Paths deleted on our side stay deleted. Every other conflict is shown to
/// the operator until `git status` no longer reports any. Returns whether
/// any conflict was seen.
pub fn resolve_and_commit(
    repo: &dyn RepositoryClient,
    prompt: &dyn ConflictPrompt,
    cwd: &Path,
    default_message: &str,
) -> Result<bool> {
    let status = repo.status(cwd)?;
    let deleted_by_us: Vec<&str> = status
        .iter()
        .filter(|entry| entry.is_deleted_by_us())
        .map(|entry| entry.path.as_str())
        .collect();
    let mut saw_conflicts = !deleted_by_us.is_empty();
    if !deleted_by_us.is_empty() {
        info!(
            "Keeping ours for the following locally deleted files.\n  {}",
            deleted_by_us.join("\n  ")
        );
        repo.rm(cwd, &deleted_by_us, true)?;
    }

    let mut message = default_message.to_string();
    loop {
        let conflicts: Vec<StatusEntry> = repo
            .status(cwd)?
            .into_iter()
            .filter(StatusEntry::is_conflict)
            .collect();
        if conflicts.is_empty() {
            break;
        }
        saw_conflicts = true;
        if let Some(replacement) = prompt.resolve(&conflicts, &message)? {
            message = replacement;
        }
    }

    repo.commit(cwd, &message)?;
    Ok(saw_conflicts)
}
