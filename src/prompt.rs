//! Operator interaction for unresolved merge conflicts.
//!
//! Conflict resolution is a manual judgement call, so the orchestrator never
//! gives up on conflicts by itself: it lists them and waits until the
//! operator reports they are resolved.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input};

use crate::error::{Error, Result};
use crate::git::StatusEntry;

/// Asks the operator to resolve conflicts.
pub trait ConflictPrompt {
    /// Show `conflicts` and block until the operator answers.
    ///
    /// Returns a replacement commit message, or `None` to keep
    /// `default_message`.
    fn resolve(&self, conflicts: &[StatusEntry], default_message: &str) -> Result<Option<String>>;
}

/// Format the conflict list shown to the operator.
pub fn format_conflicts(conflicts: &[StatusEntry]) -> String {
    conflicts
        .iter()
        .map(StatusEntry::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Terminal prompt built on `dialoguer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl ConflictPrompt for TerminalPrompt {
    fn resolve(&self, conflicts: &[StatusEntry], default_message: &str) -> Result<Option<String>> {
        eprintln!(
            "{}\n\n{}\n",
            style("The following conflicts exist and must be resolved.").yellow().bold(),
            format_conflicts(conflicts)
        );
        let answer: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "When done, enter a commit message or press enter to use the default ('{}')",
                default_message
            ))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
        let answer = answer.trim();
        Ok(if answer.is_empty() {
            None
        } else {
            Some(answer.to_string())
        })
    }
}
