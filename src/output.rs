//! # Output Configuration
//!
//! Controls whether terminal output (the conflict prompt and the final
//! summary) is colored.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use crate::merge::MergeOutcome;
use crate::snapshot::SnapshotOutcome;

/// Output configuration for controlling colors and symbols.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `always` and `never` win over the environment; anything else detects
    /// support from the variables listed above and the terminal on stderr.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // Presence alone disables colors, even if empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stderr().features().colors_supported()
    }

    /// Make `console` styling follow this configuration.
    pub fn apply(&self) {
        console::set_colors_enabled(self.use_color);
        console::set_colors_enabled_stderr(self.use_color);
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the symbol when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// One line per project plus a closing line, as printed after a run.
pub fn summary(config: &OutputConfig, outcome: &SnapshotOutcome) -> Vec<String> {
    match outcome {
        SnapshotOutcome::UpToDate(target) => vec![format!(
            "{} Already up to date with {}",
            emoji(config, "✔", "[OK]"),
            target
        )],
        SnapshotOutcome::Merged { target, projects } => {
            let mut lines: Vec<String> = projects
                .iter()
                .map(|(path, result)| {
                    let marker = match result {
                        MergeOutcome::NoOp => emoji(config, "·", "[--]"),
                        MergeOutcome::MergedClean => emoji(config, "✔", "[OK]"),
                        MergeOutcome::MergedWithConflictsResolved => emoji(config, "⚠", "[!!]"),
                    };
                    format!("{} {}: {}", marker, path, result)
                })
                .collect();
            lines.push(format!("Merged Chromium from {}", target));
            lines
        }
    }
}
