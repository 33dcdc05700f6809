//! # License Collaborators
//!
//! Licensing decisions are made by tooling that ships inside the merged
//! tree, so the latest rules are only available once the root merge has
//! completed. Instead of importing that tooling behind the orchestrator's
//! back, the driver is handed a [`LicenseScanner`] and a [`NoticeGenerator`]
//! up front and calls them at the right point in the run.
//!
//! [`ScriptLicenseTool`] implements both by reading the exclusion list from
//! a YAML file in the tree and shelling out to the license script.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{EXCLUSIONS_FILE, LICENSE_SCRIPT};
use crate::error::{Error, Result};

/// Paths that must never be present after a merge, keyed by project path.
///
/// Patterns are git pathspecs relative to the project directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet(BTreeMap<String, Vec<String>>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the YAML form:
    ///
    /// ```yaml
    /// third_party/foo:
    ///   - docs
    ///   - "*.jar"
    /// ```
    ///
    /// Every pattern must be a valid glob; an invalid one fails the whole
    /// list rather than silently matching nothing.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        let set: Self = serde_yaml::from_str(text)?;
        for pattern in set.0.values().flatten() {
            glob::Pattern::new(pattern)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, path: impl Into<String>, patterns: Vec<String>) {
        self.0.insert(path.into(), patterns);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Whether tracked `file` is covered by pathspec `pattern`.
///
/// A pattern covers a file when it names the file or one of its parent
/// directories, literally or as a glob.
pub fn path_matches(pattern: &str, file: &str) -> bool {
    let pattern = pattern.trim_end_matches('/');
    if pattern.is_empty() {
        return false;
    }
    if file == pattern
        || file
            .strip_prefix(pattern)
            .is_some_and(|rest| rest.starts_with('/'))
    {
        return true;
    }
    let Ok(glob) = glob::Pattern::new(pattern) else {
        return false;
    };
    let mut candidate = Some(file);
    while let Some(path) = candidate {
        if glob.matches(path) {
            return true;
        }
        candidate = path.rsplit_once('/').map(|(parent, _)| parent);
    }
    false
}

/// Knows which paths may not be shipped for licensing reasons.
pub trait LicenseScanner {
    /// The exclusion list to apply after merging.
    fn known_incompatible(&self) -> Result<ExclusionSet>;

    /// Directories in the current tree whose licenses are still
    /// incompatible. Empty means the tree is clean.
    fn incompatible_directories(&self) -> Result<Vec<String>>;
}

/// Produces the text of the top-level notice file.
pub trait NoticeGenerator {
    fn generate_notice(&self) -> Result<String>;
}

/// License tooling found inside the merged tree.
#[derive(Debug, Clone)]
pub struct ScriptLicenseTool {
    root: PathBuf,
    exclusions_file: PathBuf,
    script: PathBuf,
}

impl ScriptLicenseTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            exclusions_file: exclusions_path(&root),
            script: root.join(LICENSE_SCRIPT),
            root,
        }
    }

    fn run_script(&self, command: &str) -> Result<String> {
        let rendered = format!("python {} {}", self.script.display(), command);
        debug!("Running {} in {}", rendered, self.root.display());
        let output = Command::new("python")
            .arg(&self.script)
            .arg(command)
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::CommandExecution {
                command: rendered.clone(),
                cwd: self.root.display().to_string(),
                stderr: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(Error::CommandExecution {
                command: rendered,
                cwd: self.root.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl LicenseScanner for ScriptLicenseTool {
    fn known_incompatible(&self) -> Result<ExclusionSet> {
        let text = std::fs::read_to_string(&self.exclusions_file).map_err(|e| {
            Error::ExclusionConfig {
                message: format!("cannot read {}: {}", self.exclusions_file.display(), e),
            }
        })?;
        ExclusionSet::from_yaml(&text)
    }

    fn incompatible_directories(&self) -> Result<Vec<String>> {
        let out = self.run_script("incompatible_directories")?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl NoticeGenerator for ScriptLicenseTool {
    fn generate_notice(&self) -> Result<String> {
        self.run_script("notice")
    }
}

/// Resolve the path of the exclusion list for a checkout rooted at `root`.
pub fn exclusions_path(root: &Path) -> PathBuf {
    root.join(EXCLUSIONS_FILE)
}
