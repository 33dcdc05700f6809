//! # Error Handling
//!
//! This module defines the centralized error type for `merge-upstream`. It uses
//! `thiserror` to build a single `Error` enum covering every fatal condition a
//! snapshot can hit, each carrying enough context to tell the operator what
//! to fix before running again.
//!
//! ## Key Components
//!
//! - **`Error`**: every failure the library can report. Variants fall into
//!   four groups:
//!   - external command failures (`CommandExecution`),
//!   - manifest problems (`ManifestParse`, `UnsupportedExpression`, `Lookup`),
//!   - resolution problems (`MissingDependency`, `MalformedEntry`,
//!     `InvalidRevision`, `RevisionNotFound`),
//!   - licensing problems (`ExclusionConfig`, `IncompatibleLicense`).
//!
//! - **`Result<T>`**: a type alias for `std::result::Result<T, Error>`.
//!
//! Merge conflicts have no variant. They go to the operator prompt.

use thiserror::Error;

/// Main error type for merge-upstream operations
#[derive(Error, Debug)]
pub enum Error {
    /// An external command (git, the license script, the build-file
    /// generator) exited unsuccessfully where success was required.
    #[error("Running command `{command}` in {cwd} failed:\n{stderr}")]
    CommandExecution {
        command: String,
        cwd: String,
        stderr: String,
    },

    /// No manifest source defines an entry for a required project.
    ///
    /// This means the fixed project list is out of date relative to the
    /// manifest.
    #[error(
        "Could not find .DEPS.git entry for project {path}. \
         This probably means that the project list needs to be updated."
    )]
    MissingDependency { path: String },

    /// A manifest entry was found but is not of the form `url@revision`.
    #[error("Malformed .DEPS.git entry for project {path}: {entry}")]
    MalformedEntry { path: String, entry: String },

    /// A `Var(...)` reference named a variable nobody defines.
    #[error("Var is not defined: {name}")]
    Lookup { name: String },

    /// The manifest text could not be tokenized or parsed.
    #[error("Manifest parse error at line {line}: {message}")]
    ManifestParse { line: usize, message: String },

    /// The manifest used a construct outside the supported data grammar.
    #[error("Unsupported manifest expression at line {line}: {message}")]
    UnsupportedExpression { line: usize, message: String },

    /// The requested SVN revision is not a plain revision number.
    #[error("Invalid SVN revision {revision:?}: expected a revision number")]
    InvalidRevision { revision: String },

    /// No upstream commit carries the requested revision marker.
    #[error("No upstream commit found for revision {revision}")]
    RevisionNotFound { revision: String },

    /// The exclusion list could not be loaded.
    #[error("Exclusion list error: {message}")]
    ExclusionConfig { message: String },

    /// Incompatibly licensed paths remain after the exclusion pass.
    #[error("Incompatibly licensed directories remain: {}", paths.join("\n"))]
    IncompatibleLicense { paths: Vec<String> },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
