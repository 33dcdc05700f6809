//! # Revision Resolver
//!
//! Maps each project of interest to the upstream URL and commit it should be
//! merged at, as recorded in the dependency manifest.
//!
//! Entries are looked up in an ordered list of manifest sources
//! ([`DEPS_FALLBACK_ORDER`]): the platform-independent `deps` first, then
//! the platform overrides. The first source that defines a project wins.
//! Placeholder entries (`None`, `''`) do not count as definitions, so the
//! search moves on to the next source.

use std::collections::BTreeMap;
use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::DEPS_PATH_PREFIX;
use crate::error::{Error, Result};
use crate::manifest::{DependencyManifest, Dict, Value};

/// A mapping in the manifest that may define project entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepsSource {
    /// The top-level `deps` dict.
    Deps,
    /// `deps_os[platform]`.
    Os(&'static str),
}

impl DepsSource {
    fn lookup<'m>(&self, manifest: &'m DependencyManifest) -> Option<&'m Dict> {
        match self {
            DepsSource::Deps => manifest.deps(),
            DepsSource::Os(platform) => manifest.deps_os(platform),
        }
    }
}

impl fmt::Display for DepsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepsSource::Deps => write!(f, "deps"),
            DepsSource::Os(platform) => write!(f, "deps_os['{}']", platform),
        }
    }
}

/// Sources searched for each project, in order.
pub const DEPS_FALLBACK_ORDER: &[DepsSource] = &[
    DepsSource::Deps,
    DepsSource::Os("unix"),
    DepsSource::Os("android"),
];

/// Where and at which commit a project should be merged from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMergeInfo {
    pub url: String,
    pub sha1: String,
}

/// Split a `url@revision` entry on its last `@`.
///
/// Returns `None` when there is no `@` or either side is empty.
pub fn split_url_revision(entry: &str) -> Option<(&str, &str)> {
    let (url, revision) = entry.rsplit_once('@')?;
    if url.is_empty() || revision.is_empty() {
        return None;
    }
    Some((url, revision))
}

/// Find the manifest entry for `path`, searching `sources` in order and
/// skipping placeholder values.
pub fn find_entry<'m>(
    manifest: &'m DependencyManifest,
    sources: &[DepsSource],
    path: &str,
) -> Option<(DepsSource, &'m Value)> {
    let key = format!("{}/{}", DEPS_PATH_PREFIX, path);
    sources.iter().find_map(|source| {
        source
            .lookup(manifest)
            .and_then(|deps| deps.get(&key))
            .filter(|value| value.is_truthy())
            .map(|value| (*source, value))
    })
}

/// Resolve every project in `projects` using [`DEPS_FALLBACK_ORDER`].
pub fn resolve_projects<S: AsRef<str>>(
    manifest: &DependencyManifest,
    projects: &[S],
) -> Result<BTreeMap<String, ProjectMergeInfo>> {
    resolve_projects_with(manifest, projects, DEPS_FALLBACK_ORDER)
}

/// Resolve every project in `projects` against an explicit source order.
pub fn resolve_projects_with<S: AsRef<str>>(
    manifest: &DependencyManifest,
    projects: &[S],
    sources: &[DepsSource],
) -> Result<BTreeMap<String, ProjectMergeInfo>> {
    let mut result = BTreeMap::new();
    for path in projects {
        let path = path.as_ref();
        let (_source, value) =
            find_entry(manifest, sources, path).ok_or_else(|| Error::MissingDependency {
                path: path.to_string(),
            })?;
        let malformed = || Error::MalformedEntry {
            path: path.to_string(),
            entry: value.to_string(),
        };
        let entry = value.as_str().ok_or_else(malformed)?;
        let (url, sha1) = split_url_revision(entry).ok_or_else(malformed)?;
        info!("  Got URL {} and SHA1 {} for project {}", url, sha1, path);
        result.insert(
            path.to_string(),
            ProjectMergeInfo {
                url: url.to_string(),
                sha1: sha1.to_string(),
            },
        );
    }
    Ok(result)
}
