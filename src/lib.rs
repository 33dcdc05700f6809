//! # merge-upstream
//!
//! Snapshots an upstream source tree at a given revision and merges it, along
//! with a fixed set of third-party sub-projects, into a downstream checkout.
//! License-incompatible paths are stripped after the merge, and the
//! downstream notice file and makefiles are regenerated.
//!
//! ## Quick Example
//!
//! ```
//! use merge_upstream::manifest::DependencyManifest;
//! use merge_upstream::resolver::resolve_projects;
//!
//! let manifest = DependencyManifest::parse(
//!     "vars = {'u': 'https://u'}\n\
//!      deps = {'src/third_party/icu': Var('u') + '/icu@abc123'}\n",
//! )
//! .unwrap();
//! let info = resolve_projects(&manifest, &["third_party/icu"]).unwrap();
//! assert_eq!(info["third_party/icu"].url, "https://u/icu");
//! assert_eq!(info["third_party/icu"].sha1, "abc123");
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`manifest`)**: A restricted evaluator for the upstream
//!   dependency manifest. It understands literals, `Var` and `From`, and
//!   rejects everything else.
//! - **Resolver (`resolver`)**: Maps each sub-project to the URL and commit
//!   recorded in the manifest, searching `deps` before the platform blocks.
//! - **Merge (`merge`)**: Merges each sub-project and then the root tree,
//!   settles conflicts with the operator, and removes excluded paths.
//! - **Regeneration (`regen`)**: Rebuilds the notice file and makefiles.
//! - **Snapshot (`snapshot`)**: Sequences a whole run.
//! - **Collaborators (`repository`, `licenses`, `prompt`)**: Traits for
//!   everything with side effects, so each step can be driven in tests
//!   without a real repository or terminal.

pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod licenses;
pub mod manifest;
pub mod merge;
pub mod output;
pub mod prompt;
pub mod regen;
pub mod repository;
pub mod resolver;
pub mod snapshot;
