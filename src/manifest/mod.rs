//! # Dependency Manifest
//!
//! The upstream tree describes its third-party repositories in a `.DEPS.git`
//! file. Although the file is written with Python syntax, only a small data
//! subset is used in practice: assignments of string, list and dict literals,
//! string concatenation, `Var("name")` lookups into the `vars` dict, and
//! `From("module")` references to dependencies defined elsewhere.
//!
//! This module evaluates exactly that subset:
//!
//! - [`lexer`] splits the text into tokens,
//! - [`parser`] builds assignment statements over a fixed grammar,
//! - [`eval`] turns the statements into [`Value`]s.
//!
//! The result is a [`DependencyManifest`], from which the resolver reads the
//! `deps` and `deps_os` mappings.
//!
//! ```
//! use merge_upstream::manifest::DependencyManifest;
//!
//! let manifest = DependencyManifest::parse(
//!     r#"
//! vars = {'git_url': 'https://u'}
//! deps = {'src/v8': Var('git_url') + '/v8.git@abc'}
//! "#,
//! )
//! .unwrap();
//! assert_eq!(
//!     manifest.deps().unwrap().get("src/v8").and_then(|v| v.as_str()),
//!     Some("https://u/v8.git@abc")
//! );
//! ```

pub mod eval;
pub mod lexer;
pub mod parser;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use log::info;

use crate::config::{CACHED_UPSTREAM_REF, DEPS_FILE};
use crate::error::Result;
use crate::repository::RepositoryClient;

/// A dict value. Keys keep their first insertion position; re-inserting a
/// key replaces its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict(Vec<(String, Value)>);

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Dict {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut dict = Dict::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

/// An evaluated manifest value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    None,
    List(Vec<Value>),
    Dict(Dict),
    /// A dependency defined in another module. Only used for display.
    From {
        module: String,
        path: Option<String>,
    },
}

impl Value {
    /// Whether the value counts as set. `None`, empty strings, zero, `False`
    /// and empty containers do not.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Int(n) => *n != 0,
            Value::Bool(b) => *b,
            Value::None => false,
            Value::List(items) => !items.is_empty(),
            Value::Dict(dict) => !dict.is_empty(),
            Value::From { .. } => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::None => write!(f, "None"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Dict(dict) => {
                write!(f, "{{")?;
                for (i, (k, v)) in dict.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::From { module, path: None } => write!(f, "From({:?})", module),
            Value::From {
                module,
                path: Some(path),
            } => write!(f, "From({:?}, {:?})", module, path),
        }
    }
}

/// The top-level assignments of an evaluated manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyManifest {
    assignments: BTreeMap<String, Value>,
}

impl DependencyManifest {
    /// Evaluate manifest text with no variable overrides.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_vars(text, &HashMap::new())
    }

    /// Evaluate manifest text. `custom_vars` take precedence over the
    /// manifest's own `vars` in `Var(...)` lookups.
    pub fn parse_with_vars(text: &str, custom_vars: &HashMap<String, Value>) -> Result<Self> {
        let tokens = lexer::tokenize(text)?;
        let statements = parser::parse(tokens)?;
        let assignments = eval::evaluate(&statements, custom_vars)?;
        Ok(Self { assignments })
    }

    /// Any top-level assignment, e.g. `include_rules` or `hooks`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.assignments.get(name)
    }

    pub fn vars(&self) -> Option<&Dict> {
        self.get("vars").and_then(Value::as_dict)
    }

    pub fn deps(&self) -> Option<&Dict> {
        self.get("deps").and_then(Value::as_dict)
    }

    /// Per-platform overrides for `platform` (e.g. `unix`, `android`).
    pub fn deps_os(&self, platform: &str) -> Option<&Dict> {
        self.get("deps_os")
            .and_then(Value::as_dict)
            .and_then(|os| os.get(platform))
            .and_then(Value::as_dict)
    }

    /// Names of all top-level assignments.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.assignments.keys().map(String::as_str)
    }
}

/// Read and evaluate the manifest from the upstream tree at `sha1`.
///
/// The upstream branch is fetched into a local ref first so that repeated
/// reads do not download the same history again.
pub fn fetch_manifest(
    repo: &dyn RepositoryClient,
    root: &Path,
    git_url: &str,
    git_branch: &str,
    sha1: &str,
) -> Result<DependencyManifest> {
    info!("Parsing DEPS ...");
    let refspec = format!("{}:{}", git_branch, CACHED_UPSTREAM_REF);
    repo.fetch(root, git_url, Some(&refspec), true)?;
    let text = repo.show_file(root, sha1, DEPS_FILE)?;
    DependencyManifest::parse(&text)
}
