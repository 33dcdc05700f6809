//! Thin wrappers around the system `git` command.
//!
//! Every function runs `git` synchronously in a given working directory. A
//! non-zero exit is turned into [`Error::CommandExecution`] unless the caller
//! explicitly asks for the exit status instead (see [`run_git_status`]).

use std::fmt;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use crate::error::{Error, Result};

/// Porcelain codes that mark an unmerged path.
const CONFLICT_CODES: &[&str] = &["DD", "AU", "UD", "UA", "DU", "AA", "UU"];

/// Conflict codes where our side deleted the path.
const DELETED_BY_US_CODES: &[&str] = &["DD", "DU"];

/// One line of `git status --porcelain` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Two-character `XY` status code.
    pub code: String,
    /// Path relative to the working directory.
    pub path: String,
}

impl StatusEntry {
    pub fn new(code: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            path: path.into(),
        }
    }

    /// Whether the path is still unmerged.
    pub fn is_conflict(&self) -> bool {
        CONFLICT_CODES.contains(&self.code.as_str())
    }

    /// Whether the path is unmerged and was deleted on our side.
    pub fn is_deleted_by_us(&self) -> bool {
        DELETED_BY_US_CODES.contains(&self.code.as_str())
    }

    /// Whether the index holds a change for this path.
    pub fn is_staged(&self) -> bool {
        matches!(self.code.chars().next(), Some('M' | 'A' | 'D' | 'R' | 'C'))
    }
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.path)
    }
}

/// Parse `git status --porcelain` output.
///
/// Lines too short to carry a code and a path are skipped.
pub fn parse_porcelain(output: &str) -> Vec<StatusEntry> {
    output
        .lines()
        .filter_map(|line| {
            let code = line.get(..2)?;
            let path = line.get(3..)?;
            if path.is_empty() {
                return None;
            }
            Some(StatusEntry::new(code, path))
        })
        .collect()
}

/// A commit found by [`log_grep`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub sha1: String,
    pub body: String,
}

fn describe(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}

fn spawn(cwd: &Path, args: &[&str]) -> Result<Output> {
    debug!("Running {} in {}", describe(args), cwd.display());
    Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| Error::CommandExecution {
            command: describe(args),
            cwd: cwd.display().to_string(),
            stderr: e.to_string(),
        })
}

/// Run git and return its stdout, failing on a non-zero exit.
pub fn run_git(cwd: &Path, args: &[&str]) -> Result<String> {
    let output = spawn(cwd, args)?;
    if !output.status.success() {
        return Err(Error::CommandExecution {
            command: describe(args),
            cwd: cwd.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Run git and report whether it exited successfully.
///
/// Used where a non-zero exit is an expected outcome, such as a merge that
/// stops on conflicts. Failing to start git at all is still an error.
pub fn run_git_status(cwd: &Path, args: &[&str]) -> Result<bool> {
    let output = spawn(cwd, args)?;
    if !output.status.success() {
        debug!(
            "{} exited with {}: {}",
            describe(args),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(output.status.success())
}

/// `git fetch [-f] <url> [<refspec>]`
pub fn fetch(cwd: &Path, url: &str, refspec: Option<&str>, force: bool) -> Result<()> {
    let mut args = vec!["fetch"];
    if force {
        args.push("-f");
    }
    args.push(url);
    if let Some(refspec) = refspec {
        args.push(refspec);
    }
    run_git(cwd, &args).map(|_| ())
}

/// `git checkout -b <branch> -t <upstream>`
pub fn checkout_tracking_branch(cwd: &Path, branch: &str, upstream: &str) -> Result<()> {
    run_git(cwd, &["checkout", "-b", branch, "-t", upstream]).map(|_| ())
}

/// Whether `revision` has history that `HEAD` does not.
pub fn has_new_commits(cwd: &Path, revision: &str) -> Result<bool> {
    let range = format!("HEAD..{}", revision);
    let out = run_git(cwd, &["rev-list", "-1", &range])?;
    Ok(!out.trim().is_empty())
}

/// `git merge --no-ff --no-commit <revision>`; returns `false` when git
/// stopped with conflicts.
///
/// Fast-forwards are disabled so the merge always ends in a commit of its
/// own, even when the merge branch has nothing git would need to merge.
pub fn merge_no_commit(cwd: &Path, revision: &str) -> Result<bool> {
    run_git_status(cwd, &["merge", "--no-ff", "--no-commit", revision])
}

/// Parsed `git status --porcelain`.
pub fn status(cwd: &Path) -> Result<Vec<StatusEntry>> {
    run_git(cwd, &["status", "--porcelain"]).map(|out| parse_porcelain(&out))
}

/// `git rm [-rf] --ignore-unmatch <paths...>`
pub fn rm(cwd: &Path, paths: &[&str], recursive: bool) -> Result<()> {
    if paths.is_empty() {
        return Ok(());
    }
    let mut args = vec!["rm"];
    if recursive {
        args.push("-rf");
    }
    args.push("--ignore-unmatch");
    args.extend_from_slice(paths);
    run_git(cwd, &args).map(|_| ())
}

/// `git add [-f] <paths...>`
pub fn add(cwd: &Path, paths: &[&str], force: bool) -> Result<()> {
    let mut args = vec!["add"];
    if force {
        args.push("-f");
    }
    args.extend_from_slice(paths);
    run_git(cwd, &args).map(|_| ())
}

/// `git commit -m <message>`
pub fn commit(cwd: &Path, message: &str) -> Result<()> {
    run_git(cwd, &["commit", "-m", message]).map(|_| ())
}

/// Commits reachable from `revision` whose message matches `pattern`, most
/// recent first.
pub fn log_grep(
    cwd: &Path,
    revision: &str,
    pattern: &str,
    max_count: Option<usize>,
) -> Result<Vec<LogEntry>> {
    let grep = format!("--grep={}", pattern);
    let limit = max_count.map(|n| format!("-n{}", n));
    let mut args = vec!["log"];
    if let Some(limit) = limit.as_deref() {
        args.push(limit);
    }
    args.extend_from_slice(&[grep.as_str(), "--format=%H%n%b%x00", revision]);
    run_git(cwd, &args).map(|out| parse_log(&out))
}

fn parse_log(output: &str) -> Vec<LogEntry> {
    output
        .split('\0')
        .filter_map(|record| {
            let record = record.trim_start_matches('\n');
            let (sha1, body) = record.split_once('\n').unwrap_or((record, ""));
            let sha1 = sha1.trim();
            if sha1.is_empty() {
                return None;
            }
            Some(LogEntry {
                sha1: sha1.to_string(),
                body: body.trim_end().to_string(),
            })
        })
        .collect()
}

/// `git show <revision>:<path>`
pub fn show_file(cwd: &Path, revision: &str, path: &str) -> Result<String> {
    let spec = format!("{}:{}", revision, path);
    run_git(cwd, &["show", &spec])
}

/// Tracked files below the working directory, relative to it.
pub fn ls_files(cwd: &Path) -> Result<Vec<String>> {
    let out = run_git(cwd, &["ls-files"])?;
    Ok(out.lines().map(str::to_string).collect())
}
