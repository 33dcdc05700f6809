//! End-to-end tests for CLI exit codes.
//!
//! - Exit code 0: Success, including a run with nothing to merge
//! - Exit code 1: Stray positional arguments, a missing build environment or
//!   a failed snapshot
//! - Exit code 2: Invalid command-line usage (handled by clap)

mod common;
use common::prelude::*;
use serial_test::serial;

/// Exit code 0 is returned for --help.
#[test]
fn test_exit_code_help() {
    let mut cmd = cargo_bin_cmd!("merge-upstream");

    cmd.arg("--help")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("--git_url"))
        .stdout(predicate::str::contains("--svn_revision"));
}

/// Exit code 0 is returned for --version.
#[test]
fn test_exit_code_version() {
    let mut cmd = cargo_bin_cmd!("merge-upstream");

    cmd.arg("--version").assert().code(0);
}

/// Positional arguments print the help text and exit 1.
#[test]
#[serial]
fn test_exit_code_positional_arguments() {
    let top = BuildTop::new();

    top.command()
        .arg("r12345")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage"));
}

/// Missing ANDROID_BUILD_TOP exits 1 before touching any repository.
#[test]
#[serial]
fn test_exit_code_missing_build_environment() {
    let mut cmd = cargo_bin_cmd!("merge-upstream");

    cmd.env_remove("ANDROID_BUILD_TOP")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "You need to run the Android envsetup.sh and lunch.",
        ));
}

/// Unknown flags are a usage error.
#[test]
fn test_exit_code_unknown_flag() {
    let mut cmd = cargo_bin_cmd!("merge-upstream");

    cmd.arg("--no-such-flag").assert().code(2);
}

/// A checkout that is not a git repository fails the snapshot with exit 1.
#[test]
#[serial]
fn test_exit_code_snapshot_failure() {
    let top = BuildTop::new();
    std::fs::create_dir_all(top.repository_root()).unwrap();

    top.command()
        .arg("--git_url")
        .arg(top.scratch("missing").display().to_string())
        .arg("--log-level")
        .arg("error")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Snapshot of"));
}

/// --repository-root overrides the location derived from ANDROID_BUILD_TOP.
#[test]
#[serial]
fn test_repository_root_override_is_used() {
    let top = BuildTop::new();
    let elsewhere = assert_fs::TempDir::new().unwrap();

    top.command()
        .arg("--repository-root")
        .arg(elsewhere.path())
        .arg("--log-level")
        .arg("error")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(elsewhere.path().display().to_string()));
}
