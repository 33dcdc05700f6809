//! End-to-end snapshot runs against real git repositories.
//!
//! Each test builds a small upstream tree with a dependency manifest, one
//! sub-project, and downstream checkouts cloned from them with `goog` as the
//! remote name. Collaborators that would need the downstream build
//! environment (license script, gyp) are replaced by in-test doubles.
//!
//! Run with:
//! ```bash
//! cargo test --features integration-tests --test integration_snapshot
//! ```

mod common;
use common::prelude::*;

use std::path::Path;

use merge_upstream::config::SnapshotConfig;
use merge_upstream::error::Result;
use merge_upstream::git::StatusEntry;
use merge_upstream::licenses::{ExclusionSet, LicenseScanner, NoticeGenerator};
use merge_upstream::merge::MergeOutcome;
use merge_upstream::prompt::ConflictPrompt;
use merge_upstream::regen::BuildFileGenerator;
use merge_upstream::repository::GitCli;
use merge_upstream::snapshot::{Snapshot, SnapshotOutcome};

struct NoPrompt;

impl ConflictPrompt for NoPrompt {
    fn resolve(&self, conflicts: &[StatusEntry], _default: &str) -> Result<Option<String>> {
        panic!("unexpected prompt for {:?}", conflicts);
    }
}

struct Tools;

impl LicenseScanner for Tools {
    fn known_incompatible(&self) -> Result<ExclusionSet> {
        ExclusionSet::from_yaml(".:\n  - third_party/proprietary\n")
    }

    fn incompatible_directories(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}

impl NoticeGenerator for Tools {
    fn generate_notice(&self) -> Result<String> {
        Ok("Copyright notices\n".to_string())
    }
}

impl BuildFileGenerator for Tools {
    fn generate(&self, root: &Path) -> Result<()> {
        std::fs::write(root.join("GypAndroid.mk"), "include $(CLEAR_VARS)\n")?;
        std::fs::write(root.join("third_party/icu/icu.target.mk"), "# icu\n")?;
        Ok(())
    }
}

struct Fixture {
    top: BuildTop,
    upstream: GitRepo,
    icu_upstream: GitRepo,
    root: GitRepo,
    icu: GitRepo,
}

impl Fixture {
    /// Upstream at r100 and r101; downstream branched from r100 with its own
    /// commit on top, in both the root tree and the sub-project.
    fn new() -> Self {
        let top = BuildTop::new();

        let icu_upstream = GitRepo::init(top.scratch("icu"), "master");
        icu_upstream.commit_file("source/common/uchar.c", "v1\n", "Initial icu");
        icu_upstream.commit_file("data/old.txt", "old\n", "Add data");
        icu_upstream.switch("master-chromium", true);
        icu_upstream.commit_file("Android.mk", "# downstream\n", "Add Android.mk");
        icu_upstream.switch("master", false);
        let icu_sha = icu_upstream.commit_file("source/common/uchar.c", "v2\n", "Update icu");

        let upstream = GitRepo::init(top.scratch("src"), "git-svn");
        upstream.commit_file(
            "base/a.cc",
            "int a;\n",
            "Initial\n\ngit-svn-id: svn://svn/src@100 0039d316",
        );
        upstream.switch("master-chromium", true);
        upstream.commit_file("android_webview/README", "webview\n", "Add webview");
        upstream.switch("git-svn", false);
        upstream.commit_file("third_party/proprietary/blob.jar", "\0\0", "Add blob");
        upstream.commit_file(
            ".DEPS.git",
            &format!(
                "vars = {{\n  'icu_url': '{}',\n}}\n\
                 deps = {{\n  'src/third_party/icu': Var('icu_url') + '@{}',\n}}\n",
                icu_upstream.path.display(),
                icu_sha
            ),
            "Roll icu\n\ngit-svn-id: svn://svn/src@101 0039d316",
        );

        let root = GitRepo::clone_from(&upstream, top.repository_root(), "goog", "master-chromium");
        let icu = GitRepo::clone_from(
            &icu_upstream,
            top.repository_root().join("third_party/icu"),
            "goog",
            "master-chromium",
        );

        Self {
            top,
            upstream,
            icu_upstream,
            root,
            icu,
        }
    }

    fn config(&self, svn_revision: Option<&str>) -> SnapshotConfig {
        let mut config = SnapshotConfig::new(
            self.upstream.path.display().to_string(),
            "git-svn",
            svn_revision.map(str::to_string),
            self.top.repository_root(),
        );
        config.projects = vec!["third_party/icu".to_string()];
        config
    }
}

fn run(config: &SnapshotConfig, prompt: &dyn ConflictPrompt) -> Result<SnapshotOutcome> {
    Snapshot {
        repo: &GitCli,
        prompt,
        scanner: &Tools,
        notices: &Tools,
        build_files: &Tools,
        config,
    }
    .run()
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_snapshot_merges_excludes_and_regenerates() {
    let fixture = Fixture::new();
    let config = fixture.config(None);

    let outcome = run(&config, &NoPrompt).unwrap();

    let SnapshotOutcome::Merged { target, projects } = &outcome else {
        panic!("expected a merge, got {:?}", outcome);
    };
    assert_eq!(target.svn_revision, "101");
    assert_eq!(target.sha1, fixture.upstream.head());
    assert_eq!(
        projects,
        &vec![
            ("third_party/icu".to_string(), MergeOutcome::MergedClean),
            (".".to_string(), MergeOutcome::MergedClean),
        ]
    );

    let root_files = fixture.root.tracked_files();
    assert!(root_files.contains(&"base/a.cc".to_string()));
    assert!(root_files.contains(&"NOTICE".to_string()));
    assert!(root_files.contains(&"GypAndroid.mk".to_string()));
    assert!(!root_files.iter().any(|f| f.starts_with("third_party/proprietary")));

    let subjects = fixture.root.subjects();
    assert_eq!(subjects[0], "Update makefiles after merge of Chromium at r101");
    assert_eq!(subjects[1], "Update NOTICE file after merge of Chromium at r101");
    assert_eq!(subjects[2], "Exclude incompatible directories");
    assert!(subjects[3].starts_with("Merge Chromium from "));
    assert!(subjects[3].ends_with(&format!("at r101 ({})", target.sha1)));

    let icu_subjects = fixture.icu.subjects();
    assert_eq!(icu_subjects[0], "Update makefiles after merge of Chromium at r101");
    assert_eq!(
        icu_subjects[1],
        format!(
            "Merge third_party/icu from {} at {}",
            fixture.icu_upstream.path.display(),
            fixture.icu_upstream.head()
        )
    );
    assert!(fixture.icu.tracked_files().contains(&"icu.target.mk".to_string()));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_second_run_is_up_to_date() {
    let fixture = Fixture::new();
    let config = fixture.config(None);
    run(&config, &NoPrompt).unwrap();
    let head = fixture.root.head();

    let outcome = run(&config, &NoPrompt).unwrap();

    assert!(matches!(outcome, SnapshotOutcome::UpToDate(_)));
    assert_eq!(fixture.root.head(), head);
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_revision_already_merged_is_a_no_op() {
    let fixture = Fixture::new();
    let head = fixture.root.head();

    let outcome = run(&fixture.config(Some("100")), &NoPrompt).unwrap();

    match outcome {
        SnapshotOutcome::UpToDate(target) => assert_eq!(target.svn_revision, "100"),
        other => panic!("expected no-op, got {:?}", other),
    }
    assert_eq!(fixture.root.head(), head);
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_unknown_revision_fails() {
    let fixture = Fixture::new();

    let err = run(&fixture.config(Some("99999")), &NoPrompt).unwrap_err();

    assert!(err.to_string().contains("99999"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_locally_deleted_file_stays_deleted() {
    let fixture = Fixture::new();
    // Downstream drops a file that upstream then modifies: a DU conflict.
    fixture.icu.remove_file("data/old.txt", "Drop unused data");
    git(&fixture.icu.path, &["push", "-q", "goog", "master-chromium"]);
    fixture.icu_upstream.switch("master", false);
    fixture
        .icu_upstream
        .commit_file("data/old.txt", "changed\n", "Change data");
    let icu_sha = fixture.icu_upstream.head();
    fixture.upstream.commit_file(
        ".DEPS.git",
        &format!(
            "deps = {{'src/third_party/icu': '{}@{}'}}\n",
            fixture.icu_upstream.path.display(),
            icu_sha
        ),
        "Roll icu again\n\ngit-svn-id: svn://svn/src@102 0039d316",
    );

    let outcome = run(&fixture.config(None), &NoPrompt).unwrap();

    let SnapshotOutcome::Merged { projects, .. } = outcome else {
        panic!("expected a merge");
    };
    assert_eq!(projects[0].1, MergeOutcome::MergedWithConflictsResolved);
    assert!(!fixture.icu.tracked_files().contains(&"data/old.txt".to_string()));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_project_without_local_commits_gets_a_merge_commit() {
    let fixture = Fixture::new();
    // Upstream master moves to a descendant of the downstream branch, so the
    // merge branch is an ancestor of the target and git could fast-forward.
    fixture.icu_upstream.switch("master-chromium", false);
    let icu_sha = fixture
        .icu_upstream
        .commit_file("source/common/ubidi.c", "bidi\n", "Add ubidi");
    git(&fixture.icu_upstream.path, &["checkout", "-q", "-B", "master"]);
    fixture.upstream.commit_file(
        ".DEPS.git",
        &format!(
            "deps = {{'src/third_party/icu': '{}@{}'}}\n",
            fixture.icu_upstream.path.display(),
            icu_sha
        ),
        "Roll icu to a mirror commit\n\ngit-svn-id: svn://svn/src@102 0039d316",
    );

    let outcome = run(&fixture.config(None), &NoPrompt).unwrap();

    let SnapshotOutcome::Merged { projects, .. } = outcome else {
        panic!("expected a merge");
    };
    assert_eq!(projects[0].1, MergeOutcome::MergedClean);
    let icu_subjects = fixture.icu.subjects();
    assert_eq!(
        icu_subjects[1],
        format!(
            "Merge third_party/icu from {} at {}",
            fixture.icu_upstream.path.display(),
            icu_sha
        )
    );
    assert!(fixture
        .icu
        .tracked_files()
        .contains(&"source/common/ubidi.c".to_string()));
    let parents = git(&fixture.icu.path, &["rev-list", "--parents", "-n1", "HEAD~1"]);
    assert_eq!(parents.split_whitespace().count(), 3);
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_explicit_revision_does_not_match_longer_revisions() {
    let fixture = Fixture::new();
    fixture.upstream.commit_file(
        "base/b.cc",
        "int b;\n",
        "Add b\n\ngit-svn-id: svn://svn/src@1010 0039d316",
    );

    let outcome = run(&fixture.config(Some("101")), &NoPrompt).unwrap();

    let SnapshotOutcome::Merged { target, .. } = outcome else {
        panic!("expected a merge");
    };
    assert_eq!(target.svn_revision, "101");
    assert_eq!(target.sha1, git(&fixture.upstream.path, &["rev-parse", "HEAD~1"]));
}
