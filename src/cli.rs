//! CLI argument parsing and run dispatch

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use merge_upstream::config::{SnapshotConfig, DEFAULT_GIT_BRANCH, DEFAULT_GIT_URL};
use merge_upstream::defaults;
use merge_upstream::licenses::ScriptLicenseTool;
use merge_upstream::output::{self, OutputConfig};
use merge_upstream::prompt::TerminalPrompt;
use merge_upstream::regen::GypGenerator;
use merge_upstream::repository::GitCli;
use merge_upstream::snapshot::Snapshot;

/// Takes a snapshot of the Chromium tree at the specified Chromium SVN
/// revision and merges it into this repository. Paths marked as excluded for
/// license reasons are removed as part of the merge. Also generates Android
/// makefiles and a top-level NOTICE file suitable for use in the Android
/// build.
#[derive(Parser, Debug)]
#[command(name = "merge-upstream")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// The URL of the git server for the Chromium branch to merge
    #[arg(long = "git_url", value_name = "URL", default_value = DEFAULT_GIT_URL)]
    git_url: String,

    /// The name of the upstream branch to merge
    #[arg(long = "git_branch", value_name = "BRANCH", default_value = DEFAULT_GIT_BRANCH)]
    git_branch: String,

    /// The SVN revision in the Chromium repository to merge from; defaults to
    /// the latest
    #[arg(long = "svn_revision", value_name = "REV")]
    svn_revision: Option<String>,

    /// Checkout to merge into (defaults to $ANDROID_BUILD_TOP/external/chromium_org)
    #[arg(long, value_name = "PATH", env = "MERGE_UPSTREAM_ROOT")]
    repository_root: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Positional arguments are not accepted
    #[arg(hide = true)]
    unexpected: Vec<String>,
}

impl Cli {
    /// Run a snapshot with the parsed arguments.
    pub fn execute(self) -> Result<ExitCode> {
        if !self.unexpected.is_empty() {
            Self::command().print_help()?;
            return Ok(ExitCode::FAILURE);
        }

        let Some(build_top) = defaults::build_top() else {
            eprintln!("You need to run the Android envsetup.sh and lunch.");
            return Ok(ExitCode::FAILURE);
        };

        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);
        output.apply();

        let repository_root = self
            .repository_root
            .unwrap_or_else(|| defaults::default_repository_root(&build_top));
        let config = SnapshotConfig::new(
            self.git_url,
            self.git_branch,
            self.svn_revision,
            repository_root,
        );

        let tools = ScriptLicenseTool::new(&config.repository_root);
        let snapshot = Snapshot {
            repo: &GitCli,
            prompt: &TerminalPrompt,
            scanner: &tools,
            notices: &tools,
            build_files: &GypGenerator,
            config: &config,
        };
        let outcome = snapshot.run().with_context(|| {
            format!(
                "Snapshot of {} into {} failed",
                config.git_url,
                config.repository_root.display()
            )
        })?;

        for line in output::summary(&output, &outcome) {
            println!("{}", line);
        }
        Ok(ExitCode::SUCCESS)
    }
}

/// `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
