//! Pushing converted working copies to GitHub.

use crate::command::{CommandRunner, ExternalCommand};
use crate::error::Result;
use crate::progress::{MigrationPhase, MigrationProgress};
use crate::types::{GITHUB_REMOTE, PRIMARY_BRANCH};

use std::path::{Path, PathBuf};
use tracing::info;

/// Pushes working copies under the staging directory to GitHub over SSH.
pub struct Uploader<'a> {
    runner: &'a dyn CommandRunner,
    progress: &'a MigrationProgress,
    staging_dir: PathBuf,
    github_host: String,
    github_username: String,
}

impl<'a> Uploader<'a> {
    /// Create an uploader pushing to `github_username`'s account.
    pub fn new(
        runner: &'a dyn CommandRunner,
        progress: &'a MigrationProgress,
        staging_dir: impl Into<PathBuf>,
        github_host: impl Into<String>,
        github_username: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            progress,
            staging_dir: staging_dir.into(),
            github_host: github_host.into(),
            github_username: github_username.into(),
        }
    }

    /// SSH URL of the GitHub repository `name`.
    pub fn remote_url(&self, name: &str) -> String {
        format!(
            "git@{}:{}/{name}.git",
            self.github_host, self.github_username
        )
    }

    /// Push every working copy in order, stopping at the first failure.
    pub fn push_all(&self, destinations: &[String]) -> Result<Vec<String>> {
        let total = destinations.len();
        self.progress
            .set_phase(MigrationPhase::Pushing, total as u64);

        let mut pushed = Vec::with_capacity(total);
        for (index, name) in destinations.iter().enumerate() {
            println!("\n==> Pushing repo {}/{total}", index + 1);
            info!(repo = %name, index = index + 1, total, "Pushing repository");

            self.push(name)?;
            self.progress.increment(Some(name));
            pushed.push(name.clone());
        }

        Ok(pushed)
    }

    /// Register the GitHub remote in the working copy and push the primary
    /// branch with upstream tracking.
    pub fn push(&self, name: &str) -> Result<()> {
        let working_dir = self.staging_dir.join(name);

        self.add_remote(&working_dir, name)?;

        let push = ExternalCommand::git(&working_dir).args([
            "push",
            "-u",
            GITHUB_REMOTE,
            PRIMARY_BRANCH,
        ]);
        self.runner.run(&push)
    }

    fn add_remote(&self, working_dir: &Path, name: &str) -> Result<()> {
        let command = ExternalCommand::git(working_dir)
            .args(["remote", "add", GITHUB_REMOTE])
            .arg(self.remote_url(name));
        self.runner.run(&command)
    }
}
