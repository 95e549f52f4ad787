//! Orchestration of a whole migration run.

use crate::bitbucket::{BitbucketLister, RepositoryLister};
use crate::command::{CommandRunner, ProcessRunner};
use crate::error::Result;
use crate::github::{GitHubCreator, RepositoryCreator};
use crate::pipeline::TransferPipeline;
use crate::progress::{MigrationPhase, MigrationProgress};
use crate::types::{MigrationConfig, MigrationMode, MigrationReport, RepoNames};
use crate::upload::Uploader;

use tracing::{info, warn};

/// Runs a migration from Bitbucket Mercurial to GitHub Git.
///
/// The run is strictly sequential and fail-fast: the first failing API call or
/// external command ends it, and repositories not reached yet are left alone.
/// Nothing records which repositories completed; re-running after a failure
/// starts from scratch and trips over what the previous run left behind
/// (existing GitHub repositories, existing staging directories).
pub struct Migrator {
    config: MigrationConfig,
    lister: Box<dyn RepositoryLister>,
    creator: Box<dyn RepositoryCreator>,
    runner: Box<dyn CommandRunner>,
    progress: MigrationProgress,
}

impl Migrator {
    /// Create a migrator talking to Bitbucket and GitHub and running the real
    /// `hg` and `git` clients.
    pub fn new(config: MigrationConfig) -> Result<Self> {
        let lister = BitbucketLister::new(
            &config.bitbucket_api,
            &config.bitbucket_username,
            &config.bitbucket_app_password,
        )?;
        let creator = GitHubCreator::new(&config.github_api, &config.github_token)?;

        Ok(Self {
            config,
            lister: Box::new(lister),
            creator: Box::new(creator),
            runner: Box::new(ProcessRunner::new()),
            progress: MigrationProgress::new(),
        })
    }

    /// Replace the repository lister.
    pub fn with_lister(mut self, lister: impl RepositoryLister + 'static) -> Self {
        self.lister = Box::new(lister);
        self
    }

    /// Replace the repository creator.
    pub fn with_creator(mut self, creator: impl RepositoryCreator + 'static) -> Self {
        self.creator = Box::new(creator);
        self
    }

    /// Replace the external command runner.
    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Set a progress tracker.
    pub fn with_progress(mut self, progress: MigrationProgress) -> Self {
        self.progress = progress;
        self
    }

    /// The run configuration.
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Run the migration in `mode`.
    pub async fn run(&self, mode: MigrationMode) -> Result<MigrationReport> {
        self.config.validate(mode)?;
        let mut report = MigrationReport::new(mode);

        info!(
            mode = %mode,
            account = %self.config.bitbucket_username,
            scope = ?self.config.scope,
            "Starting migration"
        );

        self.progress.set_phase(MigrationPhase::Listing, 1);
        let names = self
            .lister
            .list_repositories(&self.config.bitbucket_username)
            .await?;
        report.enumerated = names.len();

        let selected = self.config.scope.apply(names);
        if selected.is_empty() {
            warn!("No Mercurial repositories found");
            self.progress.message("No Mercurial repositories found");
        }

        self.progress
            .set_phase(MigrationPhase::Deriving, selected.len() as u64);
        let batch = RepoNames::derive_batch(&selected, &self.config.git_suffix, mode)?;
        report.selected = selected;

        match mode {
            MigrationMode::CreateRemotes => {
                report.created = self.create_remotes(&batch).await?;
            }
            MigrationMode::PushRepositories => {
                report.converted = self.transfer_all(&batch)?;
                let destinations: Vec<String> =
                    batch.iter().map(|names| names.destination.clone()).collect();
                report.pushed = self.uploader().push_all(&destinations)?;
            }
        }

        self.progress.set_phase(MigrationPhase::Complete, 1);
        report.complete();

        Ok(report)
    }

    /// Create one private GitHub repository per destination name.
    async fn create_remotes(&self, batch: &[RepoNames]) -> Result<Vec<String>> {
        self.progress
            .set_phase(MigrationPhase::CreatingRemotes, batch.len() as u64);

        let mut created = Vec::with_capacity(batch.len());
        for names in batch {
            let full_name = self
                .creator
                .create_repository(&names.destination, true)
                .await?;
            println!("\n==> Created Github repo: {full_name}");

            self.progress.increment(Some(&names.destination));
            created.push(full_name);
        }

        Ok(created)
    }

    /// Convert every repository of the batch, one after the other.
    fn transfer_all(&self, batch: &[RepoNames]) -> Result<Vec<String>> {
        let pipeline = TransferPipeline::new(
            self.runner.as_ref(),
            &self.progress,
            &self.config.staging_dir,
            &self.config.bitbucket_host,
            &self.config.bitbucket_username,
        );
        pipeline.prepare()?;

        self.progress
            .set_phase(MigrationPhase::Cloning, batch.len() as u64);

        let mut converted = Vec::with_capacity(batch.len());
        for names in batch {
            pipeline.transfer(names)?;
            self.progress.increment(Some(&names.destination));
            converted.push(names.destination.clone());
        }

        Ok(converted)
    }

    fn uploader(&self) -> Uploader<'_> {
        Uploader::new(
            self.runner.as_ref(),
            &self.progress,
            &self.config.staging_dir,
            &self.config.github_host,
            &self.config.github_username,
        )
    }
}
