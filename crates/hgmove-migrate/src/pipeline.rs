//! Mercurial to Git transfer pipeline.
//!
//! For each repository, inside the staging directory:
//!
//! 1. `hg clone` the Bitbucket repository into `<staging>/<source>`
//! 2. `git init --bare <bridge>`
//! 3. `hg bookmarks hg` and `hg push ../<bridge>` from the clone (hg-git)
//! 4. `git clone <bridge> <destination>`
//! 5. `git checkout -b master origin/hg` in the working copy
//!
//! There is no rollback. A failing step returns its error and leaves the
//! staging directory as it is.

use crate::command::{CommandRunner, ExternalCommand};
use crate::error::Result;
use crate::progress::{MigrationPhase, MigrationProgress};
use crate::types::{RepoNames, BRIDGE_BOOKMARK, PRIMARY_BRANCH};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Converts Bitbucket Mercurial repositories into local Git working copies.
pub struct TransferPipeline<'a> {
    runner: &'a dyn CommandRunner,
    progress: &'a MigrationProgress,
    staging_dir: PathBuf,
    bitbucket_host: String,
    account: String,
}

impl<'a> TransferPipeline<'a> {
    /// Create a pipeline staging repositories of `account` on `bitbucket_host`
    /// under `staging_dir`.
    pub fn new(
        runner: &'a dyn CommandRunner,
        progress: &'a MigrationProgress,
        staging_dir: impl Into<PathBuf>,
        bitbucket_host: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            progress,
            staging_dir: staging_dir.into(),
            bitbucket_host: bitbucket_host.into(),
            account: account.into(),
        }
    }

    /// The staging root.
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Directory of the Mercurial clone.
    pub fn source_dir(&self, names: &RepoNames) -> PathBuf {
        self.staging_dir.join(&names.source)
    }

    /// Directory of the bare Git bridge.
    pub fn bridge_dir(&self, names: &RepoNames) -> PathBuf {
        self.staging_dir.join(&names.bridge)
    }

    /// Directory of the Git working copy.
    pub fn working_dir(&self, names: &RepoNames) -> PathBuf {
        self.staging_dir.join(&names.destination)
    }

    /// Create the staging root if it does not exist.
    pub fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.staging_dir)?;
        debug!(path = %self.staging_dir.display(), "Staging directory ready");
        Ok(())
    }

    /// Run all five steps for one repository and return the working copy path.
    pub fn transfer(&self, names: &RepoNames) -> Result<PathBuf> {
        info!(source = %names.source, destination = %names.destination, "Transferring repository");

        self.clone_source(names)?;
        self.init_bridge(names)?;
        self.push_to_bridge(names)?;
        self.clone_bridge(names)?;
        self.checkout_primary(names)?;

        Ok(self.working_dir(names))
    }

    /// Clone the Mercurial repository over SSH.
    pub fn clone_source(&self, names: &RepoNames) -> Result<()> {
        self.progress.set_step(MigrationPhase::Cloning, &names.source);

        let url = format!(
            "ssh://hg@{}/{}/{}",
            self.bitbucket_host, self.account, names.source
        );
        let command = ExternalCommand::hg(&self.staging_dir)
            .args(["clone", url.as_str()])
            .arg(&names.source);
        self.runner.run(&command)
    }

    /// Initialize the bare bridge repository.
    pub fn init_bridge(&self, names: &RepoNames) -> Result<()> {
        self.progress.set_step(MigrationPhase::Bridging, &names.source);

        let command = ExternalCommand::git(&self.staging_dir)
            .args(["init", "--bare"])
            .arg(&names.bridge);
        self.runner.run(&command)
    }

    /// Bookmark the tip and push the Mercurial history into the bridge.
    pub fn push_to_bridge(&self, names: &RepoNames) -> Result<()> {
        let source_dir = self.source_dir(names);

        let bookmark = ExternalCommand::hg(&source_dir).args(["bookmarks", BRIDGE_BOOKMARK]);
        self.runner.run(&bookmark)?;

        let push = ExternalCommand::hg(&source_dir)
            .arg("push")
            .arg(format!("../{}", names.bridge));
        self.runner.run(&push)
    }

    /// Clone the bridge into the working copy.
    pub fn clone_bridge(&self, names: &RepoNames) -> Result<()> {
        self.progress
            .set_step(MigrationPhase::CloningBridge, &names.destination);

        let command = ExternalCommand::git(&self.staging_dir)
            .arg("clone")
            .arg(&names.bridge)
            .arg(&names.destination);
        self.runner.run(&command)
    }

    /// Create the primary branch from the bookmark's remote branch.
    pub fn checkout_primary(&self, names: &RepoNames) -> Result<()> {
        self.progress
            .set_step(MigrationPhase::Branching, &names.destination);

        let command = ExternalCommand::git(self.working_dir(names))
            .args(["checkout", "-b", PRIMARY_BRANCH])
            .arg(format!("origin/{BRIDGE_BOOKMARK}"));
        self.runner.run(&command)
    }
}
