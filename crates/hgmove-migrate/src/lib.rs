//! # hgmove migration library
//!
//! Moves Mercurial repositories hosted on Bitbucket to Git repositories on
//! GitHub.
//!
//! ## Flow
//!
//! - **Listing**: page through the Bitbucket repositories of an account and
//!   keep the Mercurial ones
//! - **Deriving**: give every repository a Git name (`<name><suffix>`) and a
//!   bridge name (`<name><suffix>_bare`)
//! - **Creating**: create one private GitHub repository per Git name, or
//! - **Transferring**: clone with `hg`, push into a bare Git bridge through
//!   hg-git, clone the bridge and check out `master`, then push every working
//!   copy to GitHub
//!
//! ## Example
//!
//! ```rust,ignore
//! use hgmove_migrate::{MigrationConfig, MigrationMode, Migrator, RunScope};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = MigrationConfig::new("bb_user", "bb_app_password", "gh_user", "gh_token")
//!         .with_staging_dir("tmp")
//!         .with_scope(RunScope::All);
//!
//!     let migrator = Migrator::new(config)?;
//!     migrator.run(MigrationMode::CreateRemotes).await?.print_summary();
//!     migrator.run(MigrationMode::PushRepositories).await?.print_summary();
//!     Ok(())
//! }
//! ```

pub mod bitbucket;
pub mod client;
pub mod command;
pub mod error;
pub mod github;
pub mod migrator;
pub mod pipeline;
pub mod progress;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;
pub mod upload;

// Re-export main types
pub use bitbucket::{BitbucketLister, RepositoryLister};
pub use command::{CommandRunner, ExternalCommand, ProcessRunner};
pub use error::{MigrationError, Result};
pub use github::{GitHubCreator, RepositoryCreator};
pub use migrator::Migrator;
pub use pipeline::TransferPipeline;
pub use progress::{MigrationPhase, MigrationProgress, ProgressCallback, ProgressUpdate};
pub use types::*;
pub use upload::Uploader;

/// Version of the migration tools.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
