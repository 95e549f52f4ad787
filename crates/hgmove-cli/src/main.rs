//! hgmove CLI - move Bitbucket Mercurial repositories to GitHub.

use clap::Parser;
use hgmove_migrate::{
    MigrationConfig, MigrationMode, RunScope, BITBUCKET_API_ROOT, DEFAULT_GIT_SUFFIX,
    GITHUB_API_ROOT,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod progress;

/// Move Bitbucket Hg repositories to GitHub.
///
/// Run once with --create_gh_repos to create the GitHub repositories, then
/// with --push_gh_repos to convert and push them. Without --do_it only the
/// first repository is processed.
#[derive(Parser, Debug)]
#[command(name = "hgmove")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Create GitHub repos for Bitbucket Hg repos
    #[arg(long = "create_gh_repos")]
    create_gh_repos: bool,

    /// Push Bitbucket Hg repos to GitHub repos
    #[arg(long = "push_gh_repos")]
    push_gh_repos: bool,

    /// Bitbucket username
    #[arg(long = "bb_username")]
    bb_username: String,

    /// Bitbucket app password
    #[arg(long = "bb_app_password")]
    bb_app_password: String,

    /// GitHub username
    #[arg(long = "gh_username")]
    gh_username: String,

    /// GitHub access token
    #[arg(long = "gh_access_token")]
    gh_access_token: String,

    /// Suffix for Git repo names
    #[arg(long = "git_suffix", default_value = DEFAULT_GIT_SUFFIX)]
    git_suffix: String,

    /// Dir to use for repo work
    #[arg(long = "tmp_dir", default_value = "tmp")]
    tmp_dir: PathBuf,

    /// Use when you really want to convert all repos
    #[arg(long = "do_it")]
    do_it: bool,

    /// Bitbucket API root
    #[arg(long = "bb_api_url", default_value = BITBUCKET_API_ROOT)]
    bb_api_url: String,

    /// GitHub API root
    #[arg(long = "gh_api_url", default_value = GITHUB_API_ROOT)]
    gh_api_url: String,

    /// Bitbucket SSH host for hg clones
    #[arg(long = "bb_host", default_value = "bitbucket.org")]
    bb_host: String,

    /// GitHub SSH host for git pushes
    #[arg(long = "gh_host", default_value = "github.com")]
    gh_host: String,
}

impl Cli {
    fn mode(&self) -> Option<MigrationMode> {
        MigrationMode::from_flags(self.create_gh_repos, self.push_gh_repos)
    }

    fn config(&self) -> MigrationConfig {
        let scope = if self.do_it {
            RunScope::All
        } else {
            RunScope::FirstOnly
        };

        MigrationConfig::new(
            &self.bb_username,
            &self.bb_app_password,
            &self.gh_username,
            &self.gh_access_token,
        )
        .with_suffix(&self.git_suffix)
        .with_staging_dir(&self.tmp_dir)
        .with_scope(scope)
        .with_bitbucket_api(&self.bb_api_url)
        .with_github_api(&self.gh_api_url)
        .with_bitbucket_host(&self.bb_host)
        .with_github_host(&self.gh_host)
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hgmove={log_level},hgmove_migrate={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.create_gh_repos && cli.push_gh_repos {
        tracing::warn!("Both --create_gh_repos and --push_gh_repos given; only creating repos");
    }

    if let Err(e) = commands::migrate(cli.mode(), cli.config()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
