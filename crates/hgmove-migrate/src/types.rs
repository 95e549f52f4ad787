//! Common types for migration operations.

use crate::error::{MigrationError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Default Bitbucket REST API root.
pub const BITBUCKET_API_ROOT: &str = "https://api.bitbucket.org/2.0";

/// Default GitHub REST API root.
pub const GITHUB_API_ROOT: &str = "https://api.github.com";

/// Default suffix appended to every Git repository name.
pub const DEFAULT_GIT_SUFFIX: &str = "_PRIVATE";

/// Suffix marking the bare bridge repository.
pub const BRIDGE_SUFFIX: &str = "_bare";

/// Value of the Bitbucket `scm` field for Mercurial repositories.
pub const HG_SCM: &str = "hg";

/// Bookmark set in the Mercurial clone; becomes `origin/hg` in the Git clone.
pub const BRIDGE_BOOKMARK: &str = "hg";

/// Branch checked out in the working copy and pushed to GitHub.
pub const PRIMARY_BRANCH: &str = "master";

/// Name of the remote pointing at GitHub.
pub const GITHUB_REMOTE: &str = "gh_origin";

/// Derive a Git repository name from a Mercurial repository name.
///
/// `derive_name("alpha", "_PRIVATE", false)` is `alpha_PRIVATE`, and with
/// `is_bridge` set it is `alpha_PRIVATE_bare`. No validation is done against
/// either host's naming rules.
pub fn derive_name(name: &str, suffix: &str, is_bridge: bool) -> String {
    let bridge = if is_bridge { BRIDGE_SUFFIX } else { "" };
    format!("{name}{suffix}{bridge}")
}

/// The three names a single source repository goes by during migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoNames {
    /// Mercurial repository name on Bitbucket, also the clone directory.
    pub source: String,

    /// Git repository name on GitHub, also the working copy directory.
    pub destination: String,

    /// Bare Git repository the Mercurial history is pushed into.
    pub bridge: String,
}

impl RepoNames {
    /// Derive the name triple for `source`.
    pub fn derive(source: impl Into<String>, suffix: &str) -> Self {
        let source = source.into();
        Self {
            destination: derive_name(&source, suffix, false),
            bridge: derive_name(&source, suffix, true),
            source,
        }
    }

    /// Derive the triples for a whole batch, rejecting any name that `mode`
    /// would use twice.
    ///
    /// Creation only touches GitHub, so only destination names must differ.
    /// Pushing also uses every name as a staging directory, so the whole triple
    /// is checked (e.g. `foo` with suffix `_PRIVATE` next to an existing
    /// `foo_PRIVATE`). Names are compared ignoring case, the way GitHub and
    /// case-insensitive filesystems do.
    pub fn derive_batch(
        sources: &[String],
        suffix: &str,
        mode: MigrationMode,
    ) -> Result<Vec<Self>> {
        let batch: Vec<Self> = sources
            .iter()
            .map(|source| Self::derive(source.as_str(), suffix))
            .collect();

        {
            let mut seen: HashMap<String, &str> = HashMap::new();
            for names in &batch {
                let used = match mode {
                    MigrationMode::CreateRemotes => vec![&names.destination],
                    MigrationMode::PushRepositories => {
                        vec![&names.source, &names.destination, &names.bridge]
                    }
                };
                for name in used {
                    if let Some(owner) = seen.insert(name.to_lowercase(), names.source.as_str()) {
                        return Err(MigrationError::InvalidConfig(format!(
                            "Name collision: `{name}` is derived from both `{owner}` and `{}`",
                            names.source
                        )));
                    }
                }
            }
        }

        Ok(batch)
    }
}

/// What a run does with the enumerated repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationMode {
    /// Create one private GitHub repository per destination name.
    CreateRemotes,
    /// Clone, convert, and push every repository to GitHub.
    PushRepositories,
}

impl MigrationMode {
    /// Resolve the command-line mode flags.
    ///
    /// Creation wins when both flags are given. Returns `None` when neither is.
    pub fn from_flags(create: bool, push: bool) -> Option<Self> {
        if create {
            Some(Self::CreateRemotes)
        } else if push {
            Some(Self::PushRepositories)
        } else {
            None
        }
    }
}

impl std::fmt::Display for MigrationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateRemotes => write!(f, "create GitHub repositories"),
            Self::PushRepositories => write!(f, "push repositories to GitHub"),
        }
    }
}

/// How many of the enumerated repositories a run acts on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunScope {
    /// Only the first enumerated repository. Used for trial runs.
    #[default]
    FirstOnly,
    /// Every enumerated repository.
    All,
}

impl RunScope {
    /// Select the repositories this scope covers, preserving order.
    pub fn apply(self, mut names: Vec<String>) -> Vec<String> {
        if self == Self::FirstOnly {
            names.truncate(1);
        }
        names
    }
}

/// Configuration for a migration run.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Bitbucket account whose repositories are listed and cloned.
    pub bitbucket_username: String,

    /// Bitbucket app password.
    pub bitbucket_app_password: String,

    /// GitHub account the repositories are pushed to.
    pub github_username: String,

    /// GitHub personal access token.
    pub github_token: String,

    /// Suffix appended to Git repository names.
    pub git_suffix: String,

    /// Directory holding the clones, bridges and working copies.
    pub staging_dir: PathBuf,

    /// Dry-run throttle.
    pub scope: RunScope,

    /// Bitbucket REST API root.
    pub bitbucket_api: String,

    /// GitHub REST API root.
    pub github_api: String,

    /// Host used in `ssh://hg@<host>/...` clone URLs.
    pub bitbucket_host: String,

    /// Host used in `git@<host>:...` push URLs.
    pub github_host: String,
}

impl MigrationConfig {
    /// Create a new migration configuration with default suffix, staging
    /// directory, scope and endpoints.
    pub fn new(
        bitbucket_username: impl Into<String>,
        bitbucket_app_password: impl Into<String>,
        github_username: impl Into<String>,
        github_token: impl Into<String>,
    ) -> Self {
        Self {
            bitbucket_username: bitbucket_username.into(),
            bitbucket_app_password: bitbucket_app_password.into(),
            github_username: github_username.into(),
            github_token: github_token.into(),
            git_suffix: DEFAULT_GIT_SUFFIX.to_string(),
            staging_dir: PathBuf::from("tmp"),
            scope: RunScope::default(),
            bitbucket_api: BITBUCKET_API_ROOT.to_string(),
            github_api: GITHUB_API_ROOT.to_string(),
            bitbucket_host: "bitbucket.org".to_string(),
            github_host: "github.com".to_string(),
        }
    }

    /// Set the Git repository name suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.git_suffix = suffix.into();
        self
    }

    /// Set the staging directory.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Set the run scope.
    pub fn with_scope(mut self, scope: RunScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the Bitbucket API root.
    pub fn with_bitbucket_api(mut self, url: impl Into<String>) -> Self {
        self.bitbucket_api = url.into();
        self
    }

    /// Set the GitHub API root.
    pub fn with_github_api(mut self, url: impl Into<String>) -> Self {
        self.github_api = url.into();
        self
    }

    /// Set the Bitbucket SSH host.
    pub fn with_bitbucket_host(mut self, host: impl Into<String>) -> Self {
        self.bitbucket_host = host.into();
        self
    }

    /// Set the GitHub SSH host.
    pub fn with_github_host(mut self, host: impl Into<String>) -> Self {
        self.github_host = host.into();
        self
    }

    /// Check the configuration for `mode`.
    pub fn validate(&self, mode: MigrationMode) -> Result<()> {
        let required = [
            ("bb_username", &self.bitbucket_username),
            ("bb_app_password", &self.bitbucket_app_password),
            ("gh_username", &self.github_username),
            ("gh_access_token", &self.github_token),
        ];
        for (flag, value) in required {
            if value.trim().is_empty() {
                return Err(MigrationError::InvalidConfig(format!(
                    "`{flag}` must not be empty"
                )));
            }
        }

        for (flag, value) in [
            ("bb_api_url", &self.bitbucket_api),
            ("gh_api_url", &self.github_api),
        ] {
            url::Url::parse(value).map_err(|e| {
                MigrationError::InvalidConfig(format!("`{flag}` is not a valid URL ({value}): {e}"))
            })?;
        }

        // Without a suffix the working copy would land in the Mercurial clone.
        if mode == MigrationMode::PushRepositories && self.git_suffix.is_empty() {
            return Err(MigrationError::InvalidConfig(
                "`git_suffix` must not be empty when pushing repositories".to_string(),
            ));
        }

        Ok(())
    }
}

/// Report of a completed migration run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    /// What the run did.
    pub mode: MigrationMode,

    /// Mercurial repositories enumerated on Bitbucket.
    pub enumerated: usize,

    /// Mercurial repositories selected for this run.
    pub selected: Vec<String>,

    /// Full names of the GitHub repositories created.
    pub created: Vec<String>,

    /// Git working copies produced by the transfer pipeline.
    pub converted: Vec<String>,

    /// Git repositories pushed to GitHub.
    pub pushed: Vec<String>,

    /// Start time of the run.
    pub started_at: DateTime<Utc>,

    /// End time of the run.
    pub completed_at: Option<DateTime<Utc>>,
}

impl MigrationReport {
    /// Create a new empty report.
    pub fn new(mode: MigrationMode) -> Self {
        Self {
            mode,
            enumerated: 0,
            selected: Vec::new(),
            created: Vec::new(),
            converted: Vec::new(),
            pushed: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Get the duration of the run.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }

    /// Print a summary of the run.
    pub fn print_summary(&self) {
        println!("\n=== Migration Summary ===\n");
        println!("Mode:               {}", self.mode);
        println!("Hg repositories:    {}", self.enumerated);
        println!("Selected:           {}", self.selected.len());

        match self.mode {
            MigrationMode::CreateRemotes => {
                println!("Created on GitHub:  {}", self.created.len());
                for name in &self.created {
                    println!("  - {name}");
                }
            }
            MigrationMode::PushRepositories => {
                println!("Converted to Git:   {}", self.converted.len());
                println!("Pushed to GitHub:   {}", self.pushed.len());
                for name in &self.pushed {
                    println!("  - {name}");
                }
            }
        }

        if self.selected.len() < self.enumerated {
            println!(
                "\nOnly {} of {} repositories processed. Pass --do_it to process all of them.",
                self.selected.len(),
                self.enumerated
            );
        }

        if let Some(duration) = self.duration() {
            println!("\nCompleted in {} seconds", duration.num_seconds());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_name() {
        assert_eq!(derive_name("alpha", "_PRIVATE", false), "alpha_PRIVATE");
        assert_eq!(derive_name("alpha", "_PRIVATE", true), "alpha_PRIVATE_bare");
        assert_eq!(derive_name("alpha", "", false), "alpha");
        assert_eq!(derive_name("alpha", "", true), "alpha_bare");
    }

    #[test]
    fn test_derived_names_end_with_suffix() {
        for name in ["alpha", "beta-2", "x", ""] {
            for suffix in ["_PRIVATE", "-git", "_"] {
                assert!(derive_name(name, suffix, false).ends_with(suffix));
                assert!(derive_name(name, suffix, true).ends_with(&format!("{suffix}_bare")));
            }
        }
    }

    #[test]
    fn test_name_triple_pairwise_distinct() {
        let names = RepoNames::derive("alpha", "_x");
        assert_ne!(names.source, names.destination);
        assert_ne!(names.source, names.bridge);
        assert_ne!(names.destination, names.bridge);
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_derive_batch_example() {
        let sources = strings(&["alpha", "beta"]);
        let batch =
            RepoNames::derive_batch(&sources, "_PRIVATE", MigrationMode::PushRepositories).unwrap();

        let destinations: Vec<_> = batch.iter().map(|n| n.destination.as_str()).collect();
        let bridges: Vec<_> = batch.iter().map(|n| n.bridge.as_str()).collect();
        assert_eq!(destinations, ["alpha_PRIVATE", "beta_PRIVATE"]);
        assert_eq!(bridges, ["alpha_PRIVATE_bare", "beta_PRIVATE_bare"]);
    }

    #[test]
    fn test_derive_batch_rejects_staging_collision_when_pushing() {
        let sources = strings(&["foo", "foo_PRIVATE"]);
        let err = RepoNames::derive_batch(&sources, "_PRIVATE", MigrationMode::PushRepositories)
            .unwrap_err();
        assert!(matches!(err, MigrationError::InvalidConfig(_)));
        assert!(err.to_string().contains("foo_PRIVATE"));
    }

    #[test]
    fn test_derive_batch_create_checks_destinations_only() {
        let sources = strings(&["foo", "foo_PRIVATE"]);
        let batch =
            RepoNames::derive_batch(&sources, "_PRIVATE", MigrationMode::CreateRemotes).unwrap();
        let destinations: Vec<_> = batch.iter().map(|n| n.destination.as_str()).collect();
        assert_eq!(destinations, ["foo_PRIVATE", "foo_PRIVATE_PRIVATE"]);
    }

    #[test]
    fn test_derive_batch_create_allows_empty_suffix() {
        let sources = strings(&["alpha", "beta"]);
        let batch = RepoNames::derive_batch(&sources, "", MigrationMode::CreateRemotes).unwrap();
        assert_eq!(batch[0].destination, "alpha");
        assert_eq!(batch[1].destination, "beta");
    }

    #[test]
    fn test_derive_batch_rejects_duplicate_source() {
        let sources = strings(&["foo", "foo"]);
        for mode in [MigrationMode::CreateRemotes, MigrationMode::PushRepositories] {
            assert!(RepoNames::derive_batch(&sources, "_PRIVATE", mode).is_err());
        }
    }

    #[test]
    fn test_derive_batch_ignores_case() {
        let sources = strings(&["Foo", "foo"]);
        for mode in [MigrationMode::CreateRemotes, MigrationMode::PushRepositories] {
            let err = RepoNames::derive_batch(&sources, "_PRIVATE", mode).unwrap_err();
            assert!(matches!(err, MigrationError::InvalidConfig(_)));
        }
    }

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(MigrationMode::from_flags(false, false), None);
        assert_eq!(
            MigrationMode::from_flags(true, false),
            Some(MigrationMode::CreateRemotes)
        );
        assert_eq!(
            MigrationMode::from_flags(false, true),
            Some(MigrationMode::PushRepositories)
        );
        assert_eq!(
            MigrationMode::from_flags(true, true),
            Some(MigrationMode::CreateRemotes)
        );
    }

    #[test]
    fn test_run_scope() {
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(RunScope::FirstOnly.apply(names.clone()), ["a"]);
        assert_eq!(RunScope::All.apply(names.clone()), names);
        assert!(RunScope::FirstOnly.apply(Vec::new()).is_empty());
        assert_eq!(RunScope::default(), RunScope::FirstOnly);
    }

    #[test]
    fn test_config_builder() {
        let config = MigrationConfig::new("bb", "pw", "gh", "token")
            .with_suffix("-git")
            .with_staging_dir("/var/tmp/hg")
            .with_scope(RunScope::All);

        assert_eq!(config.git_suffix, "-git");
        assert_eq!(config.staging_dir, PathBuf::from("/var/tmp/hg"));
        assert_eq!(config.scope, RunScope::All);
        assert_eq!(config.bitbucket_api, BITBUCKET_API_ROOT);
        assert_eq!(config.github_api, GITHUB_API_ROOT);
    }

    #[test]
    fn test_config_validation() {
        let config = MigrationConfig::new("bb", "pw", "gh", "token");
        assert!(config.validate(MigrationMode::CreateRemotes).is_ok());
        assert!(config.validate(MigrationMode::PushRepositories).is_ok());

        let empty_token = MigrationConfig::new("bb", "pw", "gh", " ");
        assert!(empty_token.validate(MigrationMode::CreateRemotes).is_err());

        let bad_url = config.clone().with_github_api("not a url");
        assert!(bad_url.validate(MigrationMode::CreateRemotes).is_err());

        let no_suffix = config.with_suffix("");
        assert!(no_suffix.validate(MigrationMode::CreateRemotes).is_ok());
        assert!(no_suffix.validate(MigrationMode::PushRepositories).is_err());
    }

    #[test]
    fn test_report_duration() {
        let mut report = MigrationReport::new(MigrationMode::CreateRemotes);
        assert!(report.duration().is_none());
        report.complete();
        assert!(report.duration().is_some());
    }
}
