//! End-to-end migration runs against mocked Bitbucket and GitHub APIs, with
//! external commands recorded instead of executed.

use hgmove_migrate::testing::RecordingRunner;
use hgmove_migrate::{MigrationConfig, MigrationError, MigrationMode, Migrator, RunScope};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn hg_repo(name: &str) -> Value {
    json!({ "name": name, "scm": "hg", "full_name": format!("me/{name}") })
}

async fn mount_listing(server: &MockServer, names: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/2.0/repositories/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": names.iter().map(|n| hg_repo(n)).collect::<Vec<_>>(),
            "next": format!("{}/2.0/repositories/me/page/2", server.uri()),
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2.0/repositories/me/page/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [{ "name": "already-git", "scm": "git" }],
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn config(server: &MockServer, staging: &Path, scope: RunScope) -> MigrationConfig {
    MigrationConfig::new("me", "app-pass", "octo", "ghp_token")
        .with_bitbucket_api(format!("{}/2.0", server.uri()))
        .with_github_api(server.uri())
        .with_staging_dir(staging)
        .with_scope(scope)
}

#[tokio::test]
async fn test_create_mode_creates_private_repo_per_name() {
    let server = MockServer::start().await;
    mount_listing(&server, &["alpha", "beta"]).await;

    for name in ["alpha_PRIVATE", "beta_PRIVATE"] {
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .and(body_json(json!({ "name": name, "private": true })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "full_name": format!("octo/{name}") })),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let staging = TempDir::new().unwrap();
    let runner = RecordingRunner::new();
    let migrator = Migrator::new(config(&server, staging.path(), RunScope::All))
        .unwrap()
        .with_runner(runner.clone());

    let report = migrator.run(MigrationMode::CreateRemotes).await.unwrap();

    assert_eq!(report.created, ["octo/alpha_PRIVATE", "octo/beta_PRIVATE"]);
    assert!(runner.commands().is_empty());
}

#[tokio::test]
async fn test_push_mode_command_sequence() {
    let server = MockServer::start().await;
    mount_listing(&server, &["alpha", "beta"]).await;

    let temp_dir = TempDir::new().unwrap();
    let staging = temp_dir.path().join("tmp");
    let runner = RecordingRunner::new();
    let migrator = Migrator::new(config(&server, &staging, RunScope::All))
        .unwrap()
        .with_runner(runner.clone());

    let report = migrator.run(MigrationMode::PushRepositories).await.unwrap();
    assert_eq!(report.converted, ["alpha_PRIVATE", "beta_PRIVATE"]);
    assert_eq!(report.pushed, ["alpha_PRIVATE", "beta_PRIVATE"]);
    assert!(staging.is_dir());

    let lines = runner.command_lines();
    assert_eq!(
        lines,
        [
            "hg clone ssh://hg@bitbucket.org/me/alpha alpha",
            "git init --bare alpha_PRIVATE_bare",
            "hg bookmarks hg",
            "hg push ../alpha_PRIVATE_bare",
            "git clone alpha_PRIVATE_bare alpha_PRIVATE",
            "git checkout -b master origin/hg",
            "hg clone ssh://hg@bitbucket.org/me/beta beta",
            "git init --bare beta_PRIVATE_bare",
            "hg bookmarks hg",
            "hg push ../beta_PRIVATE_bare",
            "git clone beta_PRIVATE_bare beta_PRIVATE",
            "git checkout -b master origin/hg",
            "git remote add gh_origin git@github.com:octo/alpha_PRIVATE.git",
            "git push -u gh_origin master",
            "git remote add gh_origin git@github.com:octo/beta_PRIVATE.git",
            "git push -u gh_origin master",
        ]
    );

    let commands = runner.commands();
    assert_eq!(commands[2].cwd, staging.join("alpha"));
    assert_eq!(commands[5].cwd, staging.join("alpha_PRIVATE"));
    assert_eq!(commands[15].cwd, staging.join("beta_PRIVATE"));
    assert!(commands
        .iter()
        .all(|c| c.cwd.starts_with(&staging)));
}

#[tokio::test]
async fn test_failure_stops_remaining_repositories() {
    let server = MockServer::start().await;
    mount_listing(&server, &["alpha", "beta", "gamma"]).await;

    let temp_dir = TempDir::new().unwrap();
    let runner = RecordingRunner::failing_on("hg push ../beta_PRIVATE_bare");
    let migrator = Migrator::new(config(&server, temp_dir.path(), RunScope::All))
        .unwrap()
        .with_runner(runner.clone());

    let err = migrator
        .run(MigrationMode::PushRepositories)
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::CommandFailed { .. }));

    let lines = runner.command_lines();
    assert_eq!(lines.last().unwrap(), "hg push ../beta_PRIVATE_bare");
    assert!(lines.iter().all(|l| !l.contains("gamma")));
    assert!(lines.iter().all(|l| !l.starts_with("git push")));
}

#[tokio::test]
async fn test_trial_run_processes_first_repository_only() {
    let server = MockServer::start().await;
    mount_listing(&server, &["alpha", "beta", "gamma"]).await;

    let temp_dir = TempDir::new().unwrap();
    let runner = RecordingRunner::new();
    let migrator = Migrator::new(config(&server, temp_dir.path(), RunScope::FirstOnly))
        .unwrap()
        .with_runner(runner.clone());

    let report = migrator.run(MigrationMode::PushRepositories).await.unwrap();
    assert_eq!(report.enumerated, 3);
    assert_eq!(report.selected, ["alpha"]);
    assert_eq!(report.pushed, ["alpha_PRIVATE"]);

    let lines = runner.command_lines();
    assert_eq!(lines.len(), 8);
    assert!(lines
        .iter()
        .all(|l| !l.contains("beta") && !l.contains("gamma")));
}
