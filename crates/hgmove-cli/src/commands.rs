//! CLI command implementations.

use crate::progress::ConsoleProgress;
use anyhow::{Context, Result};
use hgmove_migrate::{MigrationConfig, MigrationMode, MigrationProgress, MigrationReport, Migrator};

/// Shown when neither mode flag was given.
pub const NO_ACTION_MESSAGE: &str =
    "No action specified. Specify either --create_gh_repos or --push_gh_repos";

/// Run a migration in `mode`. With no mode, print a hint and do nothing.
pub fn migrate(
    mode: Option<MigrationMode>,
    config: MigrationConfig,
) -> Result<Option<MigrationReport>> {
    let Some(mode) = mode else {
        println!("{NO_ACTION_MESSAGE}");
        return Ok(None);
    };

    tracing::info!(
        mode = %mode,
        staging = %config.staging_dir.display(),
        scope = ?config.scope,
        "Migration configuration"
    );

    let console = ConsoleProgress::new();
    let migrator = Migrator::new(config)
        .context("Failed to set up the migration")?
        .with_progress(MigrationProgress::with_callback(console.callback()));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    let outcome = runtime.block_on(migrator.run(mode));
    console.finish();
    let report = outcome.with_context(|| format!("Failed to {mode}"))?;

    report.print_summary();
    Ok(Some(report))
}
