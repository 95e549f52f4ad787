//! Console progress reporting.

use hgmove_migrate::{MigrationPhase, ProgressCallback, ProgressUpdate};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Progress bar on stderr fed by the migration's progress callback.
///
/// The bar has no steady tick: `hg` and `git` share the terminal, so it is
/// redrawn only when the migration reports progress. Phase changes are
/// printed above the bar and logged.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    /// Create a reporter drawing to stderr.
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }

    /// Create a progress callback for use with a migration.
    pub fn callback(&self) -> ProgressCallback {
        let bar = self.bar.clone();
        let last_phase: Mutex<Option<MigrationPhase>> = Mutex::new(None);

        Box::new(move |update: ProgressUpdate| {
            let entered = last_phase
                .lock()
                .map(|mut last| last.replace(update.phase) != Some(update.phase))
                .unwrap_or(false);

            if entered {
                tracing::info!(phase = %update.phase, total = update.total, "Phase");
                bar.println(format!("--> {}", update.phase));
            }
            tracing::debug!(
                phase = %update.phase,
                item = ?update.current_item,
                completed = update.completed,
                total = update.total,
                "Progress"
            );

            bar.set_length(update.total);
            bar.set_position(update.completed);
            bar.set_message(describe(&update));
        })
    }

    /// Remove the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(update: &ProgressUpdate) -> String {
    let mut msg = update.phase.to_string();
    if let Some(item) = &update.current_item {
        msg = format!("{msg}: {item}");
    }
    if let Some(message) = &update.message {
        msg = format!("{msg} - {message}");
    }
    msg
}
