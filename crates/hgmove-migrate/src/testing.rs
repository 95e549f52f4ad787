//! Test doubles for the external-command seam.
//!
//! Only built for this crate's tests or with the `testing` feature.

use crate::command::{CommandRunner, ExternalCommand};
use crate::error::{MigrationError, Result};

use std::sync::{Arc, Mutex};

/// Records every command instead of running it.
///
/// Optionally fails every command whose command line starts with a given
/// prefix, the way a non-zero exit would. Clones share the same record, so a
/// test can keep a handle after moving the runner into a migrator.
#[derive(Debug, Default, Clone)]
pub struct RecordingRunner {
    commands: Arc<Mutex<Vec<ExternalCommand>>>,
    fail_prefix: Option<String>,
}

impl RecordingRunner {
    /// A runner where every command succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner failing on commands starting with `prefix`.
    pub fn failing_on(prefix: impl Into<String>) -> Self {
        Self {
            commands: Arc::default(),
            fail_prefix: Some(prefix.into()),
        }
    }

    /// Commands run so far, including a failed one.
    pub fn commands(&self) -> Vec<ExternalCommand> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    /// Command lines run so far.
    pub fn command_lines(&self) -> Vec<String> {
        self.commands().iter().map(ToString::to_string).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &ExternalCommand) -> Result<()> {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command.clone());
        }

        let line = command.to_string();
        match &self.fail_prefix {
            Some(prefix) if line.starts_with(prefix.as_str()) => {
                Err(MigrationError::CommandFailed {
                    command: line,
                    status: "exit status: 1".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}
