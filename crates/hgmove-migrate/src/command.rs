//! Launching the external `hg` and `git` clients.
//!
//! Every invocation carries its own working directory. Nothing in this crate
//! changes the working directory of the process.

use crate::error::{MigrationError, Result};

use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use tracing::info;

/// A single external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    /// Program to run (`hg`, `git`).
    pub program: String,

    /// Arguments passed to the program.
    pub args: Vec<String>,

    /// Directory the command runs in.
    pub cwd: PathBuf,
}

impl ExternalCommand {
    /// Create a command running `program` in `cwd`.
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    /// Shorthand for an `hg` command.
    pub fn hg(cwd: impl Into<PathBuf>) -> Self {
        Self::new("hg", cwd)
    }

    /// Shorthand for a `git` command.
    pub fn git(cwd: impl Into<PathBuf>) -> Self {
        Self::new("git", cwd)
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external commands.
///
/// Implementations must return an error for a non-zero exit status so the
/// caller can abort the run.
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion.
    fn run(&self, command: &ExternalCommand) -> Result<()>;
}

/// Runs commands as child processes with inherited stdio, so the user sees
/// the `hg`/`git` output as it happens.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new process runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &ExternalCommand) -> Result<()> {
        println!("\n==> Running: {command}");
        info!(command = %command, cwd = %command.cwd.display(), "Running command");

        let status = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .status()
            .map_err(|source| MigrationError::CommandSpawn {
                command: command.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(MigrationError::CommandFailed {
                command: command.to_string(),
                status: status.to_string(),
            });
        }

        Ok(())
    }
}
