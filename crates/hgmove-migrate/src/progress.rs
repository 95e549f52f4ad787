//! Progress tracking for migration runs.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Progress update information.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Current phase of the run.
    pub phase: MigrationPhase,

    /// Current repository being processed.
    pub current_item: Option<String>,

    /// Repositories completed in the current phase.
    pub completed: u64,

    /// Total repositories in the current phase.
    pub total: u64,

    /// Optional message.
    pub message: Option<String>,
}

/// Phases of a migration run.
///
/// `Cloning` through `Branching` repeat for every repository before the run
/// moves on to `Pushing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MigrationPhase {
    /// Listing repositories on Bitbucket.
    Listing,
    /// Deriving Git repository names.
    Deriving,
    /// Creating repositories on GitHub.
    CreatingRemotes,
    /// Cloning the Mercurial repository.
    Cloning,
    /// Pushing Mercurial history into the bare Git bridge.
    Bridging,
    /// Cloning the bridge into a working copy.
    CloningBridge,
    /// Checking out the primary branch.
    Branching,
    /// Pushing working copies to GitHub.
    Pushing,
    /// Run complete.
    Complete,
}

impl MigrationPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Listing,
            1 => Self::Deriving,
            2 => Self::CreatingRemotes,
            3 => Self::Cloning,
            4 => Self::Bridging,
            5 => Self::CloningBridge,
            6 => Self::Branching,
            7 => Self::Pushing,
            _ => Self::Complete,
        }
    }
}

impl std::fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Listing => write!(f, "Listing Bitbucket repositories"),
            Self::Deriving => write!(f, "Deriving Git names"),
            Self::CreatingRemotes => write!(f, "Creating GitHub repositories"),
            Self::Cloning => write!(f, "Cloning Mercurial repository"),
            Self::Bridging => write!(f, "Pushing into Git bridge"),
            Self::CloningBridge => write!(f, "Cloning Git bridge"),
            Self::Branching => write!(f, "Checking out primary branch"),
            Self::Pushing => write!(f, "Pushing to GitHub"),
            Self::Complete => write!(f, "Complete"),
        }
    }
}

/// Progress tracker for migration runs.
pub struct MigrationProgress {
    phase: AtomicU8,
    completed: AtomicU64,
    total: AtomicU64,
    callback: Option<Arc<ProgressCallback>>,
}

impl MigrationProgress {
    /// Create a new progress tracker.
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(MigrationPhase::Listing as u8),
            completed: AtomicU64::new(0),
            total: AtomicU64::new(0),
            callback: None,
        }
    }

    /// Create a progress tracker with a callback.
    pub fn with_callback(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(Arc::new(callback)),
            ..Self::new()
        }
    }

    /// Enter `phase` with `total` items and reset the completed count.
    pub fn set_phase(&self, phase: MigrationPhase, total: u64) {
        self.phase.store(phase as u8, Ordering::SeqCst);
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
        self.notify(None, None);
    }

    /// Enter `phase` for `item`, keeping the completed and total counts.
    pub fn set_step(&self, phase: MigrationPhase, item: &str) {
        self.phase.store(phase as u8, Ordering::SeqCst);
        self.notify(Some(item.to_string()), None);
    }

    /// Increment progress.
    pub fn increment(&self, item: Option<&str>) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.notify(item.map(|s| s.to_string()), None);
    }

    /// Set a message.
    pub fn message(&self, msg: &str) {
        self.notify(None, Some(msg.to_string()));
    }

    /// Get current progress percentage.
    pub fn percentage(&self) -> f64 {
        let total = self.total.load(Ordering::SeqCst);
        if total == 0 {
            return 0.0;
        }
        let completed = self.completed.load(Ordering::SeqCst);
        (completed as f64 / total as f64) * 100.0
    }

    /// Get current phase.
    pub fn current_phase(&self) -> MigrationPhase {
        MigrationPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Items completed in the current phase.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    fn notify(&self, current_item: Option<String>, message: Option<String>) {
        if let Some(callback) = &self.callback {
            let update = ProgressUpdate {
                phase: self.current_phase(),
                current_item,
                completed: self.completed.load(Ordering::SeqCst),
                total: self.total.load(Ordering::SeqCst),
                message,
            };
            callback(update);
        }
    }
}

impl Default for MigrationProgress {
    fn default() -> Self {
        Self::new()
    }
}
