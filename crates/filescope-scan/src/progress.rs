//! Walk progress reporting.

use std::path::PathBuf;
use std::time::Duration;

/// Progress information during a walk.
#[derive(Debug, Clone)]
pub struct WalkProgress {
    /// Number of files recorded so far.
    pub files_scanned: u64,
    /// Number of directories entered so far.
    pub dirs_scanned: u64,
    /// Total bytes recorded so far.
    pub bytes_scanned: u64,
    /// Most recent path.
    pub current_path: PathBuf,
    /// Number of skipped entries and warnings.
    pub warnings_count: u64,
    /// Time elapsed since the walk started.
    pub elapsed: Duration,
    /// Whether this is the final snapshot of the walk.
    pub finished: bool,
}

impl WalkProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            files_scanned: 0,
            dirs_scanned: 0,
            bytes_scanned: 0,
            current_path: PathBuf::new(),
            warnings_count: 0,
            elapsed: Duration::ZERO,
            finished: false,
        }
    }

    /// Calculate walk rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for WalkProgress {
    fn default() -> Self {
        Self::new()
    }
}
