//! Inventory result container and walk statistics.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{InventoryWarning, WarningKind};
use crate::record::FileRecord;

/// Counters collected while walking a root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    /// Regular files that produced a record.
    pub files: u64,
    /// Entries skipped because of a read or metadata error.
    pub skipped: u64,
    /// Directories entered (root excluded).
    pub dirs: u64,
    /// Total bytes across recorded files.
    pub total_bytes: u64,
    /// Deepest level at which a file was found.
    pub max_depth: u32,
}

impl WalkStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a recorded file.
    pub fn record_file(&mut self, size: u64, depth: u32) {
        self.files += 1;
        self.total_bytes += size;
        self.max_depth = self.max_depth.max(depth);
    }

    /// Record a directory.
    pub fn record_dir(&mut self) {
        self.dirs += 1;
    }

    /// Record a skipped entry.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }
}

/// Result of one inventory run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    /// Root directory that was walked (canonical form).
    pub root: PathBuf,

    /// Instant every `days_since_*` value is relative to.
    pub report_instant: DateTime<Local>,

    /// Scored rows in the requested order.
    pub records: Vec<FileRecord>,

    /// Walk counters.
    pub stats: WalkStats,

    /// Soft failures encountered during the run.
    pub warnings: Vec<InventoryWarning>,

    /// Where the table was written, if persistence was requested and succeeded.
    pub output_path: Option<PathBuf>,

    /// Wall time of the run.
    pub duration: Duration,
}

impl Inventory {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no file was found.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check if there were any warnings during the run.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Whether a requested write to disk failed.
    pub fn persistence_failed(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| w.kind == WarningKind::PersistenceFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_stats_default() {
        let stats = WalkStats::default();
        assert_eq!(stats.total_bytes, 0);
        assert_eq!(stats.files, 0);
        assert_eq!(stats.dirs, 0);
    }

    #[test]
    fn test_walk_stats_record_file() {
        let mut stats = WalkStats::new();
        stats.record_file(1024, 2);
        stats.record_file(10, 1);
        stats.record_skip();

        assert_eq!(stats.files, 2);
        assert_eq!(stats.total_bytes, 1034);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.skipped, 1);
    }
}
