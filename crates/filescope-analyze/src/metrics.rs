//! Day-count metrics relative to a report instant.
//!
//! Every row of one run shares the same `report_instant`; the deriver is
//! constructed with it once and never reads the clock afterwards.

use chrono::{DateTime, Local};

use filescope_core::{FileRecord, NegativeAgePolicy, RawFileMeta, local_time};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Whole days from `from` to `to`, rounded toward negative infinity.
///
/// A timestamp one second after `to` yields -1.
pub fn days_between(from: DateTime<Local>, to: DateTime<Local>) -> i64 {
    (to - from).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Builds unscored [`FileRecord`]s from walker output.
#[derive(Debug, Clone, Copy)]
pub struct MetricDeriver {
    report_instant: DateTime<Local>,
    negative_ages: NegativeAgePolicy,
}

impl MetricDeriver {
    /// Create a deriver for one run.
    pub fn new(report_instant: DateTime<Local>, negative_ages: NegativeAgePolicy) -> Self {
        Self {
            report_instant,
            negative_ages,
        }
    }

    /// Create a deriver whose report instant is now.
    pub fn now(negative_ages: NegativeAgePolicy) -> Self {
        Self::new(local_time::now(), negative_ages)
    }

    /// The instant all day counts are relative to.
    pub fn report_instant(&self) -> DateTime<Local> {
        self.report_instant
    }

    /// Days from `at` to the report instant, after the negative-age policy.
    pub fn days_since(&self, at: DateTime<Local>) -> i64 {
        let days = days_between(at, self.report_instant);
        match self.negative_ages {
            NegativeAgePolicy::PassThrough => days,
            NegativeAgePolicy::ClampToZero => days.max(0),
        }
    }

    /// Derive one row. The score stays empty.
    pub fn derive(&self, meta: &RawFileMeta) -> FileRecord {
        let created_at = local_time::from_system_time(meta.timestamps.created);
        let modified_at = local_time::from_system_time(meta.timestamps.modified);
        let accessed_at = local_time::from_system_time(meta.timestamps.accessed);

        FileRecord {
            directory: meta.directory(),
            filename: meta.filename(),
            size_kb: meta.size_bytes as f64 / 1000.0,
            owner: meta.owner.clone(),
            created_at,
            days_since_created: self.days_since(created_at),
            modified_at,
            days_since_modified: self.days_since(modified_at),
            accessed_at,
            days_since_accessed: self.days_since(accessed_at),
            score: None,
            report_instant: self.report_instant,
        }
    }

    /// Derive every row, keeping walk order.
    pub fn derive_all(&self, files: &[RawFileMeta]) -> Vec<FileRecord> {
        files.iter().map(|meta| self.derive(meta)).collect()
    }
}
