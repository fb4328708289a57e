//! Aggregates over an inventory for reporting.
//!
//! These are the numbers a chart or a terminal summary needs: the directory
//! as a whole, one line per owner, and the highest rows by some column.

use std::cmp::Ordering;

use compact_str::CompactString;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use filescope_core::{FileRecord, SortColumn};

/// Totals for the whole inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryOverview {
    /// Sum of `size_kb` over all rows.
    pub total_size_kb: f64,
    /// Number of rows.
    pub file_count: usize,
    /// Mean `size_kb`, 0 for an empty inventory.
    pub mean_size_kb: f64,
}

impl DirectoryOverview {
    pub fn from_records(records: &[FileRecord]) -> Self {
        let total_size_kb: f64 = records.iter().map(|r| r.size_kb).sum();
        Self {
            total_size_kb,
            file_count: records.len(),
            mean_size_kb: mean(total_size_kb, records.len()),
        }
    }
}

/// Aggregates for the files of one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub owner: CompactString,
    pub total_size_kb: f64,
    pub file_count: usize,
    pub mean_days_since_created: f64,
    pub mean_days_since_accessed: f64,
}

/// Summarize rows per owner, largest total size first.
///
/// Owners with equal totals are ordered by name.
pub fn owner_summaries(records: &[FileRecord]) -> Vec<OwnerSummary> {
    records
        .iter()
        .into_group_map_by(|r| r.owner.clone())
        .into_iter()
        .map(|(owner, rows)| {
            let count = rows.len();
            let total_size_kb = rows.iter().map(|r| r.size_kb).sum();
            let created: i64 = rows.iter().map(|r| r.days_since_created).sum();
            let accessed: i64 = rows.iter().map(|r| r.days_since_accessed).sum();
            OwnerSummary {
                owner,
                total_size_kb,
                file_count: count,
                mean_days_since_created: mean(created as f64, count),
                mean_days_since_accessed: mean(accessed as f64, count),
            }
        })
        .sorted_by(|a, b| {
            b.total_size_kb
                .total_cmp(&a.total_size_kb)
                .then_with(|| a.owner.cmp(&b.owner))
        })
        .collect()
}

/// The `n` highest rows by `column`.
///
/// Ties keep their input order.
pub fn top_n(records: &[FileRecord], column: SortColumn, n: usize) -> Vec<&FileRecord> {
    records
        .iter()
        .sorted_by(|a, b| descending(a, b, column))
        .take(n)
        .collect()
}

fn descending(a: &FileRecord, b: &FileRecord, column: SortColumn) -> Ordering {
    b.compare_by(a, column)
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filescope_core::local_time;

    fn record(name: &str, owner: &str, size_kb: f64, created: i64, accessed: i64) -> FileRecord {
        let now = local_time::parse("2024-06-01 08:00:00").unwrap();
        FileRecord {
            directory: "/data".to_string(),
            filename: name.into(),
            size_kb,
            owner: owner.into(),
            created_at: now,
            days_since_created: created,
            modified_at: now,
            days_since_modified: 0,
            accessed_at: now,
            days_since_accessed: accessed,
            score: None,
            report_instant: now,
        }
    }

    #[test]
    fn test_overview() {
        let records = vec![
            record("a", "alice", 1.0, 0, 0),
            record("b", "bob", 3.0, 0, 0),
        ];
        let overview = DirectoryOverview::from_records(&records);
        assert_eq!(overview.total_size_kb, 4.0);
        assert_eq!(overview.file_count, 2);
        assert_eq!(overview.mean_size_kb, 2.0);

        assert_eq!(DirectoryOverview::from_records(&[]), DirectoryOverview::default());
    }

    #[test]
    fn test_owner_summaries() {
        let records = vec![
            record("a", "alice", 1.0, 10, 2),
            record("b", "bob", 50.0, 4, 4),
            record("c", "alice", 3.0, 20, 6),
        ];
        let owners = owner_summaries(&records);

        assert_eq!(owners.len(), 2);
        assert_eq!(owners[0].owner, "bob");
        assert_eq!(owners[1].owner, "alice");
        assert_eq!(owners[1].file_count, 2);
        assert_eq!(owners[1].total_size_kb, 4.0);
        assert_eq!(owners[1].mean_days_since_created, 15.0);
        assert_eq!(owners[1].mean_days_since_accessed, 4.0);
    }

    #[test]
    fn test_top_n_keeps_tie_order() {
        let records = vec![
            record("small", "alice", 1.0, 0, 0),
            record("big-1", "alice", 9.0, 0, 0),
            record("big-2", "alice", 9.0, 0, 0),
        ];
        let top: Vec<&str> = top_n(&records, SortColumn::SizeKb, 2)
            .iter()
            .map(|r| r.filename.as_str())
            .collect();
        assert_eq!(top, vec!["big-1", "big-2"]);
        assert!(top_n(&records, SortColumn::SizeKb, 0).is_empty());
    }
}
