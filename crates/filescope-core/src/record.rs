//! Inventory row types.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::InventoryError;

/// Owner name used when the platform cannot map a file to a principal.
pub const UNKNOWN_OWNER: &str = "<unknown>";

/// Raw file timestamps as read from the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    /// Creation time (birth time, or inode change time where unavailable).
    pub created: SystemTime,
    /// Last modification time.
    pub modified: SystemTime,
    /// Last access time.
    pub accessed: SystemTime,
}

impl Timestamps {
    /// Create timestamps.
    pub fn new(created: SystemTime, modified: SystemTime, accessed: SystemTime) -> Self {
        Self {
            created,
            modified,
            accessed,
        }
    }

    /// All three timestamps set to the same instant.
    pub fn uniform(at: SystemTime) -> Self {
        Self::new(at, at, at)
    }
}

/// Metadata for one regular file, as produced by the walker.
#[derive(Debug, Clone)]
pub struct RawFileMeta {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Size in bytes.
    pub size_bytes: u64,
    /// File timestamps.
    pub timestamps: Timestamps,
    /// Owning principal, or [`UNKNOWN_OWNER`].
    pub owner: CompactString,
}

impl RawFileMeta {
    /// Parent directory as a string.
    pub fn directory(&self) -> String {
        self.path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its directory.
    pub fn filename(&self) -> CompactString {
        self.path
            .file_name()
            .map(|n| CompactString::new(n.to_string_lossy()))
            .unwrap_or_default()
    }
}

/// One inventory row.
///
/// Field order is the persisted column order, see [`FileRecord::COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub directory: String,
    pub filename: CompactString,
    /// Size in kilobytes (bytes / 1000).
    pub size_kb: f64,
    pub owner: CompactString,
    #[serde(with = "local_time")]
    pub created_at: DateTime<Local>,
    pub days_since_created: i64,
    #[serde(with = "local_time")]
    pub modified_at: DateTime<Local>,
    pub days_since_modified: i64,
    #[serde(with = "local_time")]
    pub accessed_at: DateTime<Local>,
    pub days_since_accessed: i64,
    /// Composite score in `[0, 100]`; `None` until the batch has been scored.
    pub score: Option<f64>,
    /// Instant shared by every row of one run.
    #[serde(with = "local_time")]
    pub report_instant: DateTime<Local>,
}

impl FileRecord {
    /// Column names in schema order.
    pub const COLUMNS: [&'static str; 12] = [
        "directory",
        "filename",
        "size_kb",
        "owner",
        "created_at",
        "days_since_created",
        "modified_at",
        "days_since_modified",
        "accessed_at",
        "days_since_accessed",
        "score",
        "report_instant",
    ];

    /// The (directory, filename) key, unique within one run.
    pub fn key(&self) -> (&str, &str) {
        (&self.directory, &self.filename)
    }

    /// Full path of the file this row describes.
    pub fn path(&self) -> PathBuf {
        Path::new(&self.directory).join(self.filename.as_str())
    }

    /// Compare two rows on a single column.
    pub fn compare_by(&self, other: &Self, column: SortColumn) -> Ordering {
        match column {
            SortColumn::Directory => self.directory.cmp(&other.directory),
            SortColumn::Filename => self.filename.cmp(&other.filename),
            SortColumn::SizeKb => self.size_kb.total_cmp(&other.size_kb),
            SortColumn::Owner => self.owner.cmp(&other.owner),
            SortColumn::CreatedAt => self.created_at.cmp(&other.created_at),
            SortColumn::DaysSinceCreated => self.days_since_created.cmp(&other.days_since_created),
            SortColumn::ModifiedAt => self.modified_at.cmp(&other.modified_at),
            SortColumn::DaysSinceModified => {
                self.days_since_modified.cmp(&other.days_since_modified)
            }
            SortColumn::AccessedAt => self.accessed_at.cmp(&other.accessed_at),
            SortColumn::DaysSinceAccessed => {
                self.days_since_accessed.cmp(&other.days_since_accessed)
            }
            SortColumn::Score => match (self.score, other.score) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
            },
            SortColumn::ReportInstant => self.report_instant.cmp(&other.report_instant),
        }
    }
}

/// A column of the inventory table that rows can be sorted by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortColumn {
    Directory,
    Filename,
    SizeKb,
    Owner,
    CreatedAt,
    DaysSinceCreated,
    ModifiedAt,
    DaysSinceModified,
    AccessedAt,
    DaysSinceAccessed,
    #[default]
    Score,
    ReportInstant,
}

impl SortColumn {
    /// Parse a column name, rejecting anything outside the schema.
    pub fn parse(name: &str) -> Result<Self, InventoryError> {
        name.trim()
            .parse()
            .map_err(|_| InventoryError::InvalidSortColumn {
                name: name.to_string(),
            })
    }
}

/// `YYYY-MM-DD HH:MM:SS` local-time (de)serialization for instants.
pub mod local_time {
    use std::time::SystemTime;

    use chrono::{DateTime, Local, NaiveDateTime, SubsecRound, TimeZone};
    use serde::{Deserialize, Deserializer, Serializer, de};

    /// Timestamp format used in persisted tables.
    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Convert an OS timestamp to local time, truncated to whole seconds.
    pub fn from_system_time(time: SystemTime) -> DateTime<Local> {
        DateTime::<Local>::from(time).trunc_subsecs(0)
    }

    /// Current local time, truncated to whole seconds.
    pub fn now() -> DateTime<Local> {
        Local::now().trunc_subsecs(0)
    }

    /// Format an instant.
    pub fn format(time: &DateTime<Local>) -> String {
        time.format(FORMAT).to_string()
    }

    /// Parse an instant written by [`format`].
    pub fn parse(value: &str) -> Result<DateTime<Local>, String> {
        let naive = NaiveDateTime::parse_from_str(value.trim(), FORMAT)
            .map_err(|e| format!("invalid timestamp {value:?}: {e}"))?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| format!("timestamp {value:?} does not exist in local time"))
    }

    pub fn serialize<S>(time: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        parse(&value).map_err(de::Error::custom)
    }
}
