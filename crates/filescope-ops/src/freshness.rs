//! Modification-date freshness checks.
//!
//! A file's local modification time is truncated to a calendar granularity
//! and read as an integer (`2024`, `202403`, `20240315`), then compared with
//! a threshold of the same shape.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;
use tracing::{error, info, warn};

use filescope_core::local_time;

/// Calendar precision a modification time is truncated to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Granularity {
    Year,
    YearMonth,
    YearMonthDay,
}

impl Granularity {
    /// Number of digits a threshold at this granularity has.
    pub fn digits(self) -> usize {
        match self {
            Self::Year => 4,
            Self::YearMonth => 6,
            Self::YearMonthDay => 8,
        }
    }

    fn format(self) -> &'static str {
        match self {
            Self::Year => "%Y",
            Self::YearMonth => "%Y%m",
            Self::YearMonthDay => "%Y%m%d",
        }
    }

    /// Truncate an instant to this granularity.
    pub fn truncate(self, at: &DateTime<Local>) -> u64 {
        // `%Y%m%d` of a four-digit year is always numeric.
        at.format(self.format()).to_string().parse().unwrap_or(0)
    }

    /// Parse a granularity name.
    pub fn parse(name: &str) -> Result<Self, FreshnessError> {
        name.trim()
            .parse()
            .map_err(|_| FreshnessError::InvalidGranularity {
                name: name.to_string(),
            })
    }
}

/// Why a freshness check could not be answered.
#[derive(Debug, Error)]
pub enum FreshnessError {
    #[error("invalid granularity {name:?}, expected year, yearmonth or yearmonthday")]
    InvalidGranularity { name: String },

    #[error("threshold {threshold} does not have the {} digits of {granularity}", granularity.digits())]
    ThresholdMismatch {
        granularity: Granularity,
        threshold: u64,
    },

    #[error("cannot read modification time of {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Check whether `dir/filename` was modified at or after `threshold`.
///
/// The modification time is truncated to `granularity` and compared as
/// `value >= threshold`: a file modified in the threshold period or later is
/// fresh, one modified before it is not.
pub fn check_freshness(
    dir: impl AsRef<Path>,
    filename: &str,
    granularity: Granularity,
    threshold: u64,
) -> Result<bool, FreshnessError> {
    if threshold.to_string().len() != granularity.digits() {
        return Err(FreshnessError::ThresholdMismatch {
            granularity,
            threshold,
        });
    }

    let path = dir.as_ref().join(filename);
    let modified = path
        .metadata()
        .and_then(|m| m.modified())
        .map_err(|source| FreshnessError::Unreadable {
            path: path.clone(),
            source,
        })?;

    let value = granularity.truncate(&local_time::from_system_time(modified));
    if value >= threshold {
        info!(path = %path.display(), %granularity, value, threshold, "file is fresh");
        Ok(true)
    } else {
        warn!(path = %path.display(), %granularity, value, threshold, "file is older than threshold");
        Ok(false)
    }
}

/// Like [`check_freshness`], with the granularity given by name.
///
/// Every failure is logged and answered with `false`.
pub fn is_fresh(dir: impl AsRef<Path>, filename: &str, granularity: &str, threshold: u64) -> bool {
    let result = Granularity::parse(granularity)
        .and_then(|g| check_freshness(dir.as_ref(), filename, g, threshold));

    match result {
        Ok(fresh) => fresh,
        Err(err) => {
            error!(dir = %dir.as_ref().display(), filename, "freshness check failed: {err}");
            false
        }
    }
}
