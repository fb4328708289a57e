//! Error and warning types for inventory runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort an inventory run.
///
/// Everything in here is raised before any record is produced. Per-file
/// problems never surface as an `InventoryError`; they become
/// [`InventoryWarning`]s instead.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Root path does not exist.
    #[error("Invalid root, path not found: {path}")]
    RootNotFound { path: PathBuf },

    /// Root path exists but is not a directory.
    #[error("Invalid root, not a directory: {path}")]
    RootNotADirectory { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A scoring weight is zero, negative or not finite.
    #[error("Invalid weight for {metric}: {value} (weights must be positive and finite)")]
    InvalidWeight { metric: &'static str, value: f64 },

    /// Unknown sort column name.
    #[error("Invalid sort column: {name}")]
    InvalidSortColumn { name: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl InventoryError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::RootNotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether this error means the root itself was unusable.
    pub fn is_invalid_root(&self) -> bool {
        matches!(
            self,
            Self::RootNotFound { .. } | Self::RootNotADirectory { .. }
        )
    }
}

/// Kind of inventory warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error reading a directory during the walk.
    ReadError,
    /// Error reading file metadata; the file was skipped.
    MetadataError,
    /// Path is not valid UTF-8 and cannot be stored as a row; the file was skipped.
    InvalidName,
    /// Owner could not be resolved; the sentinel owner was used.
    OwnerUnavailable,
    /// The table could not be written to disk.
    PersistenceFailed,
}

/// Non-fatal warning encountered during an inventory run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl InventoryWarning {
    /// Create a new warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a metadata warning from an I/O error.
    ///
    /// Permission problems get their own kind so callers can tell them apart.
    pub fn metadata(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        let kind = if error.kind() == std::io::ErrorKind::PermissionDenied {
            WarningKind::PermissionDenied
        } else {
            WarningKind::MetadataError
        };
        Self {
            message: format!("Metadata read failed: {error}"),
            path,
            kind,
        }
    }

    /// Create a warning for a path that is not valid UTF-8.
    pub fn invalid_name(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Path is not valid UTF-8: {}", path.display()),
            path,
            kind: WarningKind::InvalidName,
        }
    }

    /// Create an owner-unavailable warning.
    pub fn owner_unavailable(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        let path = path.into();
        Self {
            message: format!("Owner unavailable: {reason}"),
            path,
            kind: WarningKind::OwnerUnavailable,
        }
    }

    /// Create a persistence warning.
    pub fn persistence(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        let path = path.into();
        Self {
            message: format!("Failed to persist inventory: {error}"),
            path,
            kind: WarningKind::PersistenceFailed,
        }
    }
}
