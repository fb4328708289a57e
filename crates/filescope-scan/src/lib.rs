//! Filesystem walker for filescope.
//!
//! This crate enumerates the regular files below a root and reads the raw
//! metadata each inventory row is built from.
//!
//! # Overview
//!
//! - **Deterministic order**: serial jwalk traversal, names sorted per directory
//! - **Soft failures**: unreadable entries become warnings, the walk continues
//! - **Owner lookup** with a per-uid cache and an `<unknown>` sentinel
//! - **Progress updates** via a broadcast channel
//!
//! # Example
//!
//! ```rust,no_run
//! use filescope_scan::{FileWalker, InventoryConfig, WalkItem};
//!
//! let config = InventoryConfig::new("/path/to/scan");
//! let walker = FileWalker::new();
//!
//! for item in walker.walk(&config).unwrap() {
//!     if let WalkItem::File(meta) = item {
//!         println!("{} ({} bytes)", meta.path.display(), meta.size_bytes);
//!     }
//! }
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use filescope_scan::{FileWalker, InventoryConfig};
//!
//! let walker = FileWalker::new();
//! let mut progress_rx = walker.subscribe();
//! let output = walker.collect(&InventoryConfig::new(".")).unwrap();
//!
//! while let Ok(progress) = progress_rx.try_recv() {
//!     println!("{} files so far", progress.files_scanned);
//! }
//! println!("{} files total", output.files.len());
//! ```

mod owner;
mod progress;
mod walker;

pub use owner::{OwnerError, OwnerResolver};
pub use progress::WalkProgress;
pub use walker::{FileEntries, FileWalker, WalkItem, WalkOutput};

// Re-export core types for convenience
pub use filescope_core::{
    InventoryConfig, InventoryError, InventoryWarning, RawFileMeta, Timestamps, WalkStats,
    WarningKind,
};
