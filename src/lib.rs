//! filescope - directory inventory with per-file ages and a composite score.
//!
//! One call walks a root, builds a row per regular file (size, owner,
//! created/modified/accessed instants and whole-day ages), scores every row
//! against the rest of the batch, sorts, and optionally writes the table as
//! CSV.
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! use filescope::{InventoryConfig, SortColumn, inventory};
//!
//! let config = InventoryConfig::builder()
//!     .root("/srv/share")
//!     .sort_column(SortColumn::Score)
//!     .output_path(PathBuf::from("reports/share.csv"))
//!     .build()
//!     .unwrap();
//!
//! let result = inventory(&config).unwrap();
//! for record in result.records.iter().take(10) {
//!     println!("{:>6.2} {}", record.score.unwrap_or(0.0), record.path().display());
//! }
//! ```

mod inventory;
pub mod logging;

pub use inventory::{inventory, inventory_with, sort_order, sort_records};

pub use filescope_analyze::{
    DirectoryOverview, MetricDeriver, OwnerSummary, ScoreConfig, ScoreEngine, owner_summaries,
    top_n,
};
pub use filescope_core::{
    CompositeMode, DegeneratePolicy, FileRecord, Inventory, InventoryConfig, InventoryError,
    InventoryWarning, NegativeAgePolicy, ScoreWeights, SortColumn, WalkStats, WarningKind,
};
pub use filescope_ops::{
    CopyOptions, CopyOutcome, Granularity, PersistError, copy_file, is_fresh, read_table,
    write_table,
};
pub use filescope_scan::{FileWalker, WalkProgress};
