//! Core types for filescope.
//!
//! This crate provides the data structures shared by every filescope
//! crate: inventory rows, run configuration, errors and warnings.

mod config;
mod error;
mod inventory;
mod record;

pub use config::{
    CompositeMode, DegeneratePolicy, InventoryConfig, InventoryConfigBuilder, NegativeAgePolicy,
    ScoreWeights,
};
pub use error::{InventoryError, InventoryWarning, WarningKind};
pub use inventory::{Inventory, WalkStats};
pub use record::{FileRecord, RawFileMeta, SortColumn, Timestamps, UNKNOWN_OWNER, local_time};
