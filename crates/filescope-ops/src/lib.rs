//! Operations around filescope inventories.
//!
//! - **Tables** - write and read inventories as CSV
//! - **Copy** - copy a single file, creating destination directories
//! - **Freshness** - compare a file's modification date with a threshold
//!
//! Copy and freshness failures are soft: they are logged and reported as an
//! outcome rather than raised.

mod copy;
mod freshness;
mod table;

pub use copy::{CopyError, CopyOptions, CopyOutcome, copy_file, source_present};
pub use freshness::{FreshnessError, Granularity, check_freshness, is_fresh};
pub use table::{PersistError, read_table, write_table};
