//! Analysis for filescope inventories.
//!
//! - **Metrics** - whole-day ages relative to one report instant
//! - **Scoring** - batch-relative composite interest score in `[0, 100]`
//! - **Summaries** - directory overview, per-owner aggregates, top-N rows
//!
//! ```rust,ignore
//! use filescope_analyze::{MetricDeriver, ScoreEngine};
//! use filescope_core::NegativeAgePolicy;
//!
//! let deriver = MetricDeriver::now(NegativeAgePolicy::PassThrough);
//! let records = ScoreEngine::new().score(deriver.derive_all(&files));
//!
//! for record in &records {
//!     println!("{} {:?}", record.path().display(), record.score);
//! }
//! ```

pub mod metrics;
pub mod score;
mod summary;

pub use metrics::{MetricDeriver, days_between};
pub use score::{NormalizedMetrics, ScoreConfig, ScoreConfigBuilder, ScoreEngine, normalize, rescale};
pub use summary::{DirectoryOverview, OwnerSummary, owner_summaries, top_n};

// Re-export core types
pub use filescope_core::{FileRecord, RawFileMeta, SortColumn};
