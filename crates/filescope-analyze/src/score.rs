//! Composite interest score.
//!
//! Four metrics (size, days since created, days since accessed, days since
//! modified) are min-max normalized across the batch, combined per row, and
//! the combined values are rescaled to `[0, 100]`.
//!
//! With the default [`CompositeMode::Product`] a row whose value sits at the
//! batch minimum of any one metric normalizes to 0 on that metric and its
//! composite collapses to 0, whatever the other three metrics are. The
//! weights also cancel out of the product, `prod(w * n) / prod(w) == prod(n)`,
//! so they only shape the result in [`CompositeMode::WeightedSum`].
//!
//! A score is relative to its batch: the same file gets a different score in
//! a batch with different neighbours.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use filescope_core::{
    CompositeMode, DegeneratePolicy, FileRecord, InventoryConfig, InventoryError, ScoreWeights,
};

/// Configuration for scoring.
#[derive(Debug, Clone, Copy, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScoreConfig {
    /// Per-metric weights.
    #[builder(default)]
    pub weights: ScoreWeights,

    /// Normalized value for zero-width columns.
    #[builder(default)]
    pub degenerate: DegeneratePolicy,

    /// How weighted metrics are combined.
    #[builder(default)]
    pub composite: CompositeMode,
}

impl ScoreConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref weights) = self.weights {
            weights.validate().map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            degenerate: DegeneratePolicy::default(),
            composite: CompositeMode::default(),
        }
    }
}

impl ScoreConfig {
    /// Create a new config builder.
    pub fn builder() -> ScoreConfigBuilder {
        ScoreConfigBuilder::default()
    }
}

impl From<&InventoryConfig> for ScoreConfig {
    fn from(config: &InventoryConfig) -> Self {
        Self {
            weights: config.weights,
            degenerate: config.degenerate,
            composite: config.composite,
        }
    }
}

/// Normalized metric values of one row, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMetrics {
    pub size: f64,
    pub created: f64,
    pub accessed: f64,
    pub modified: f64,
}

/// Min-max normalize a column into `[0, 1]`.
///
/// If every value is equal (including a column of one) the range is zero and
/// every row gets `policy.fill_value()` instead of a division by zero.
pub fn normalize(values: &[f64], policy: DegeneratePolicy) -> Vec<f64> {
    let Some((min, max)) = min_max(values) else {
        return Vec::new();
    };

    let range = max - min;
    if range <= 0.0 || !range.is_finite() {
        return vec![policy.fill_value(); values.len()];
    }

    values.iter().map(|v| (v - min) / range).collect()
}

/// Rescale a column into `[0, 100]`; a zero-width column rescales to all zeros.
pub fn rescale(values: &[f64]) -> Vec<f64> {
    normalize(values, DegeneratePolicy::Zero)
        .into_iter()
        .map(|v| v * 100.0)
        .collect()
}

fn normalize_column(
    records: &[FileRecord],
    policy: DegeneratePolicy,
    name: &'static str,
    value: impl Fn(&FileRecord) -> f64,
) -> Vec<f64> {
    let values: Vec<f64> = records.iter().map(value).collect();
    if matches!(min_max(&values), Some((min, max)) if min == max) {
        debug!(column = name, fill = policy.fill_value(), "degenerate column range");
    }
    normalize(&values, policy)
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(min, max), &v| (min.min(v), max.max(v))),
    )
}

/// Computes composite scores for a batch of records.
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    config: ScoreConfig,
}

impl ScoreEngine {
    /// Create an engine with default weights and policies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom config.
    pub fn with_config(config: ScoreConfig) -> Result<Self, InventoryError> {
        config.weights.validate()?;
        Ok(Self { config })
    }

    /// Normalize the four metrics of every row against the batch.
    pub fn normalized(&self, records: &[FileRecord]) -> Vec<NormalizedMetrics> {
        let policy = self.config.degenerate;
        let size = normalize_column(records, policy, "size_kb", |r| r.size_kb);
        let created = normalize_column(records, policy, "days_since_created", |r| {
            r.days_since_created as f64
        });
        let accessed = normalize_column(records, policy, "days_since_accessed", |r| {
            r.days_since_accessed as f64
        });
        let modified = normalize_column(records, policy, "days_since_modified", |r| {
            r.days_since_modified as f64
        });

        (0..records.len())
            .map(|i| NormalizedMetrics {
                size: size[i],
                created: created[i],
                accessed: accessed[i],
                modified: modified[i],
            })
            .collect()
    }

    /// Combine one row's normalized metrics.
    ///
    /// Product mode multiplies the normalized values directly since the
    /// weights cancel. Weighted-sum mode works on [`ScoreWeights::relative`]
    /// weights, so any finite positive weights give a composite in `[0, 1]`.
    pub fn combine(&self, metrics: &NormalizedMetrics) -> f64 {
        let values = [metrics.size, metrics.created, metrics.accessed, metrics.modified];

        match self.config.composite {
            CompositeMode::Product => values.iter().product(),
            CompositeMode::WeightedSum => {
                let w = self.config.weights.relative();
                let weights = [w.size, w.created, w.accessed, w.modified];
                let weighted: f64 = weights.iter().zip(values).map(|(weight, n)| weight * n).sum();
                weighted / w.sum()
            }
        }
    }

    /// Composite value of every row before the final rescale.
    pub fn composites(&self, records: &[FileRecord]) -> Vec<f64> {
        self.normalized(records)
            .iter()
            .map(|m| self.combine(m))
            .collect()
    }

    /// Final scores in `[0, 100]`, one per row, in input order.
    pub fn scores(&self, records: &[FileRecord]) -> Vec<f64> {
        rescale(&self.composites(records))
    }

    /// Score a batch. Rows keep their order; each row gets its own score.
    pub fn score(&self, records: Vec<FileRecord>) -> Vec<FileRecord> {
        let scores = self.scores(&records);
        debug!(rows = records.len(), mode = %self.config.composite, "scored batch");

        records
            .into_iter()
            .zip(scores)
            .map(|(record, score)| FileRecord {
                score: Some(score),
                ..record
            })
            .collect()
    }
}
