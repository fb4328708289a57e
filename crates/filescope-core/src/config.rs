//! Inventory configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::InventoryError;
use crate::record::SortColumn;

/// Weights for the four scored metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Weight of `size_kb`.
    pub size: f64,
    /// Weight of `days_since_created`.
    pub created: f64,
    /// Weight of `days_since_accessed`.
    pub accessed: f64,
    /// Weight of `days_since_modified`.
    pub modified: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            size: 2.0,
            created: 1.0,
            accessed: 2.0,
            modified: 1.0,
        }
    }
}

impl ScoreWeights {
    /// Create validated weights.
    pub fn new(size: f64, created: f64, accessed: f64, modified: f64) -> Result<Self, InventoryError> {
        let weights = Self {
            size,
            created,
            accessed,
            modified,
        };
        weights.validate()?;
        Ok(weights)
    }

    /// Reject zero, negative and non-finite weights.
    pub fn validate(&self) -> Result<(), InventoryError> {
        for (metric, value) in self.named() {
            if !value.is_finite() || value <= 0.0 {
                return Err(InventoryError::InvalidWeight { metric, value });
            }
        }
        Ok(())
    }

    /// Weights paired with their metric names.
    pub fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("size", self.size),
            ("created", self.created),
            ("accessed", self.accessed),
            ("modified", self.modified),
        ]
    }

    /// The same weights divided by the largest one, so each lies in `(0, 1]`.
    ///
    /// Ratios between weights are kept; sums of relative weights stay in
    /// `[1, 4]` however large or small the originals are.
    pub fn relative(&self) -> Self {
        let largest = self.size.max(self.created).max(self.accessed).max(self.modified);
        Self {
            size: self.size / largest,
            created: self.created / largest,
            accessed: self.accessed / largest,
            modified: self.modified / largest,
        }
    }

    /// Sum of all four weights.
    pub fn sum(&self) -> f64 {
        self.size + self.created + self.accessed + self.modified
    }
}

/// What to do with negative `days_since_*` values (future timestamps, clock skew).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NegativeAgePolicy {
    /// Keep negative day counts as they are.
    #[default]
    PassThrough,
    /// Replace negative day counts with zero.
    ClampToZero,
}

/// Normalized value used for a column whose min equals its max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DegeneratePolicy {
    /// Every value in the column normalizes to 0.
    #[default]
    Zero,
    /// Every value in the column normalizes to 1, so it drops out of a product.
    Neutral,
}

impl DegeneratePolicy {
    /// Normalized value assigned to every row of a degenerate column.
    pub fn fill_value(self) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::Neutral => 1.0,
        }
    }
}

/// How the weighted normalized metrics are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CompositeMode {
    /// `prod(w * n) / prod(w)`.
    #[default]
    Product,
    /// `sum(w * n) / sum(w)`.
    WeightedSum,
}

/// Configuration for an inventory run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct InventoryConfig {
    /// Root directory to inventory.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Column the rows are sorted by.
    #[builder(default)]
    #[serde(default)]
    pub sort_column: SortColumn,

    /// Sort ascending instead of descending.
    #[builder(default = "false")]
    #[serde(default)]
    pub ascending: bool,

    /// Metric weights for the composite score.
    #[builder(default)]
    #[serde(default)]
    pub weights: ScoreWeights,

    /// Write the table here as CSV (None = keep it in memory only).
    #[builder(default)]
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Handling of negative day counts.
    #[builder(default)]
    #[serde(default)]
    pub negative_ages: NegativeAgePolicy,

    /// Normalization of zero-width columns.
    #[builder(default)]
    #[serde(default)]
    pub degenerate: DegeneratePolicy,

    /// Composite combination.
    #[builder(default)]
    #[serde(default)]
    pub composite: CompositeMode,

    /// Follow symbolic links.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Maximum depth to traverse (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Glob patterns matched against entry names; matching directories are pruned.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

impl InventoryConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if let Some(ref weights) = self.weights {
            weights.validate().map_err(|e| e.to_string())?;
        }
        if let Some(ref patterns) = self.ignore_patterns {
            build_glob_set(patterns).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

impl InventoryConfig {
    /// Create a new config builder.
    pub fn builder() -> InventoryConfigBuilder {
        InventoryConfigBuilder::default()
    }

    /// Create a config with all defaults for a root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sort_column: SortColumn::default(),
            ascending: false,
            weights: ScoreWeights::default(),
            output_path: None,
            negative_ages: NegativeAgePolicy::default(),
            degenerate: DegeneratePolicy::default(),
            composite: CompositeMode::default(),
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
            ignore_patterns: Vec::new(),
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, InventoryError> {
        let config: Self = toml::from_str(source).map_err(|e| InventoryError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InventoryError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| InventoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check caller-supplied values before any I/O happens.
    pub fn validate(&self) -> Result<(), InventoryError> {
        if self.root.as_os_str().is_empty() {
            return Err(InventoryError::InvalidConfig {
                message: "Root path cannot be empty".to_string(),
            });
        }
        self.weights.validate()?;
        self.ignore_matcher()?;
        Ok(())
    }

    /// Compile the ignore patterns.
    pub fn ignore_matcher(&self) -> Result<GlobSet, InventoryError> {
        build_glob_set(&self.ignore_patterns)
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, InventoryError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| InventoryError::InvalidConfig {
            message: format!("bad ignore pattern {pattern:?}: {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| InventoryError::InvalidConfig {
        message: e.to_string(),
    })
}
