//! The inventory pipeline: walk, derive, score, sort, persist.

use std::cmp::Ordering;
use std::time::Instant;

use tracing::{info, warn};

use filescope_analyze::{MetricDeriver, ScoreConfig, ScoreEngine};
use filescope_core::{
    FileRecord, Inventory, InventoryConfig, InventoryError, InventoryWarning, SortColumn,
    local_time,
};
use filescope_ops::write_table;
use filescope_scan::FileWalker;

/// Run one inventory of `config.root`.
///
/// Configuration is checked before anything is read. A missing or
/// non-directory root fails the run; everything below the root fails softly
/// and shows up in [`Inventory::warnings`].
pub fn inventory(config: &InventoryConfig) -> Result<Inventory, InventoryError> {
    inventory_with(&FileWalker::new(), config)
}

/// Like [`inventory`], walking with a caller-owned walker so progress can be
/// observed through [`FileWalker::subscribe`].
pub fn inventory_with(
    walker: &FileWalker,
    config: &InventoryConfig,
) -> Result<Inventory, InventoryError> {
    config.validate()?;
    let engine = ScoreEngine::with_config(ScoreConfig::from(config))?;

    let start = Instant::now();
    let report_instant = local_time::now();
    let output = walker.collect(config)?;

    let deriver = MetricDeriver::new(report_instant, config.negative_ages);
    let scored = engine.score(deriver.derive_all(&output.files));
    let records = sort_records(scored, config.sort_column, config.ascending);

    let mut warnings = output.warnings;
    let output_path = match &config.output_path {
        Some(path) => match write_table(path, &records) {
            Ok(()) => Some(path.clone()),
            Err(err) => {
                warn!(path = %err.path().display(), "inventory not persisted: {err}");
                warnings.push(InventoryWarning::persistence(path, &err));
                None
            }
        },
        None => None,
    };

    let inventory = Inventory {
        root: output.root,
        report_instant,
        records,
        stats: output.stats,
        warnings,
        output_path,
        duration: start.elapsed(),
    };

    info!(
        root = %inventory.root.display(),
        files = inventory.len(),
        warnings = inventory.warnings.len(),
        elapsed_ms = inventory.duration.as_millis() as u64,
        "inventory complete"
    );

    Ok(inventory)
}

/// Stable sort by one column. Equal rows keep their relative order in both
/// directions.
pub fn sort_records(
    mut records: Vec<FileRecord>,
    column: SortColumn,
    ascending: bool,
) -> Vec<FileRecord> {
    records.sort_by(|a, b| sort_order(a, b, column, ascending));
    records
}

/// Compare two rows the way [`sort_records`] orders them.
pub fn sort_order(a: &FileRecord, b: &FileRecord, column: SortColumn, ascending: bool) -> Ordering {
    let ord = a.compare_by(b, column);
    if ascending { ord } else { ord.reverse() }
}
