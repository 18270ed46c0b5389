//! Result types returned from a conversion run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The outcome of a successful run: the written files plus counters.
///
/// `outputs` is always in ascending group-index order, regardless of whether
/// the batch ran sequentially or fanned out across workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Composite PNG paths, one per page group, index order.
    pub outputs: Vec<PathBuf>,
    /// Counters and timings for the run.
    pub stats: ConversionStats,
}

/// Counters and timings for one conversion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages the renderer produced from the cropped PDF.
    pub rendered_pages: usize,
    /// Leading pages dropped by the skip count.
    pub skipped_pages: usize,
    /// Pages discarded because they could not fill a whole group.
    pub dropped_pages: usize,
    /// Groups planned after applying the page limit.
    pub groups_planned: usize,
    /// Composite PNGs actually written.
    pub groups_written: usize,
    /// Wall-clock time spent in the margin-crop collaborator.
    pub crop_duration_ms: u64,
    /// Wall-clock time spent rasterising pages.
    pub render_duration_ms: u64,
    /// Wall-clock time spent compositing and writing PNGs.
    pub composite_duration_ms: u64,
    /// Total run time.
    pub total_duration_ms: u64,
}
