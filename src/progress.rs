//! Progress-callback trait for per-group conversion events.
//!
//! Inject an [`Arc<dyn ConvertProgress>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the batch runner works through the page groups.
//!
//! Progress is cosmetic only: callbacks never influence output order or the
//! run's success. In sequential mode an event fires after every group; in
//! parallel mode after every chunk barrier (so a callback sees counts move in
//! steps of up to the worker cap).

use std::path::Path;
use std::sync::Arc;

/// Called by the batch runner as it writes composite images.
///
/// Implementations must be `Send + Sync` so the same callback type works
/// whichever execution mode the runner picks. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait ConvertProgress: Send + Sync {
    /// Called once before any group is composited.
    fn on_run_start(&self, total_groups: usize) {
        let _ = total_groups;
    }

    /// Called after each composite PNG is written, in group-index order.
    /// Only fired in sequential mode; parallel mode reports per chunk.
    fn on_group_written(&self, group_index: usize, total_groups: usize, path: &Path) {
        let _ = (group_index, total_groups, path);
    }

    /// Called after each chunk barrier in parallel mode, with the cumulative
    /// number of completed groups. Not fired in sequential mode.
    fn on_chunk_complete(&self, completed: usize, total_groups: usize) {
        let _ = (completed, total_groups);
    }

    /// Called once after the run finishes (successfully or not).
    fn on_run_complete(&self, total_groups: usize, written: usize) {
        let _ = (total_groups, written);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl ConvertProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConvertProgress>;
