//! Top-level conversion entry points.
//!
//! [`convert`] runs the whole pipeline: pre-flight validation → margin crop
//! → rasterisation → skip/limit slicing → group planning → batch
//! compositing. The page sequence is fully materialised before the first
//! group is planned (two-phase, never lazy), so every fatal condition has a
//! single, predictable point of failure.

use crate::batch;
use crate::config::ConversionConfig;
use crate::error::Pdf2UpError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::composite::OutputNaming;
use crate::pipeline::{crop, group, render};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a PDF into N-up PNG preview images.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// The written composite paths (ascending group-index order) plus run
/// counters.
///
/// # Errors
/// Any taxonomy error aborts the run: bad suffix, missing file, failed
/// margin crop, empty post-skip sequence, render failure, page-height
/// mismatch, or an output write failure. There is no partial-success mode.
///
/// # Side effects
/// Writes `<stem>_cropped.pdf` next to the input (overwritten each run, not
/// cleaned up) and one `<stem>_<index>.png` per group, silently overwriting
/// any files already at those paths.
pub async fn convert(config: &ConversionConfig) -> Result<ConversionOutput, Pdf2UpError> {
    let total_start = Instant::now();
    let n = config.group_size;

    // ── Pre-flight validation ────────────────────────────────────────────
    if config.input.extension() != Some(OsStr::new("pdf")) {
        return Err(Pdf2UpError::InvalidInputFormat {
            path: config.input.clone(),
        });
    }
    let input: PathBuf = config
        .input
        .canonicalize()
        .map_err(|_| Pdf2UpError::FileNotFound {
            path: config.input.clone(),
        })?;
    info!("Starting conversion: {}", input.display());

    // ── Margin crop ──────────────────────────────────────────────────────
    let crop_start = Instant::now();
    let cropped = crop::cropped_destination(&input);
    crop::crop_margins(&input, &cropped, config.cropper_program.as_deref()).await?;
    let crop_duration_ms = crop_start.elapsed().as_millis() as u64;

    // ── Rasterise ────────────────────────────────────────────────────────
    let render_start = Instant::now();
    let rendered = render::render_pages(&cropped, config.dpi).await?;
    let rendered_pages = rendered.len();
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!("Rendered {} pages in {}ms", rendered_pages, render_duration_ms);

    // ── Slice: skip, then limit ──────────────────────────────────────────
    let mut seq = render::PageSequence::new(rendered, config.skip)?;
    let post_skip_len = seq.len();
    let page_limit = group::page_limit(post_skip_len, config.all_pages, n);
    seq.truncate(page_limit);
    debug!(
        "Page limit {} ({} pages after skip {})",
        page_limit,
        post_skip_len,
        config.skip
    );

    // ── Plan groups ──────────────────────────────────────────────────────
    let groups = group::plan_groups(seq.len(), n);
    let groups_planned = groups.len();
    // Unpaired pages: the all-pages remainder is trimmed by the limit, the
    // fixed-limit remainder (sequence shorter than expected) by the planner.
    let dropped_pages = if config.all_pages {
        post_skip_len % n
    } else {
        seq.len() % n
    };
    let naming = OutputNaming::for_input(&input, group::pad_width(page_limit, n))?;

    // ── Composite ────────────────────────────────────────────────────────
    let composite_start = Instant::now();
    let outputs = batch::run(Arc::new(seq), groups, Arc::new(naming), config).await?;
    let composite_duration_ms = composite_start.elapsed().as_millis() as u64;

    let stats = ConversionStats {
        rendered_pages,
        skipped_pages: config.skip,
        dropped_pages,
        groups_planned,
        groups_written: outputs.len(),
        crop_duration_ms,
        render_duration_ms,
        composite_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Conversion complete: {} composites in {}ms",
        stats.groups_written, stats.total_duration_ms
    );

    Ok(ConversionOutput { outputs, stats })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(config: &ConversionConfig) -> Result<ConversionOutput, Pdf2UpError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2UpError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert(config))
}
