//! Error types for the pdf2up library.
//!
//! Every failure mode in this tool is fatal and raised at the point of
//! detection — there is no network I/O and therefore no transient-failure
//! class and no retry machinery. Either all eligible page groups are written
//! or the run aborts with one of these variants.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2up library.
#[derive(Debug, Error)]
pub enum Pdf2UpError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input path does not end in `.pdf`.
    #[error("'{}' does not have a PDF suffix", .path.display())]
    InvalidInputFormat { path: PathBuf },

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{}'\nCheck the path exists and is readable.", .path.display())]
    FileNotFound { path: PathBuf },

    // ── Crop-box errors ───────────────────────────────────────────────────
    /// The crop box had other than 1, 2, or 4 values.
    #[error("Got {got} values for L,T,R,B crop box (expected 1, 2, or 4)")]
    InvalidBoxSize { got: usize },

    // ── Margin-crop collaborator errors ───────────────────────────────────
    /// The `pdf-crop-margins` executable could not be launched at all.
    #[error(
        "Could not run '{program}': {source}\n\
         pdf2up shells out to pdfCropMargins to trim whitespace borders.\n\
         Install it with: pip install pdfCropMargins"
    )]
    MarginCropperUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// `pdf-crop-margins` ran but exited non-zero.
    #[error("pdf-crop-margins failed (exit code {code:?}): {stdout} -- {stderr}")]
    MarginCropFailed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    // ── Page-sequence errors ──────────────────────────────────────────────
    /// After applying the skip count, no pages remain.
    #[error("Invalid number of pages to skip ({skip} of {total})")]
    EmptyPageSequence { skip: usize, total: usize },

    /// pdfium could not load or rasterise the (cropped) PDF.
    #[error("Failed to render '{}': {detail}", .path.display())]
    RenderFailed { path: PathBuf, detail: String },

    // ── Compositing errors ────────────────────────────────────────────────
    /// Pages within one group have differing heights. The tool does not
    /// attempt to pad or scale pages to match.
    #[error("Pages in group {group} aren't the same height ({heights:?}), can't stack {n}-up")]
    PageSizeMismatch {
        group: usize,
        n: usize,
        heights: Vec<u32>,
    },

    /// Could not write a composite PNG to disk.
    #[error("Failed to write output file '{}': {source}", .path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
