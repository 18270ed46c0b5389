//! # pdf2up
//!
//! Convert a PDF into a sequence of N-up PNG preview images — the kind of
//! side-by-side page spreads authors post when sharing a paper or preprint.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Crop    trim whitespace margins via pdf-crop-margins (subprocess)
//!  ├─ 2. Render  rasterise pages at 300 DPI via pdfium (spawn_blocking)
//!  ├─ 3. Slice   drop leading pages, truncate to the page limit
//!  ├─ 4. Group   partition into N-tuples, drop an unpaired trailing page
//!  ├─ 5. Paste   composite each tuple left-to-right, optional crop box
//!  └─ 6. Write   <stem>_<zero-padded index>.png next to the input
//! ```
//!
//! Compositing either runs sequentially or fans out across a bounded set of
//! workers with a barrier per chunk; output names carry the group index, so
//! the artefacts are identical in both modes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2up::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder("paper.pdf")
//!         .crop_box(&[10])
//!         .all_pages(true)
//!         .build()?;
//!     let output = convert(&config).await?;
//!     for path in &output.outputs {
//!         println!("{}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2up` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! ## External collaborators
//!
//! Margin cropping shells out to the `pdf-crop-margins` executable
//! (`pip install pdfCropMargins`); rendering binds the pdfium library via
//! `pdfium-render`. Neither is reimplemented here.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, CropBox, DEFAULT_DPI, DEFAULT_PAGE_GROUPS};
pub use convert::{convert, convert_sync};
pub use error::Pdf2UpError;
pub use output::{ConversionOutput, ConversionStats};
pub use progress::{ConvertProgress, NoopProgress, ProgressCallback};
