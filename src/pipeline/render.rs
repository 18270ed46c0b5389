//! PDF rasterisation: render every page to a `DynamicImage` via pdfium,
//! then slice the result into the run's [`PageSequence`].
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a thread designed for
//! blocking operations so the runtime's worker threads never stall during
//! CPU-heavy rendering.
//!
//! ## Why materialise every page up front?
//!
//! The sequence is rendered once and sliced afterwards, rather than rendered
//! lazily as groups are consumed. Skip and limit failures then surface here,
//! before any canvas is allocated, and the grouping arithmetic downstream
//! operates on a known length.

use crate::error::Pdf2UpError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// The rendered pages of one run, post skip and limit, shared read-only
/// across compositor workers.
///
/// Invariant: non-empty. [`PageSequence::new`] fails with
/// [`Pdf2UpError::EmptyPageSequence`] rather than construct an empty one.
#[derive(Debug)]
pub struct PageSequence {
    pages: Vec<DynamicImage>,
}

impl PageSequence {
    /// Build a sequence from freshly rendered pages, dropping the first
    /// `skip` of them.
    pub fn new(rendered: Vec<DynamicImage>, skip: usize) -> Result<Self, Pdf2UpError> {
        let total = rendered.len();
        if skip >= total {
            return Err(Pdf2UpError::EmptyPageSequence { skip, total });
        }
        let pages: Vec<DynamicImage> = rendered.into_iter().skip(skip).collect();
        Ok(Self { pages })
    }

    /// Truncate to the computed page limit. A limit beyond the current
    /// length is a no-op.
    pub fn truncate(&mut self, limit: usize) {
        self.pages.truncate(limit);
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[DynamicImage] {
        &self.pages
    }
}

/// Rasterise all pages of a PDF at the given DPI.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
/// Pages come back in original document order.
pub async fn render_pages(pdf_path: &Path, dpi: u32) -> Result<Vec<DynamicImage>, Pdf2UpError> {
    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || render_pages_blocking(&path, dpi))
        .await
        .map_err(|e| Pdf2UpError::Internal(format!("Render task panicked: {e}")))?
}

/// Blocking implementation of page rendering.
fn render_pages_blocking(pdf_path: &Path, dpi: u32) -> Result<Vec<DynamicImage>, Pdf2UpError> {
    let pdfium = Pdfium::default();

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| Pdf2UpError::RenderFailed {
                path: pdf_path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    // PDF user space is 72 points per inch; scale up to the requested DPI.
    let scale = dpi as f32 / 72.0;

    let mut results = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let pixel_width = (page.width().value * scale) as i32;
        let pixel_height = (page.height().value * scale) as i32;
        let render_config = PdfRenderConfig::new()
            .set_target_width(pixel_width)
            .set_target_height(pixel_height);
        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| Pdf2UpError::RenderFailed {
                    path: pdf_path.to_path_buf(),
                    detail: format!("page {}: {e:?}", idx + 1),
                })?;
        let image = bitmap.as_image();
        debug!("Rendered page {} → {}x{} px", idx + 1, image.width(), image.height());
        results.push(image);
    }

    Ok(results)
}
