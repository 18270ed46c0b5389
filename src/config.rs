//! Configuration types for the N-up conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one immutable
//! struct, validated eagerly in `build()`, means every fatal precondition
//! (bad crop box, group size below 2) surfaces before any rendering starts.
//!
//! # Design choice: builder over constructor
//! Callers set only what they care about and rely on documented defaults for
//! the rest; new fields never break existing call sites.

use crate::error::Pdf2UpError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Default number of page groups written when `--all` is not requested.
///
/// Matches a fixed page limit of `group_size × 4` — eight pages at the
/// default 2-up, enough for a paper preview without flooding a feed.
pub const DEFAULT_PAGE_GROUPS: usize = 4;

/// Default rasterisation DPI. 300 keeps body text legible when composites
/// are viewed at full width.
pub const DEFAULT_DPI: u32 = 300;

/// Pixel margins removed from a composite image after pasting, in
/// left/top/right/bottom order.
///
/// Constructible only through [`CropBox::resolve`], which accepts 1, 2, or 4
/// values. Immutable once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    /// Normalise a user-supplied crop box into explicit LTRB margins.
    ///
    /// * `None` or empty slice → no secondary crop (`Ok(None)`).
    /// * 1 value  → all four margins equal.
    /// * 2 values → first = left = right, second = top = bottom.
    /// * 4 values → left, top, right, bottom in order.
    /// * any other length → [`Pdf2UpError::InvalidBoxSize`].
    pub fn resolve(raw: Option<&[u32]>) -> Result<Option<Self>, Pdf2UpError> {
        let raw = match raw {
            None => return Ok(None),
            Some([]) => return Ok(None),
            Some(values) => values,
        };
        match *raw {
            [all] => Ok(Some(Self {
                left: all,
                top: all,
                right: all,
                bottom: all,
            })),
            [horizontal, vertical] => Ok(Some(Self {
                left: horizontal,
                top: vertical,
                right: horizontal,
                bottom: vertical,
            })),
            [left, top, right, bottom] => Ok(Some(Self {
                left,
                top,
                right,
                bottom,
            })),
            _ => Err(Pdf2UpError::InvalidBoxSize { got: raw.len() }),
        }
    }
}

/// Configuration for one PDF-to-PNG preview run.
///
/// Built via [`ConversionConfig::builder()`].
///
/// # Example
/// ```rust
/// use pdf2up::ConversionConfig;
///
/// let config = ConversionConfig::builder("paper.pdf")
///     .crop_box(&[10])
///     .all_pages(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.group_size, 2);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Path to the input PDF. Must carry a `.pdf` suffix; checked before any
    /// processing begins.
    pub input: PathBuf,

    /// Optional secondary crop applied to each composite after pasting.
    pub crop_box: Option<CropBox>,

    /// Process every (grouped) page rather than the default fixed limit of
    /// [`DEFAULT_PAGE_GROUPS`] groups. A trailing page that would leave a
    /// group short is dropped, not padded.
    pub all_pages: bool,

    /// Number of leading pages to drop before grouping. Default: 0.
    ///
    /// Useful for skipping a cover sheet or title page that would otherwise
    /// occupy the first slot of the first composite.
    pub skip: usize,

    /// Pages pasted side-by-side per output image. Minimum 2. Default: 2.
    pub group_size: usize,

    /// Worker cap for parallel compositing. `None` means all available
    /// cores; `Some(1)` forces sequential execution (handy for debugging).
    pub workers: Option<usize>,

    /// Rasterisation DPI handed to pdfium. Default: [`DEFAULT_DPI`].
    pub dpi: u32,

    /// Override for the margin-cropping executable. Default:
    /// `pdf-crop-margins` resolved from `PATH`.
    pub cropper_program: Option<PathBuf>,

    /// Optional progress callback, fired per group (sequential mode) or per
    /// chunk (parallel mode). Cosmetic only; never affects output order.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("input", &self.input)
            .field("crop_box", &self.crop_box)
            .field("all_pages", &self.all_pages)
            .field("skip", &self.skip)
            .field("group_size", &self.group_size)
            .field("workers", &self.workers)
            .field("dpi", &self.dpi)
            .field("cropper_program", &self.cropper_program)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConvertProgress>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for the given input PDF.
    pub fn builder(input: impl Into<PathBuf>) -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: ConversionConfig {
                input: input.into(),
                crop_box: None,
                all_pages: false,
                skip: 0,
                group_size: 2,
                workers: None,
                dpi: DEFAULT_DPI,
                cropper_program: None,
                progress_callback: None,
            },
            raw_box: None,
        }
    }

    /// The fixed page limit used when `all_pages` is off.
    pub fn default_page_limit(&self) -> usize {
        self.group_size * DEFAULT_PAGE_GROUPS
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
    raw_box: Option<Vec<u32>>,
}

impl ConversionConfigBuilder {
    /// Supply the raw crop-box values (1, 2, or 4 integers). Resolved and
    /// validated in [`build`](Self::build), before any rendering occurs.
    pub fn crop_box(mut self, values: &[u32]) -> Self {
        self.raw_box = Some(values.to_vec());
        self
    }

    pub fn all_pages(mut self, v: bool) -> Self {
        self.config.all_pages = v;
        self
    }

    pub fn skip(mut self, n: usize) -> Self {
        self.config.skip = n;
        self
    }

    pub fn group_size(mut self, n: usize) -> Self {
        self.config.group_size = n;
        self
    }

    /// Cap on concurrently running compositor workers. `None` = all cores.
    pub fn workers(mut self, n: Option<usize>) -> Self {
        self.config.workers = n;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn cropper_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.cropper_program = Some(program.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints eagerly.
    ///
    /// # Errors
    /// * [`Pdf2UpError::InvalidBoxSize`] for a crop box of bad length.
    /// * [`Pdf2UpError::InvalidConfig`] for `group_size < 2` or `dpi == 0`.
    pub fn build(mut self) -> Result<ConversionConfig, Pdf2UpError> {
        self.config.crop_box = CropBox::resolve(self.raw_box.as_deref())?;
        if self.config.group_size < 2 {
            return Err(Pdf2UpError::InvalidConfig(format!(
                "group size must be at least 2, got {}",
                self.config.group_size
            )));
        }
        if self.config.dpi == 0 {
            return Err(Pdf2UpError::InvalidConfig("DPI must be non-zero".into()));
        }
        if self.config.workers == Some(0) {
            return Err(Pdf2UpError::InvalidConfig(
                "worker count must be at least 1 (or unset for all cores)".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_length_one_sets_all_margins() {
        let b = CropBox::resolve(Some(&[10])).unwrap().unwrap();
        assert_eq!(
            b,
            CropBox {
                left: 10,
                top: 10,
                right: 10,
                bottom: 10
            }
        );
    }

    #[test]
    fn box_length_two_maps_horizontal_and_vertical() {
        let b = CropBox::resolve(Some(&[5, 8])).unwrap().unwrap();
        assert_eq!(
            b,
            CropBox {
                left: 5,
                top: 8,
                right: 5,
                bottom: 8
            }
        );
    }

    #[test]
    fn box_length_four_is_explicit_ltrb() {
        let b = CropBox::resolve(Some(&[1, 2, 3, 4])).unwrap().unwrap();
        assert_eq!(
            b,
            CropBox {
                left: 1,
                top: 2,
                right: 3,
                bottom: 4
            }
        );
    }

    #[test]
    fn box_none_disables_secondary_crop() {
        assert!(CropBox::resolve(None).unwrap().is_none());
        assert!(CropBox::resolve(Some(&[])).unwrap().is_none());
    }

    #[test]
    fn box_other_lengths_fail() {
        for bad in [&[1, 2, 3][..], &[1, 2, 3, 4, 5][..]] {
            match CropBox::resolve(Some(bad)) {
                Err(Pdf2UpError::InvalidBoxSize { got }) => assert_eq!(got, bad.len()),
                other => panic!("expected InvalidBoxSize, got {other:?}"),
            }
        }
    }

    #[test]
    fn builder_defaults() {
        let c = ConversionConfig::builder("doc.pdf").build().unwrap();
        assert_eq!(c.group_size, 2);
        assert_eq!(c.skip, 0);
        assert!(!c.all_pages);
        assert_eq!(c.dpi, DEFAULT_DPI);
        assert_eq!(c.default_page_limit(), 8);
    }

    #[test]
    fn builder_rejects_group_size_below_two() {
        let err = ConversionConfig::builder("doc.pdf")
            .group_size(1)
            .build()
            .unwrap_err();
        assert!(matches!(err, Pdf2UpError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_bad_box_before_any_processing() {
        let err = ConversionConfig::builder("doc.pdf")
            .crop_box(&[1, 2, 3])
            .build()
            .unwrap_err();
        assert!(matches!(err, Pdf2UpError::InvalidBoxSize { got: 3 }));
    }

    #[test]
    fn builder_rejects_zero_workers() {
        let err = ConversionConfig::builder("doc.pdf")
            .workers(Some(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, Pdf2UpError::InvalidConfig(_)));
    }
}
