//! Compositing: paste one group of same-height pages side-by-side, apply the
//! optional crop box, and write the PNG at its deterministic path.
//!
//! Each invocation is a pure function of its group (plus the read-only crop
//! box and naming config): it owns its canvas exclusively and touches exactly
//! one output file, which is why the batch runner can fan these calls out
//! across workers without any locking.

use crate::config::CropBox;
use crate::error::Pdf2UpError;
use image::{imageops, DynamicImage, RgbImage};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Deterministic output naming for one run.
///
/// Index `i` maps to `<dir>/<stem>_<i zero-padded to pad>.png`. The pad
/// width is fixed per run (digit count of the planned group count) so the
/// filenames sort lexicographically in group-index order.
#[derive(Debug, Clone)]
pub struct OutputNaming {
    dir: PathBuf,
    stem: String,
    pad: usize,
}

impl OutputNaming {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>, pad: usize) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            pad: pad.max(1),
        }
    }

    /// Derive naming from the input PDF's parent directory and stem.
    pub fn for_input(input: &Path, pad: usize) -> Result<Self, Pdf2UpError> {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Pdf2UpError::InvalidInputFormat {
                path: input.to_path_buf(),
            })?;
        let dir = match input.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self::new(dir, stem, pad))
    }

    /// The output path for a group index.
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir
            .join(format!("{}_{:0pad$}.png", self.stem, index, pad = self.pad))
    }
}

/// Composite one group of pages into a single PNG on disk.
///
/// 1. All pages must share one height ([`Pdf2UpError::PageSizeMismatch`]
///    otherwise — no padding or scaling is attempted).
/// 2. Canvas width = sum of page widths, height = the common height.
/// 3. Pages are pasted left-to-right at cumulative x-offsets.
/// 4. With a crop box, the canvas is cropped to
///    `(left, top, width − right, height − bottom)`.
/// 5. The canvas is saved at `naming.path_for(group_index)`, silently
///    overwriting any pre-existing file.
pub fn composite_group(
    pages: &[DynamicImage],
    group_index: usize,
    crop: Option<&CropBox>,
    naming: &OutputNaming,
) -> Result<PathBuf, Pdf2UpError> {
    debug_assert!(!pages.is_empty());

    let height = pages[0].height();
    if pages.iter().any(|p| p.height() != height) {
        return Err(Pdf2UpError::PageSizeMismatch {
            group: group_index,
            n: pages.len(),
            heights: pages.iter().map(|p| p.height()).collect(),
        });
    }

    let width: u32 = pages.iter().map(|p| p.width()).sum();
    let mut canvas = RgbImage::new(width, height);
    let mut x_offset: i64 = 0;
    for page in pages {
        imageops::replace(&mut canvas, &page.to_rgb8(), x_offset, 0);
        x_offset += i64::from(page.width());
    }

    let canvas = match crop {
        Some(b) => apply_crop_box(&canvas, b, group_index)?,
        None => canvas,
    };

    let out_path = naming.path_for(group_index);
    canvas
        .save(&out_path)
        .map_err(|source| Pdf2UpError::OutputWriteFailed {
            path: out_path.clone(),
            source,
        })?;
    debug!(
        "Group {} → {} ({}x{})",
        group_index,
        out_path.display(),
        canvas.width(),
        canvas.height()
    );
    Ok(out_path)
}

/// Crop the pasted canvas by the configured LTRB margins.
///
/// The caller is responsible for a box that fits the canvas; a box that
/// swallows the whole width or height is reported as an internal error
/// rather than a distinct taxonomy entry.
fn apply_crop_box(
    canvas: &RgbImage,
    b: &CropBox,
    group_index: usize,
) -> Result<RgbImage, Pdf2UpError> {
    let (w, h) = canvas.dimensions();
    let crop_w = b
        .left
        .checked_add(b.right)
        .and_then(|trim| w.checked_sub(trim))
        .filter(|&v| v > 0)
        .ok_or_else(|| {
            Pdf2UpError::Internal(format!(
                "crop box ({} + {} px) swallows the {w} px canvas width of group {group_index}",
                b.left, b.right
            ))
        })?;
    let crop_h = b
        .top
        .checked_add(b.bottom)
        .and_then(|trim| h.checked_sub(trim))
        .filter(|&v| v > 0)
        .ok_or_else(|| {
            Pdf2UpError::Internal(format!(
                "crop box ({} + {} px) swallows the {h} px canvas height of group {group_index}",
                b.top, b.bottom
            ))
        })?;
    Ok(imageops::crop_imm(canvas, b.left, b.top, crop_w, crop_h).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn page(w: u32, h: u32, shade: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([shade, shade, shade])))
    }

    fn scratch_naming(dir: &tempfile::TempDir) -> OutputNaming {
        OutputNaming::new(dir.path(), "doc", 1)
    }

    #[test]
    fn path_for_zero_pads_to_width() {
        let naming = OutputNaming::new("/out", "doc", 2);
        assert_eq!(naming.path_for(3), PathBuf::from("/out/doc_03.png"));
        assert_eq!(naming.path_for(10), PathBuf::from("/out/doc_10.png"));
    }

    #[test]
    fn for_input_uses_parent_and_stem() {
        let naming = OutputNaming::for_input(Path::new("/papers/doc.pdf"), 1).unwrap();
        assert_eq!(naming.path_for(0), PathBuf::from("/papers/doc_0.png"));
        // A bare filename writes into the current directory.
        let naming = OutputNaming::for_input(Path::new("doc.pdf"), 1).unwrap();
        assert_eq!(naming.path_for(0), PathBuf::from("./doc_0.png"));
    }

    #[test]
    fn canvas_width_is_sum_of_page_widths() {
        let dir = tempfile::tempdir().unwrap();
        let out = composite_group(
            &[page(30, 50, 10), page(40, 50, 200)],
            0,
            None,
            &scratch_naming(&dir),
        )
        .unwrap();
        let written = image::open(&out).unwrap();
        assert_eq!((written.width(), written.height()), (70, 50));
    }

    #[test]
    fn pages_paste_left_to_right() {
        let dir = tempfile::tempdir().unwrap();
        let out = composite_group(
            &[page(10, 10, 0), page(10, 10, 255)],
            0,
            None,
            &scratch_naming(&dir),
        )
        .unwrap();
        let written = image::open(&out).unwrap().to_rgb8();
        assert_eq!(written.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(written.get_pixel(10, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn crop_box_trims_all_four_margins() {
        let dir = tempfile::tempdir().unwrap();
        let b = CropBox::resolve(Some(&[10])).unwrap().unwrap();
        let out = composite_group(
            &[page(50, 60, 10), page(50, 60, 20)],
            0,
            Some(&b),
            &scratch_naming(&dir),
        )
        .unwrap();
        let written = image::open(&out).unwrap();
        assert_eq!((written.width(), written.height()), (80, 40));
    }

    #[test]
    fn mismatched_heights_fail_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let naming = scratch_naming(&dir);
        let err = composite_group(&[page(10, 50, 0), page(10, 48, 0)], 0, None, &naming)
            .unwrap_err();
        match err {
            Pdf2UpError::PageSizeMismatch { group, heights, .. } => {
                assert_eq!(group, 0);
                assert_eq!(heights, vec![50, 48]);
            }
            other => panic!("expected PageSizeMismatch, got {other:?}"),
        }
        assert!(!naming.path_for(0).exists());
    }

    #[test]
    fn oversized_crop_box_is_an_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let b = CropBox::resolve(Some(&[100])).unwrap().unwrap();
        let err = composite_group(
            &[page(50, 60, 0), page(50, 60, 0)],
            0,
            Some(&b),
            &scratch_naming(&dir),
        )
        .unwrap_err();
        assert!(matches!(err, Pdf2UpError::Internal(_)));
    }

    #[test]
    fn existing_file_is_silently_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let naming = scratch_naming(&dir);
        std::fs::write(naming.path_for(0), b"stale").unwrap();
        let out =
            composite_group(&[page(10, 10, 0), page(10, 10, 0)], 0, None, &naming).unwrap();
        assert!(image::open(&out).is_ok());
    }
}
