//! Margin cropping: drive the external `pdf-crop-margins` collaborator.
//!
//! Whitespace borders are trimmed from the PDF itself, before rasterisation,
//! so the renderer only ever sees content-tight pages. The collaborator is a
//! separate executable (the Python `pdfCropMargins` package); we invoke it
//! once per run, synchronously with respect to the pipeline, and capture its
//! output so a failure message reaches the user verbatim.
//!
//! The cropped PDF is written to the sibling path `<stem>_cropped.pdf` and
//! deliberately left on disk: reruns overwrite it, and keeping it around lets
//! users inspect what the renderer actually saw.

use crate::error::Pdf2UpError;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Executable name used when no override is configured.
pub const DEFAULT_CROPPER: &str = "pdf-crop-margins";

/// Suffix inserted before the extension of the intermediate cropped PDF.
pub const CROP_SUFFIX: &str = "_cropped";

/// Derive the intermediate cropped-PDF path next to the input.
///
/// `papers/doc.pdf` → `papers/doc_cropped.pdf`. Overwritten on every run.
pub fn cropped_destination(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{CROP_SUFFIX}.pdf"))
}

/// Run the margin-cropping collaborator on `input`, writing `dest`.
///
/// Invoked as `pdf-crop-margins -s -u <input> -o <dest>`:
/// `-s` skips PDFs that were already cropped by a previous run, `-u` runs
/// unsupervised (no interactive prompts).
///
/// # Errors
/// * [`Pdf2UpError::MarginCropperUnavailable`] if the executable could not
///   be launched at all (not installed, not on `PATH`).
/// * [`Pdf2UpError::MarginCropFailed`] on a non-zero exit, carrying the
///   captured stdout and stderr.
pub async fn crop_margins(
    input: &Path,
    dest: &Path,
    program: Option<&Path>,
) -> Result<(), Pdf2UpError> {
    let program = program
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_CROPPER.to_string());
    debug!("Running {} on {}", program, input.display());

    let output = Command::new(&program)
        .arg("-s")
        .arg("-u")
        .arg(input)
        .arg("-o")
        .arg(dest)
        .output()
        .await
        .map_err(|source| Pdf2UpError::MarginCropperUnavailable {
            program: program.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(Pdf2UpError::MarginCropFailed {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    info!("Cropped margins → {}", dest.display());
    Ok(())
}
