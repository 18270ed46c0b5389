//! Pipeline stages for N-up preview generation.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and keeps the failure points
//! explicit: the page sequence is fully materialised before any group is
//! planned, and groups are planned before any canvas is allocated.
//!
//! ## Data Flow
//!
//! ```text
//! crop ──▶ render ──▶ group ──▶ composite
//! (pdf-crop- (pdfium,   (N-tuples  (paste + crop
//!  margins)   300 DPI)   + index)   + save PNG)
//! ```
//!
//! 1. [`crop`]      — run the external margin-cropping collaborator,
//!    producing `<stem>_cropped.pdf` next to the input
//! 2. [`render`]    — rasterise every page; runs in `spawn_blocking` because
//!    pdfium is not async-safe; applies the skip count and page limit
//! 3. [`group`]     — page-count arithmetic: the page limit, the zero-pad
//!    width, and the partition into N-sized groups
//! 4. [`composite`] — paste one group side-by-side, apply the optional crop
//!    box, write the PNG at its deterministic path

pub mod composite;
pub mod crop;
pub mod group;
pub mod render;
