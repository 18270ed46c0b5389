//! Batch runner: drive the Grouper→Compositor pipeline sequentially or
//! fanned out across a bounded set of workers.
//!
//! ## Scheduling model
//!
//! Parallel mode is a chunked fan-out with a barrier, not a work-stealing
//! pool: the groups are split into chunks of at most `workers` tasks, every
//! task in a chunk is spawned onto the blocking thread pool, and the next
//! chunk only starts once `join_all` has seen the whole chunk finish. This
//! bounds peak concurrency to the worker cap while still processing every
//! group, and it means an error in one group lets its chunk siblings run to
//! completion before the run aborts.
//!
//! Output order is never affected by scheduling: paths are collected in
//! group-index order in both modes, and the filenames themselves carry the
//! index.

use crate::config::ConversionConfig;
use crate::error::Pdf2UpError;
use crate::pipeline::composite::{self, OutputNaming};
use crate::pipeline::group::PageGroup;
use crate::pipeline::render::PageSequence;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Resolve the effective worker cap: the configured count, or every
/// available core when unset.
pub fn effective_workers(config: &ConversionConfig) -> usize {
    config.workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    })
}

/// Composite every group and return the output paths in ascending
/// group-index order.
///
/// With one worker the groups are processed strictly in order, one at a
/// time; otherwise they fan out in chunks of at most the worker cap. The
/// progress callback (if any) fires per group in sequential mode and per
/// chunk barrier in parallel mode.
pub async fn run(
    seq: Arc<PageSequence>,
    groups: Vec<PageGroup>,
    naming: Arc<OutputNaming>,
    config: &ConversionConfig,
) -> Result<Vec<PathBuf>, Pdf2UpError> {
    let total = groups.len();
    if let Some(cb) = &config.progress_callback {
        cb.on_run_start(total);
    }

    let workers = effective_workers(config);
    debug!("Compositing {} groups with {} worker(s)", total, workers);

    let result = if workers <= 1 {
        run_sequential(&seq, &groups, &naming, config).await
    } else {
        run_parallel(seq, groups, naming, config, workers).await
    };

    if let Some(cb) = &config.progress_callback {
        let written = result.as_ref().map(Vec::len).unwrap_or(0);
        cb.on_run_complete(total, written);
    }
    result
}

/// One group at a time, in order, each on the blocking pool so the async
/// caller is never stalled by pixel work.
async fn run_sequential(
    seq: &Arc<PageSequence>,
    groups: &[PageGroup],
    naming: &Arc<OutputNaming>,
    config: &ConversionConfig,
) -> Result<Vec<PathBuf>, Pdf2UpError> {
    let total = groups.len();
    let mut outputs = Vec::with_capacity(total);
    for group in groups {
        let path = spawn_composite(seq, group, naming, config).await?;
        if let Some(cb) = &config.progress_callback {
            cb.on_group_written(group.index, total, &path);
        }
        outputs.push(path);
    }
    Ok(outputs)
}

/// Chunked fan-out with a barrier after every chunk.
async fn run_parallel(
    seq: Arc<PageSequence>,
    groups: Vec<PageGroup>,
    naming: Arc<OutputNaming>,
    config: &ConversionConfig,
    workers: usize,
) -> Result<Vec<PathBuf>, Pdf2UpError> {
    let total = groups.len();
    let mut outputs = Vec::with_capacity(total);
    let mut completed = 0;

    for chunk in groups.chunks(workers) {
        let handles: Vec<_> = chunk
            .iter()
            .map(|group| {
                let seq = Arc::clone(&seq);
                let naming = Arc::clone(&naming);
                let crop = config.crop_box;
                let group = group.clone();
                tokio::task::spawn_blocking(move || {
                    composite::composite_group(
                        &seq.pages()[group.pages.clone()],
                        group.index,
                        crop.as_ref(),
                        &naming,
                    )
                })
            })
            .collect();

        // Barrier: every sibling in the chunk finishes before any error is
        // surfaced or the next chunk starts. Tasks were spawned in ascending
        // index order, so the first error seen is the lowest-index one.
        for joined in join_all(handles).await {
            let path = joined
                .map_err(|e| Pdf2UpError::Internal(format!("Compositor task panicked: {e}")))??;
            outputs.push(path);
        }

        completed += chunk.len();
        if let Some(cb) = &config.progress_callback {
            cb.on_chunk_complete(completed, total);
        }
    }

    Ok(outputs)
}

async fn spawn_composite(
    seq: &Arc<PageSequence>,
    group: &PageGroup,
    naming: &Arc<OutputNaming>,
    config: &ConversionConfig,
) -> Result<PathBuf, Pdf2UpError> {
    let seq = Arc::clone(seq);
    let naming = Arc::clone(naming);
    let crop = config.crop_box;
    let group = group.clone();
    tokio::task::spawn_blocking(move || {
        composite::composite_group(
            &seq.pages()[group.pages.clone()],
            group.index,
            crop.as_ref(),
            &naming,
        )
    })
    .await
    .map_err(|e| Pdf2UpError::Internal(format!("Compositor task panicked: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::group::plan_groups;
    use crate::progress::{ConvertProgress, ProgressCallback};
    use image::{DynamicImage, Rgb, RgbImage};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sequence(n: usize) -> Arc<PageSequence> {
        let pages: Vec<DynamicImage> = (0..n)
            .map(|i| {
                DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 30, Rgb([i as u8 * 10; 3])))
            })
            .collect();
        Arc::new(PageSequence::new(pages, 0).unwrap())
    }

    fn config(workers: Option<usize>) -> ConversionConfig {
        ConversionConfig::builder("doc.pdf")
            .workers(workers)
            .build()
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sequential_and_parallel_agree_on_paths() {
        let seq = sequence(8);
        let groups = plan_groups(8, 2);

        let dir_a = tempfile::tempdir().unwrap();
        let naming_a = Arc::new(OutputNaming::new(dir_a.path(), "doc", 1));
        let sequential = run(
            Arc::clone(&seq),
            groups.clone(),
            Arc::clone(&naming_a),
            &config(Some(1)),
        )
        .await
        .unwrap();

        let dir_b = tempfile::tempdir().unwrap();
        let naming_b = Arc::new(OutputNaming::new(dir_b.path(), "doc", 1));
        let parallel = run(seq, groups, naming_b, &config(Some(3)))
            .await
            .unwrap();

        let names = |paths: &[PathBuf]| -> Vec<String> {
            paths
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };
        assert_eq!(names(&sequential), names(&parallel));
        assert_eq!(names(&sequential), ["doc_0.png", "doc_1.png", "doc_2.png", "doc_3.png"]);
        for p in sequential.iter().chain(parallel.iter()) {
            assert!(p.exists(), "missing output {}", p.display());
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn parallel_outputs_stay_in_index_order() {
        let seq = sequence(12);
        let groups = plan_groups(12, 2);
        let dir = tempfile::tempdir().unwrap();
        let naming = Arc::new(OutputNaming::new(dir.path(), "doc", 1));
        let outputs = run(seq, groups, naming, &config(Some(4))).await.unwrap();
        let mut sorted = outputs.clone();
        sorted.sort();
        assert_eq!(outputs, sorted);
        assert_eq!(outputs.len(), 6);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn mismatched_group_aborts_the_run() {
        let pages = vec![
            DynamicImage::ImageRgb8(RgbImage::new(20, 30)),
            DynamicImage::ImageRgb8(RgbImage::new(20, 28)),
        ];
        let seq = Arc::new(PageSequence::new(pages, 0).unwrap());
        let groups = plan_groups(2, 2);
        let dir = tempfile::tempdir().unwrap();
        let naming = Arc::new(OutputNaming::new(dir.path(), "doc", 1));
        let err = run(seq, groups, Arc::clone(&naming), &config(Some(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2UpError::PageSizeMismatch { group: 0, .. }));
        assert!(!naming.path_for(0).exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn progress_fires_per_group_in_sequential_mode() {
        struct Tally {
            groups: AtomicUsize,
            chunks: AtomicUsize,
        }
        impl ConvertProgress for Tally {
            fn on_group_written(&self, _i: usize, _t: usize, _p: &Path) {
                self.groups.fetch_add(1, Ordering::SeqCst);
            }
            fn on_chunk_complete(&self, _c: usize, _t: usize) {
                self.chunks.fetch_add(1, Ordering::SeqCst);
            }
        }

        let tally = Arc::new(Tally {
            groups: AtomicUsize::new(0),
            chunks: AtomicUsize::new(0),
        });
        let cfg = ConversionConfig::builder("doc.pdf")
            .workers(Some(1))
            .progress_callback(Arc::clone(&tally) as ProgressCallback)
            .build()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let naming = Arc::new(OutputNaming::new(dir.path(), "doc", 1));
        run(sequence(6), plan_groups(6, 2), naming, &cfg)
            .await
            .unwrap();
        assert_eq!(tally.groups.load(Ordering::SeqCst), 3);
        assert_eq!(tally.chunks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn progress_fires_per_chunk_in_parallel_mode() {
        struct Chunks {
            seen: std::sync::Mutex<Vec<usize>>,
        }
        impl ConvertProgress for Chunks {
            fn on_chunk_complete(&self, completed: usize, _total: usize) {
                self.seen.lock().unwrap().push(completed);
            }
        }

        let chunks = Arc::new(Chunks {
            seen: std::sync::Mutex::new(Vec::new()),
        });
        let cfg = ConversionConfig::builder("doc.pdf")
            .workers(Some(2))
            .progress_callback(Arc::clone(&chunks) as ProgressCallback)
            .build()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let naming = Arc::new(OutputNaming::new(dir.path(), "doc", 1));
        // 5 groups at a cap of 2 → chunks of 2, 2, 1.
        run(sequence(10), plan_groups(10, 2), naming, &cfg)
            .await
            .unwrap();
        assert_eq!(*chunks.seen.lock().unwrap(), vec![2, 4, 5]);
    }
}
