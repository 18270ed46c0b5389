//! CLI binary for pdf2up.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints the written paths.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2up::{convert, ConversionConfig, ConvertProgress, ProgressCallback};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the planned groups, advanced per
/// group in sequential mode and per chunk barrier in parallel mode.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Create a callback whose bar length is set by `on_run_start` once the
    /// group count is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Cropping margins and rendering…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConvertProgress for CliProgress {
    fn on_run_start(&self, total_groups: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} groups  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_groups as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Compositing");
        self.bar.set_message("");
    }

    fn on_group_written(&self, group_index: usize, _total: usize, path: &Path) {
        self.bar.println(format!(
            "  {} group {:>3}  →  {}",
            green("✓"),
            group_index,
            dim(&path.display().to_string())
        ));
        self.bar.inc(1);
    }

    fn on_chunk_complete(&self, completed: usize, _total: usize) {
        self.bar.set_position(completed as u64);
    }

    fn on_run_complete(&self, total_groups: usize, written: usize) {
        self.bar.finish_and_clear();
        if written == total_groups {
            eprintln!(
                "{} {} composite image(s) written",
                green("✔"),
                bold(&written.to_string())
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # 2-up preview of the first 8 pages
  pdf2up paper.pdf

  # Every page, skipping the title page
  pdf2up --all --skip 1 paper.pdf

  # Trim 10px from all four sides of each composite
  pdf2up -b 10 paper.pdf

  # Explicit left/top/right/bottom trim, 3 pages per image
  pdf2up -b 20 10 20 30 -n 3 paper.pdf

  # Sequential run for debugging, no progress bar
  pdf2up -c 1 --no-progress paper.pdf

FILES:
  paper_cropped.pdf   intermediate margin-cropped PDF (left on disk)
  paper_<i>.png       one composite per page group, zero-padded index

SETUP:
  pdf2up shells out to pdfCropMargins for whitespace trimming:
    pip install pdfCropMargins
  Page rendering binds the pdfium library via pdfium-render; point
  PDFIUM_DYNAMIC_LIB_PATH at your libpdfium if it is not on the default
  search path.
"#;

/// Convert a PDF into N-up PNG preview images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2up",
    version,
    about = "Convert a PDF into N-up PNG preview images",
    long_about = "Crop whitespace margins, render pages at 300 DPI, paste N consecutive pages \
side-by-side into composite PNGs, and write them next to the input with deterministic \
zero-padded names.",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF file.
    input: PathBuf,

    /// Crop box margins in px: one value (all sides), two (left/right,
    /// top/bottom), or four (left, top, right, bottom).
    #[arg(short = 'b', long = "box", num_args = 1..=4, value_name = "PX")]
    crop_box: Option<Vec<u32>>,

    /// Process all pages instead of the default first 4 groups (an unpaired
    /// trailing page is dropped).
    #[arg(long = "all")]
    all_pages: bool,

    /// Number of leading pages to skip.
    #[arg(short, long, env = "PDF2UP_SKIP", default_value_t = 0)]
    skip: usize,

    /// Pages pasted side-by-side per output image (minimum 2).
    #[arg(short = 'n', long, env = "PDF2UP_GROUP_SIZE", default_value_t = 2)]
    group_size: usize,

    /// Worker cap for parallel compositing; 1 forces sequential execution.
    /// Default: all cores.
    #[arg(short = 'c', long, env = "PDF2UP_CORES")]
    cores: Option<usize>,

    /// Rasterisation DPI.
    #[arg(long, env = "PDF2UP_DPI", default_value_t = pdf2up::DEFAULT_DPI)]
    dpi: u32,

    /// Override the margin-cropping executable.
    #[arg(long, env = "PDF2UP_CROPPER", value_name = "PROGRAM")]
    cropper: Option<PathBuf>,

    /// Print the result as JSON (paths + stats) instead of plain paths.
    #[arg(long, env = "PDF2UP_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PDF2UP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2UP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2UP_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active; the
    // bar provides all the feedback that matters. Verbose wins regardless.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgress::new_dynamic() as Arc<dyn ConvertProgress>)
    } else {
        None
    };

    let mut builder = ConversionConfig::builder(&cli.input)
        .all_pages(cli.all_pages)
        .skip(cli.skip)
        .group_size(cli.group_size)
        .workers(cli.cores)
        .dpi(cli.dpi);
    if let Some(ref values) = cli.crop_box {
        builder = builder.crop_box(values);
    }
    if let Some(ref program) = cli.cropper {
        builder = builder.cropper_program(program);
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&config).await.context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        for path in &output.outputs {
            writeln!(handle, "{}", path.display()).context("Failed to write to stdout")?;
        }
    }

    if !cli.quiet && !cli.json {
        let s = &output.stats;
        eprintln!(
            "   {} pages rendered  /  {} composites written  —  {}ms total",
            dim(&s.rendered_pages.to_string()),
            dim(&s.groups_written.to_string()),
            s.total_duration_ms,
        );
        if s.dropped_pages > 0 {
            eprintln!("   {} unpaired trailing page(s) dropped", s.dropped_pages);
        }
    }

    Ok(())
}
