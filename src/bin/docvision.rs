//! CLI binary for docvision.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig`, `Source` and `OutputTarget`, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use docvision::{
    convert, inspect, ConversionConfig, ConversionProgressCallback, OutputMode, OutputTarget,
    ProgressCallback, Source,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per page with
/// its OCR time.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Per-page wall-clock start times; several pages run at once.
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_conversion_start` tells us the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Rasterising pages…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Recognising");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, page_num: usize) -> f64 {
        self.start_times
            .lock()
            .map(|mut m| m.remove(&page_num))
            .ok()
            .flatten()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Starting OCR of {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(page_num, Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, text_len: usize) {
        let secs = self.elapsed_secs(page_num);
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{text_len:>5} chars")),
            dim(&format!("{secs:.2}s")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(page_num);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
            dim(&format!("{secs:.2}s")),
        ));
        self.bar.abandon();
    }

    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        self.bar.finish_and_clear();
        if self.errors.load(Ordering::SeqCst) == 0 {
            eprintln!(
                "{} {}/{} pages recognised",
                green("✔"),
                bold(&success_count.to_string()),
                total_pages
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Scanned PDF → scan.txt
  docvision scan.pdf scan

  # Scanned PDF → scan.docx
  docvision -d scan.pdf scan

  # Resume from the page images of an earlier run → book.docx
  docvision -ds scan.pdf.d book

  # German text, 300 DPI, 4 pages recognised at once
  docvision --lang deu --dpi 300 --jobs 4 scan.pdf scan

  # Inspect PDF metadata (no OCR)
  docvision --inspect-only scan.pdf

SIDE EFFECTS:
  Rasterising creates (or reuses) <TARGET>.d/ holding 0.jpg, 1.jpg, … in
  page order. It is never deleted; pass that folder with -s to re-run OCR
  without rendering again.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         libpdfium file or the directory holding it
  RUST_LOG                Log filter (overrides -v / -q)
  DOCVISION_*             Every option, e.g. DOCVISION_LANG=fra
"#;

/// OCR scanned PDFs and page-image folders into text or .docx.
#[derive(Parser, Debug)]
#[command(
    name = "docvision",
    version,
    about = "OCR scanned PDFs and page-image folders into text or .docx",
    long_about = "Rasterise every page of a scanned PDF, run Tesseract OCR on each page, and \
write the text to <OUTPUT_BASE>.txt (pages separated by blank lines) or \
<OUTPUT_BASE>.docx (one page per Word page).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file, or with -s a folder of page images.
    target: PathBuf,

    /// Output path without extension; .txt or .docx is appended.
    #[arg(required_unless_present = "inspect_only")]
    output_base: Option<PathBuf>,

    /// Write a .docx document instead of plain text.
    #[arg(short = 'd', long = "docx", env = "DOCVISION_DOCX")]
    docx: bool,

    /// Skip rasterisation: TARGET is a folder of page images.
    #[arg(short = 's', long = "skip-render", env = "DOCVISION_SKIP_RENDER")]
    skip_render: bool,

    /// Rasterisation DPI (1–1200).
    #[arg(long, env = "DOCVISION_DPI", default_value_t = docvision::config::DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(1..=1200))]
    dpi: u32,

    /// Tesseract language code(s), e.g. eng, deu, eng+fra.
    #[arg(short, long, env = "DOCVISION_LANG", default_value = docvision::config::DEFAULT_LANGUAGE)]
    lang: String,

    /// Pages recognised at once. Default: 70% of the CPUs.
    #[arg(short, long, env = "DOCVISION_JOBS")]
    jobs: Option<usize>,

    /// JPEG encoder workers while rasterising. 0 = one per CPU. Default: 70% of the CPUs.
    #[arg(long, env = "DOCVISION_RENDER_WORKERS")]
    render_workers: Option<usize>,

    /// Tesseract executable.
    #[arg(long, env = "DOCVISION_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "DOCVISION_PASSWORD")]
    password: Option<String>,

    /// Print PDF metadata only, no OCR.
    #[arg(long)]
    inspect_only: bool,

    /// Print run statistics as JSON on stdout.
    #[arg(long, env = "DOCVISION_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "DOCVISION_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCVISION_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCVISION_QUIET")]
    quiet: bool,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        if self.docx {
            OutputMode::RichText
        } else {
            OutputMode::PlainText
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs; verbose always wins.
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

    let target = std::path::absolute(&cli.target)
        .with_context(|| format!("Cannot resolve {:?}", cli.target))?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&target, cli.password.as_deref())
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", target.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
        }
        return Ok(());
    }

    // ── Resolve source and target ────────────────────────────────────────
    let output_base = cli
        .output_base
        .as_ref()
        .context("OUTPUT_BASE is required")?;
    let output_base = std::path::absolute(output_base)
        .with_context(|| format!("Cannot resolve {:?}", output_base))?;
    let output = OutputTarget::from_base(&output_base, cli.output_mode());
    let source = if cli.skip_render {
        Source::ImageFolder(target)
    } else {
        Source::Pdf(target)
    };

    if !cli.quiet {
        eprintln!(
            "{} {}  →  {} ({})",
            cyan("◆"),
            source.path().display(),
            bold(&output.path.display().to_string()),
            output.mode
        );
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let stats = convert(&source, &output, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {}/{} pages  render {}ms  ocr {}ms  →  {}",
            green("✔"),
            stats.processed_pages,
            stats.total_pages,
            dim(&stats.render_duration_ms.to_string()),
            dim(&stats.ocr_duration_ms.to_string()),
            bold(&stats.output_path.display().to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .language(cli.lang.clone())
        .tesseract_binary(cli.tesseract.clone());

    if let Some(jobs) = cli.jobs {
        builder = builder.ocr_concurrency(jobs);
    }
    if let Some(workers) = cli.render_workers {
        builder = builder.render_workers(workers);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
