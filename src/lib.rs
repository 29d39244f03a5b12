//! # docvision
//!
//! Turn scanned PDFs into searchable text with OCR.
//!
//! Each PDF page is rasterised to a JPEG, every image is run through an OCR
//! engine (Tesseract by default), and the page texts are assembled into a
//! plain-text file or a paginated `.docx`. A folder of page images can be
//! processed directly, ordered the way a human numbers pages (`2.jpg`
//! before `10.jpg`).
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF ─────────────┐
//!                  ├─ 1. Input    extension / existence / %PDF checks
//!                  ├─ 2. Render   pdfium → <pdf>.d/0.jpg, 1.jpg, …
//! image folder ────┤  (2'. Sort   natural order instead of rendering)
//!                  ├─ 3. OCR      bounded-parallel, results in page order
//!                  └─ 4. Output   .txt (appended per page) or .docx (saved once)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docvision::{convert, ConversionConfig, OutputMode, OutputTarget, Source};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let source = Source::Pdf("scan.pdf".into());
//!     let target = OutputTarget::from_base("scan", OutputMode::RichText);
//!     let stats = convert(&source, &target, &config).await?;
//!     eprintln!("{} pages → {}", stats.processed_pages, stats.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docvision` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## External engines
//!
//! pdfium is loaded at runtime (`PDFIUM_LIB_PATH`, the working directory,
//! or the system loader). Tesseract is run as a child process; any other
//! engine can be plugged in through [`OcrEngine`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assemble::{assemble_rich_text, assemble_text, RichTextDocument, PAGE_DELIMITER};
pub use config::{ConversionConfig, ConversionConfigBuilder, OutputMode, OutputTarget, Source};
pub use convert::{convert, convert_sync, inspect, rasterize_only};
pub use engine::{OcrEngine, TesseractEngine};
pub use error::{DocVisionError, PageError};
pub use output::{ConversionStats, DocumentMetadata, Page, PageText};
pub use pipeline::budget::{compute_thread_budget, thread_budget, DEFAULT_CPU_FRACTION};
pub use pipeline::ocr::recognize_page;
pub use pipeline::render::rasterize;
pub use pipeline::sanitize::sanitize_xml_text;
pub use pipeline::sort::{natural_sort, natural_sort_paths};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{recognize_stream, PageStream};
