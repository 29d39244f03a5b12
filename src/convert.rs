//! Eager (whole-document) entry points.
//!
//! [`convert`] drives the full pipeline for one [`Source`]: rasterise the PDF
//! (or list and naturally sort an image folder), recognise every page, and
//! assemble the result at the given [`OutputTarget`]. Use
//! [`crate::stream::recognize_stream`] instead when you want page texts as
//! they complete rather than a file on disk.

use crate::assemble::{assemble_rich_text, assemble_text};
use crate::config::{ConversionConfig, OutputMode, OutputTarget, Source};
use crate::error::DocVisionError;
use crate::output::{ConversionStats, DocumentMetadata, Page};
use crate::pipeline::{input, render, sort};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// OCR `source` and write the assembled result to `target`.
///
/// # Errors
/// Precondition failures (wrong extension, missing input, empty folder) are
/// returned before any work starts. Any rasterisation or page failure aborts
/// the run: for [`OutputMode::PlainText`] the pages recognised so far stay
/// in the output file, for [`OutputMode::RichText`] nothing is written.
pub async fn convert(
    source: &Source,
    target: &OutputTarget,
    config: &ConversionConfig,
) -> Result<ConversionStats, DocVisionError> {
    let total_start = Instant::now();
    info!("Target file(s): {}", source.path().display());

    // ── Step 1: Resolve pages ────────────────────────────────────────────
    let (pages, render_duration_ms) = resolve_pages(source, config).await?;
    let total_pages = pages.len();
    let images: Vec<_> = pages.into_iter().map(|p| p.path).collect();

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total_pages);
    }

    // ── Step 2: Recognise and assemble ───────────────────────────────────
    let engine = config.resolve_engine();
    debug!("Recognising with {} ({} at once)", engine.name(), config.ocr_concurrency);
    let ocr_start = Instant::now();
    let processed = match target.mode {
        OutputMode::PlainText => assemble_text(&images, &target.path, engine, config).await?,
        OutputMode::RichText => assemble_rich_text(&images, &target.path, engine, config).await?,
    };
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;

    let stats = ConversionStats {
        total_pages,
        processed_pages: processed,
        render_duration_ms,
        ocr_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        output_path: target.path.clone(),
        output_mode: target.mode,
    };

    info!(
        "Conversion complete: {}/{} pages, {}ms total → {}",
        processed,
        total_pages,
        stats.total_duration_ms,
        target.path.display()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total_pages, processed);
    }

    Ok(stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    source: &Source,
    target: &OutputTarget,
    config: &ConversionConfig,
) -> Result<ConversionStats, DocVisionError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DocVisionError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(source, target, config))
}

/// Rasterise `pdf_path` into `<pdf>.d/` without running OCR.
///
/// The returned pages can be fed back later as
/// [`Source::ImageFolder`] on the scratch directory.
pub async fn rasterize_only(
    pdf_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<Vec<Page>, DocVisionError> {
    let (pages, render_duration_ms) =
        resolve_pages(&Source::Pdf(pdf_path.as_ref().to_path_buf()), config).await?;
    debug!("Rasterised without OCR in {}ms", render_duration_ms);
    Ok(pages)
}

/// Extract PDF metadata without rendering or recognising anything.
pub async fn inspect(
    pdf_path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, DocVisionError> {
    render::extract_metadata(pdf_path.as_ref(), password).await
}

/// Turn a source into its ordered page list.
///
/// # Returns
/// The pages and the time spent rasterising (0 for image folders).
pub(crate) async fn resolve_pages(
    source: &Source,
    config: &ConversionConfig,
) -> Result<(Vec<Page>, u64), DocVisionError> {
    match source {
        Source::Pdf(pdf) => {
            let render_start = Instant::now();
            let pages = render::rasterize(pdf, config).await?;
            let render_duration_ms = render_start.elapsed().as_millis() as u64;
            info!(
                "Rasterised {} pages in {:.2} seconds",
                pages.len(),
                render_duration_ms as f64 / 1000.0
            );
            Ok((pages, render_duration_ms))
        }
        Source::ImageFolder(dir) => {
            let dir = input::validate_image_folder(dir)?;
            info!("Skipping pdf to images conversion");
            let images = sort::collect_images(&dir)?;
            if images.is_empty() {
                return Err(DocVisionError::NoImages { path: dir });
            }
            Ok((Page::from_ordered(images), 0))
        }
    }
}
