//! Page recognition: one image in, one [`PageText`] out.
//!
//! Engines are blocking (Tesseract is a child process, most native OCR
//! libraries are synchronous), so every call runs on Tokio's blocking pool.
//! Several pages may be in flight at once; [`recognize_ordered`] hands the
//! results back strictly in page order.

use crate::engine::OcrEngine;
use crate::error::PageError;
use crate::output::{Page, PageText};
use crate::pipeline::timed;
use crate::progress::ProgressCallback;
use futures::stream::{self, Stream, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Recognise a single page.
///
/// The image header is decoded first so that a missing or corrupt file is
/// reported as [`PageError::ImageUnreadable`] instead of whatever the engine
/// prints. The engine call is timed; the timing is logged and stored in
/// [`PageText::duration_ms`] but never changes the result.
pub async fn recognize_page(
    engine: &Arc<dyn OcrEngine>,
    page: &Page,
) -> Result<PageText, PageError> {
    let engine = Arc::clone(engine);
    let page = page.clone();
    let index = page.index;

    tokio::task::spawn_blocking(move || {
        check_readable(index, &page.path)?;
        let label = format!("OCR of page {} ({})", index + 1, page.path.display());
        let (result, elapsed) = timed(&label, || engine.recognize(&page.path));
        let text = result.map_err(|e| e.at_page(index))?;
        debug!("Page {}: {} chars", index + 1, text.chars().count());
        Ok(PageText {
            index,
            source: page.path,
            text,
            duration_ms: elapsed.as_millis() as u64,
        })
    })
    .await
    .map_err(|e| PageError::EngineFailed {
        page: index,
        detail: format!("recognition task panicked: {e}"),
    })?
}

/// Recognise `pages` with at most `concurrency` in flight, yielding results
/// in the order of `pages`.
///
/// `on_page_start` fires as a page is dispatched, so several pages may be
/// started at once. `on_page_complete` and `on_page_error` fire as results
/// leave the reordering buffer, i.e. in page order. Page numbers are
/// 1-indexed.
pub fn recognize_ordered(
    pages: Vec<Page>,
    engine: Arc<dyn OcrEngine>,
    concurrency: usize,
    progress: Option<ProgressCallback>,
) -> impl Stream<Item = Result<PageText, PageError>> + Send {
    let total = pages.len();
    let on_start = progress.clone();
    stream::iter(pages)
        .map(move |page| {
            let engine = Arc::clone(&engine);
            if let Some(ref cb) = on_start {
                cb.on_page_start(page.index + 1, total);
            }
            async move { recognize_page(&engine, &page).await }
        })
        .buffered(concurrency.max(1))
        .inspect(move |result| {
            if let Some(ref cb) = progress {
                match result {
                    Ok(pt) => cb.on_page_complete(pt.index + 1, total, pt.text.len()),
                    Err(e) => cb.on_page_error(e.page() + 1, total, &e.to_string()),
                }
            }
        })
}

fn check_readable(index: usize, path: &Path) -> Result<(), PageError> {
    let unreadable = |detail: String| PageError::ImageUnreadable {
        page: index,
        path: path.to_path_buf(),
        detail,
    };
    image::ImageReader::open(path)
        .map_err(|e| unreadable(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| unreadable(e.to_string()))?
        .into_dimensions()
        .map_err(|e| unreadable(e.to_string()))?;
    Ok(())
}
