//! Streaming API: emit page texts as they are recognised.
//!
//! Unlike [`crate::convert::convert`], which writes a file and returns only
//! at the end, [`recognize_stream`] yields one `PageText` per page as soon
//! as its OCR finishes. Pages arrive in completion order, not page order;
//! sort by `index` if order matters. Page failures are stream items, so the
//! caller decides whether one bad page ends the run.

use crate::config::{ConversionConfig, Source};
use crate::convert::resolve_pages;
use crate::error::{DocVisionError, PageError};
use crate::output::PageText;
use crate::pipeline::ocr::recognize_page;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of page results.
pub type PageStream = Pin<Box<dyn Stream<Item = Result<PageText, PageError>> + Send>>;

/// Resolve `source` to pages and recognise them, streaming results.
///
/// Rasterisation (for PDFs) completes before the stream is returned; only
/// recognition is lazy. At most `config.ocr_concurrency` pages are
/// recognised at once.
///
/// # Returns
/// - `Ok(PageStream)` — a stream of `Result<PageText, PageError>`
/// - `Err(DocVisionError)` — fatal error before recognition (bad input, render failure)
pub async fn recognize_stream(
    source: &Source,
    config: &ConversionConfig,
) -> Result<PageStream, DocVisionError> {
    info!("Starting streaming recognition: {}", source.path().display());

    let (pages, _) = resolve_pages(source, config).await?;
    let engine = config.resolve_engine();

    let s = stream::iter(pages.into_iter().map(move |page| {
        let engine = Arc::clone(&engine);
        async move { recognize_page(&engine, &page).await }
    }))
    .buffer_unordered(config.ocr_concurrency.max(1));

    Ok(Box::pin(s))
}
