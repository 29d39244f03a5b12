//! Per-page OCR progress events.
//!
//! A run reports five kinds of event through [`ConversionProgressCallback`]:
//!
//! ```text
//! on_conversion_start(n)                   page list known, nothing recognised yet
//!   on_page_start(i, n)                    page i handed to the engine
//!   on_page_complete(i, n, len) | on_page_error(i, n, msg)
//! on_conversion_complete(n, written)       output file finished
//! ```
//!
//! Page numbers are 1-based. Up to `ocr_concurrency` pages are recognised
//! at once, so `on_page_start` may run ahead of the others; results are
//! reported in page order, matching the order pages reach the output. A
//! page error ends the run, so `on_conversion_complete` only follows a
//! fully written output.
//!
//! Hook one in with
//! [`crate::config::ConversionConfigBuilder::progress_callback`]:
//!
//! ```rust
//! use docvision::{ConversionConfig, ConversionProgressCallback};
//! use std::sync::Arc;
//!
//! struct PageLog;
//!
//! impl ConversionProgressCallback for PageLog {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
//!         eprintln!("{page_num}/{total_pages}: {text_len} bytes of text");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(PageLog))
//!     .build()
//!     .unwrap();
//! assert!(config.progress_callback.is_some());
//! ```

use std::sync::Arc;

/// Receiver for OCR progress events. Every method defaults to a no-op.
///
/// Called from the task driving the run; keep implementations cheap.
pub trait ConversionProgressCallback: Send + Sync {
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// `text_len` is the byte length of the raw recognised text.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let _ = (page_num, total_pages, text_len);
    }

    /// `error` is the rendered [`crate::error::PageError`].
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// `success_count` is the number of pages in the output.
    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// Ignores every event.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Shared callback handle as stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::OcrEngine;
    use crate::error::PageError;
    use crate::output::Page;
    use crate::pipeline::ocr::recognize_ordered;
    use futures::StreamExt;
    use image::{Rgb, RgbImage};
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct EventLog {
        events: Mutex<Vec<String>>,
    }

    impl EventLog {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl ConversionProgressCallback for EventLog {
        fn on_page_start(&self, page_num: usize, _total: usize) {
            self.events.lock().unwrap().push(format!("start {page_num}"));
        }

        fn on_page_complete(&self, page_num: usize, _total: usize, text_len: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {page_num} ({text_len})"));
        }

        fn on_page_error(&self, page_num: usize, _total: usize, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error {page_num}: {error}"));
        }
    }

    /// Page `n` takes `300 - 100n` ms, so later pages finish first. Page
    /// stems listed in `fail` are reported as engine failures.
    struct SlowFirstEngine {
        fail: &'static [&'static str],
    }

    impl OcrEngine for SlowFirstEngine {
        fn name(&self) -> &str {
            "slow-first"
        }

        fn recognize(&self, image: &Path) -> Result<String, PageError> {
            let stem = image.file_stem().unwrap().to_string_lossy().into_owned();
            let n: u64 = stem.parse().unwrap();
            std::thread::sleep(Duration::from_millis(300u64.saturating_sub(n * 100)));
            if self.fail.contains(&stem.as_str()) {
                return Err(PageError::EngineFailed {
                    page: 0,
                    detail: "blank scan".into(),
                });
            }
            Ok(format!("t{stem}"))
        }
    }

    fn pages(dir: &Path, n: usize) -> Vec<Page> {
        Page::from_ordered((0..n).map(|i| {
            let p = dir.join(format!("{i}.jpg"));
            RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])).save(&p).unwrap();
            p
        }))
    }

    #[tokio::test]
    async fn results_reported_in_page_order_despite_completion_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(EventLog::default());
        let engine: Arc<dyn OcrEngine> = Arc::new(SlowFirstEngine { fail: &[] });

        let texts: Vec<String> = recognize_ordered(
            pages(dir.path(), 3),
            engine,
            3,
            Some(log.clone() as ProgressCallback),
        )
        .map(|r| r.unwrap().text)
        .collect()
        .await;

        assert_eq!(texts, ["t0", "t1", "t2"]);
        let events = log.take();
        let done: Vec<&String> = events.iter().filter(|e| e.starts_with("done")).collect();
        assert_eq!(done, ["done 1 (2)", "done 2 (2)", "done 3 (2)"]);
        // All three were dispatched before the first result came back.
        assert_eq!(&events[..3], ["start 1", "start 2", "start 3"]);
    }

    #[tokio::test]
    async fn page_error_reported_with_its_own_page_number() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(EventLog::default());
        let engine: Arc<dyn OcrEngine> = Arc::new(SlowFirstEngine { fail: &["1"] });

        let results: Vec<_> = recognize_ordered(
            pages(dir.path(), 3),
            engine,
            3,
            Some(log.clone() as ProgressCallback),
        )
        .collect()
        .await;

        assert!(results[1].is_err());
        let reported: Vec<String> = log
            .take()
            .into_iter()
            .filter(|e| !e.starts_with("start"))
            .collect();
        assert_eq!(
            reported,
            [
                "done 1 (2)".to_string(),
                "error 2: Page 2: OCR failed: blank scan".to_string(),
                "done 3 (2)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn noop_callback_leaves_results_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let engine: Arc<dyn OcrEngine> = Arc::new(SlowFirstEngine { fail: &[] });
        let with_noop: Vec<_> = recognize_ordered(
            pages(dir.path(), 2),
            engine,
            2,
            Some(Arc::new(NoopProgressCallback) as ProgressCallback),
        )
        .map(|r| r.unwrap().index)
        .collect()
        .await;
        assert_eq!(with_noop, [0, 1]);
    }
}
