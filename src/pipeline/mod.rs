//! Pipeline stages for scanned-document OCR.
//!
//! One submodule per step. Assembly of the final document lives in
//! [`crate::assemble`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ (sort) ──▶ ocr ──▶ sanitize ──▶ assemble
//! (checks)  (pdfium)  (folders)  (engine)  (docx only)
//! ```
//!
//! 1. [`input`]    — fail fast on wrong extension, missing file, non-PDF
//! 2. [`render`]   — rasterise every page to `<pdf>.d/<n>.jpg`
//! 3. [`sort`]     — natural ordering when starting from an image folder
//! 4. [`ocr`]      — bounded-parallel recognition, results in page order
//! 5. [`sanitize`] — drop characters that are illegal in XML
//!
//! [`budget`] sizes the worker pools for the CPU-bound stages.

pub mod budget;
pub mod input;
pub mod ocr;
pub mod render;
pub mod sanitize;
pub mod sort;

use std::fmt::Display;
use std::time::{Duration, Instant};
use tracing::info;

/// Run `f`, log how long it took, and hand back the elapsed time.
pub(crate) fn timed<T>(label: impl Display, f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let out = f();
    let elapsed = start.elapsed();
    info!("{} executed in {:.2} seconds", label, elapsed.as_secs_f64());
    (out, elapsed)
}
