//! Data types flowing through and out of the page pipeline.

use crate::config::OutputMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One page image, either rasterised from a PDF or found in an image folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 0-based position in document order.
    pub index: usize,
    /// Location of the page image on disk.
    pub path: PathBuf,
}

impl Page {
    /// Build the page list for an already ordered set of image paths.
    pub fn from_ordered(paths: impl IntoIterator<Item = PathBuf>) -> Vec<Page> {
        paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| Page { index, path })
            .collect()
    }
}

/// OCR output for one page.
///
/// `text` is exactly what the engine produced: no trimming, no
/// normalisation, control characters included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    /// 0-based index of the source [`Page`].
    pub index: usize,
    /// Image the text was recognised from.
    pub source: PathBuf,
    /// Raw recognised text.
    pub text: String,
    /// Wall-clock time spent in the OCR engine.
    pub duration_ms: u64,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages handed to the recogniser.
    pub total_pages: usize,
    /// Pages written to the output.
    pub processed_pages: usize,
    /// Time spent rasterising (0 when starting from an image folder).
    pub render_duration_ms: u64,
    /// Time spent recognising and assembling.
    pub ocr_duration_ms: u64,
    /// End-to-end time.
    pub total_duration_ms: u64,
    /// Written file.
    pub output_path: PathBuf,
    /// Format of the written file.
    pub output_mode: OutputMode,
}

/// Metadata of a PDF, read without rendering any page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
