//! Error types for the docvision library.
//!
//! Two error types reflect two scopes of failure:
//!
//! * [`DocVisionError`] — **Fatal**: the run cannot continue (bad input
//!   path, unreadable PDF, output file not writable). Returned as
//!   `Err(DocVisionError)` from the top-level `convert*` functions.
//!
//! * [`PageError`] — a single page could not be recognised (corrupt image,
//!   OCR engine failure). The eager pipeline wraps it in
//!   [`DocVisionError::PageFailed`] and aborts; the streaming API hands it
//!   to the caller as a stream item so the caller picks its own tolerance.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docvision library.
#[derive(Debug, Error)]
pub enum DocVisionError {
    // ── Precondition errors ───────────────────────────────────────────────
    /// The input does not carry a `.pdf` extension.
    #[error("Expected a .pdf file, got '{path}'\nUse -s to process a folder of page images instead.")]
    UnsupportedExtension { path: PathBuf },

    /// Input file or folder was not found at the given path.
    #[error("Input not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// Image-folder mode was given something that is not a directory.
    #[error("Not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// Image-folder mode found nothing to recognise.
    #[error("No page images found in '{path}'")]
    NoImages { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH to the directory holding libpdfium,\n\
or install pdfium where the system loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Scratch directory errors ──────────────────────────────────────────
    /// A rendered page could not be encoded or saved as JPEG.
    #[error("Failed to write page image '{path}': {source}")]
    ImageWriteFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The `<pdf>.d/` scratch directory could not be created.
    #[error("Failed to create scratch directory '{path}': {source}")]
    ScratchDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Recognition errors ────────────────────────────────────────────────
    /// A page failed; the run is aborted.
    #[error(transparent)]
    PageFailed(#[from] PageError),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or append to the plain-text output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The .docx container could not be packed.
    #[error("Failed to write document '{path}': {detail}")]
    DocumentWriteFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// An error for a single page.
///
/// `page` is the 0-based page index; messages show it 1-based.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The page image is missing, unreadable or not a decodable image.
    #[error("Page {}: cannot read image '{}': {detail}", .page + 1, .path.display())]
    ImageUnreadable {
        page: usize,
        path: PathBuf,
        detail: String,
    },

    /// The OCR engine could not be started at all.
    #[error("Page {}: OCR engine '{engine}' unavailable: {hint}", .page + 1)]
    EngineUnavailable {
        page: usize,
        engine: String,
        hint: String,
    },

    /// The OCR engine ran and reported a failure.
    #[error("Page {}: OCR failed: {detail}", .page + 1)]
    EngineFailed { page: usize, detail: String },
}

impl PageError {
    /// 0-based index of the page this error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::ImageUnreadable { page, .. }
            | PageError::EngineUnavailable { page, .. }
            | PageError::EngineFailed { page, .. } => *page,
        }
    }

    /// Re-attribute an engine error to the page it occurred on.
    ///
    /// Engines only see an image path; the pipeline knows the index.
    pub(crate) fn at_page(self, index: usize) -> Self {
        match self {
            PageError::ImageUnreadable { path, detail, .. } => PageError::ImageUnreadable {
                page: index,
                path,
                detail,
            },
            PageError::EngineUnavailable { engine, hint, .. } => PageError::EngineUnavailable {
                page: index,
                engine,
                hint,
            },
            PageError::EngineFailed { detail, .. } => PageError::EngineFailed {
                page: index,
                detail,
            },
        }
    }
}
