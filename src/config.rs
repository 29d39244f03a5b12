//! Configuration types for a docvision run.
//!
//! All pipeline behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Where the run reads from and writes
//! to is described separately by [`Source`] and [`OutputTarget`], so the
//! same config can drive several documents.

use crate::engine::{OcrEngine, TesseractEngine};
use crate::error::DocVisionError;
use crate::pipeline::budget::thread_budget;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default OCR language (Tesseract language code).
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Default rasterisation resolution.
pub const DEFAULT_DPI: u32 = 500;

/// Configuration for a docvision run.
///
/// # Example
/// ```rust
/// use docvision::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(300)
///     .language("deu")
///     .ocr_concurrency(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rasterisation resolution in dots per inch. Range: 1–1200. Default: 500.
    pub dpi: u32,

    /// Parallelism hint for the rasteriser. Default: [`thread_budget()`].
    ///
    /// `0` lets the rasteriser pick (host parallelism).
    pub render_workers: usize,

    /// Maximum pages recognised at once. Default: `max(1, thread_budget())`.
    pub ocr_concurrency: usize,

    /// OCR language code handed to the engine. Default: `eng`.
    pub language: String,

    /// Tesseract executable. Default: `tesseract` (resolved on `PATH`).
    pub tesseract_binary: PathBuf,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Pre-constructed OCR engine. Takes precedence over the Tesseract settings.
    pub engine: Option<Arc<dyn OcrEngine>>,

    /// Optional per-page progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        let budget = thread_budget();
        Self {
            dpi: DEFAULT_DPI,
            render_workers: budget,
            ocr_concurrency: budget.max(1),
            language: DEFAULT_LANGUAGE.to_string(),
            tesseract_binary: PathBuf::from("tesseract"),
            password: None,
            engine: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("render_workers", &self.render_workers)
            .field("ocr_concurrency", &self.ocr_concurrency)
            .field("language", &self.language)
            .field("tesseract_binary", &self.tesseract_binary)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("engine", &self.engine.as_ref().map(|e| e.name().to_string()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The engine this config recognises pages with.
    pub fn resolve_engine(&self) -> Arc<dyn OcrEngine> {
        match self.engine {
            Some(ref engine) => Arc::clone(engine),
            None => Arc::new(TesseractEngine::new(
                self.tesseract_binary.clone(),
                self.language.clone(),
            )),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(1, 1200);
        self
    }

    pub fn render_workers(mut self, n: usize) -> Self {
        self.config.render_workers = n;
        self
    }

    pub fn ocr_concurrency(mut self, n: usize) -> Self {
        self.config.ocr_concurrency = n.max(1);
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn tesseract_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_binary = path.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.engine = Some(engine);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, DocVisionError> {
        // dpi and ocr_concurrency are clamped by their setters.
        if self.config.language.trim().is_empty() {
            return Err(DocVisionError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Format of the assembled output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputMode {
    /// Plain UTF-8 text, pages separated by blank lines. (default)
    #[default]
    PlainText,
    /// Word document, one paragraph and one page break per page.
    RichText,
}

impl OutputMode {
    /// File extension (without the dot) for this mode.
    pub fn extension(self) -> &'static str {
        match self {
            OutputMode::PlainText => "txt",
            OutputMode::RichText => "docx",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::PlainText => f.write_str("txt"),
            OutputMode::RichText => f.write_str("docx"),
        }
    }
}

/// Where a run reads its pages from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A PDF to rasterise first.
    Pdf(PathBuf),
    /// A folder of already rasterised page images.
    ImageFolder(PathBuf),
}

impl Source {
    pub fn path(&self) -> &Path {
        match self {
            Source::Pdf(p) | Source::ImageFolder(p) => p,
        }
    }
}

/// Where and in which format a run writes its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub mode: OutputMode,
    pub path: PathBuf,
}

impl OutputTarget {
    /// Target an explicit file path.
    pub fn new(mode: OutputMode, path: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            path: path.into(),
        }
    }

    /// Append the mode's extension to a base name: `out` → `out.txt`.
    ///
    /// The base is extended, not re-extended, so `scan.v2` becomes
    /// `scan.v2.docx` rather than `scan.docx`.
    pub fn from_base(base: impl AsRef<Path>, mode: OutputMode) -> Self {
        let mut name = base.as_ref().as_os_str().to_owned();
        name.push(".");
        name.push(mode.extension());
        Self {
            mode,
            path: PathBuf::from(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps_dpi() {
        let config = ConversionConfig::builder().dpi(5000).build().unwrap();
        assert_eq!(config.dpi, 1200);
        let config = ConversionConfig::builder().dpi(0).build().unwrap();
        assert_eq!(config.dpi, 1);
        let config = ConversionConfig::builder().dpi(1200).build().unwrap();
        assert_eq!(config.dpi, 1200);
    }

    #[test]
    fn builder_rejects_empty_language() {
        let err = ConversionConfig::builder().language("  ").build().unwrap_err();
        assert!(matches!(err, DocVisionError::InvalidConfig(_)));
    }

    #[test]
    fn ocr_concurrency_never_zero() {
        let config = ConversionConfig::builder().ocr_concurrency(0).build().unwrap();
        assert_eq!(config.ocr_concurrency, 1);
        assert!(ConversionConfig::default().ocr_concurrency >= 1);
    }

    #[test]
    fn output_target_from_base_appends_extension() {
        let t = OutputTarget::from_base("/tmp/report", OutputMode::PlainText);
        assert_eq!(t.path, PathBuf::from("/tmp/report.txt"));
        let t = OutputTarget::from_base("/tmp/scan.v2", OutputMode::RichText);
        assert_eq!(t.path, PathBuf::from("/tmp/scan.v2.docx"));
    }

    #[test]
    fn debug_redacts_password() {
        let config = ConversionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("redacted"));
    }

    #[test]
    fn default_engine_is_tesseract() {
        let engine = ConversionConfig::default().resolve_engine();
        assert_eq!(engine.name(), "tesseract");
    }
}
