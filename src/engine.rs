//! OCR engines.
//!
//! The pipeline only needs "image in, text out", so every engine sits behind
//! the small [`OcrEngine`] trait. [`TesseractEngine`] drives the `tesseract`
//! command-line tool; tests and embedders can plug in their own engine via
//! [`crate::config::ConversionConfigBuilder::engine`].

use crate::error::PageError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Recognises the text of one page image.
///
/// Implementations are called from blocking worker threads, possibly
/// several at once, so they must be `Send + Sync`. They report errors with
/// page index `0`; the pipeline re-attributes them to the right page.
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Return the raw recognised text of `image`.
    fn recognize(&self, image: &Path) -> Result<String, PageError>;
}

/// OCR via the Tesseract CLI: `tesseract <image> stdout -l <language>`.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    fn command(&self, image: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(image).arg("stdout").args(["-l", &self.language]);
        cmd
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract", crate::config::DEFAULT_LANGUAGE)
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &Path) -> Result<String, PageError> {
        debug!(
            "Running {} on {} (lang={})",
            self.binary.display(),
            image.display(),
            self.language
        );
        match self.command(image).output() {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(PageError::EngineFailed {
                    page: 0,
                    detail: format!("tesseract exited with {}: {}", output.status, stderr.trim()),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PageError::EngineUnavailable {
                    page: 0,
                    engine: "tesseract".to_string(),
                    hint: format!(
                        "'{}' not found (install tesseract-ocr or pass --tesseract)",
                        self.binary.display()
                    ),
                })
            }
            Err(e) => Err(PageError::EngineFailed {
                page: 0,
                detail: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_layout() {
        let engine = TesseractEngine::new("/opt/tess", "fra");
        let cmd = engine.command(Path::new("/tmp/3.jpg"));
        assert_eq!(cmd.get_program(), "/opt/tess");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["/tmp/3.jpg", "stdout", "-l", "fra"]);
    }

    #[test]
    fn missing_binary_is_unavailable() {
        let engine = TesseractEngine::new("/definitely/not/tesseract", "eng");
        let err = engine.recognize(Path::new("x.jpg")).unwrap_err();
        assert!(matches!(err, PageError::EngineUnavailable { .. }), "got {err:?}");
    }

    #[test]
    fn default_language_is_english() {
        assert_eq!(TesseractEngine::default().language(), "eng");
    }
}
