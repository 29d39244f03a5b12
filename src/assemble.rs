//! Output assembly: ordered page texts → `.txt` or `.docx`.
//!
//! The two formats make opposite trade-offs on purpose:
//!
//! * **Plain text** is appended page by page and flushed after each one, so
//!   a long run can be watched (`tail -f`) and a crash keeps every page that
//!   was already recognised. The text is written byte for byte as the engine
//!   produced it.
//! * **Rich text** is built in memory and persisted once through a temp file
//!   and a rename: callers either see a complete document or none at all.
//!   Each page is one paragraph closed by a page break. Text is stripped of
//!   XML-illegal characters first (see
//!   [`crate::pipeline::sanitize`]).
//!
//! Both take the output path explicitly and recognise pages through
//! [`crate::pipeline::ocr::recognize_ordered`], so output order always
//! equals the order of the image list.

use crate::config::ConversionConfig;
use crate::engine::OcrEngine;
use crate::error::DocVisionError;
use crate::output::Page;
use crate::pipeline::ocr::recognize_ordered;
use crate::pipeline::sanitize::sanitize_xml_text;
use docx_rs::{BreakType, Docx, Paragraph, Run};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Written after every page of the plain-text output.
pub const PAGE_DELIMITER: &str = "\n\n\n";

/// Recognise `images` in order and append each page to `out_path`.
///
/// The file is created (or truncated) before the first page is recognised.
/// If a page fails the run stops; pages before it remain in the file.
///
/// # Returns
/// The number of pages written.
pub async fn assemble_text(
    images: &[PathBuf],
    out_path: &Path,
    engine: Arc<dyn OcrEngine>,
    config: &ConversionConfig,
) -> Result<usize, DocVisionError> {
    let write_err = |source: std::io::Error| DocVisionError::OutputWriteFailed {
        path: out_path.to_path_buf(),
        source,
    };

    create_parent_dir(out_path).await.map_err(write_err)?;
    let mut file = tokio::fs::File::create(out_path).await.map_err(write_err)?;
    info!("Writing detection result in {}", out_path.display());

    let pages = Page::from_ordered(images.iter().cloned());
    let mut texts = std::pin::pin!(recognize_ordered(
        pages,
        engine,
        config.ocr_concurrency,
        config.progress_callback.clone(),
    ));

    let mut written = 0;
    while let Some(result) = texts.next().await {
        let page = result?;
        file.write_all(page.text.as_bytes()).await.map_err(write_err)?;
        file.write_all(PAGE_DELIMITER.as_bytes())
            .await
            .map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
        debug!("Done writing page {}", page.index + 1);
        written += 1;
    }

    file.sync_all().await.map_err(write_err)?;
    Ok(written)
}

/// Recognise `images` in order and save them as one `.docx` at `out_path`.
///
/// Nothing is written unless every page succeeds.
///
/// # Returns
/// The number of pages written.
pub async fn assemble_rich_text(
    images: &[PathBuf],
    out_path: &Path,
    engine: Arc<dyn OcrEngine>,
    config: &ConversionConfig,
) -> Result<usize, DocVisionError> {
    info!("Writing detection result in {}", out_path.display());

    let pages = Page::from_ordered(images.iter().cloned());
    let mut texts = std::pin::pin!(recognize_ordered(
        pages,
        engine,
        config.ocr_concurrency,
        config.progress_callback.clone(),
    ));

    let mut document = RichTextDocument::new();
    while let Some(result) = texts.next().await {
        let page = result?;
        document.push_page(&page.text);
        debug!("Done writing page {}", page.index + 1);
    }

    let written = document.len();
    let path = out_path.to_path_buf();
    tokio::task::spawn_blocking(move || document.save(&path))
        .await
        .map_err(|e| DocVisionError::Internal(format!("Document write task panicked: {}", e)))??;
    Ok(written)
}

/// In-memory rich-text document: one sanitised paragraph per page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichTextDocument {
    pages: Vec<String>,
}

impl RichTextDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page. XML-illegal characters are dropped here.
    pub fn push_page(&mut self, text: &str) {
        self.pages.push(sanitize_xml_text(text));
    }

    /// Sanitised page texts, in order.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Lay the pages out as a Word document: one paragraph per page, ending
    /// in a page break.
    pub fn to_docx(&self) -> Docx {
        self.pages.iter().fold(Docx::new(), |docx, text| {
            docx.add_paragraph(
                text_paragraph(text).add_run(Run::new().add_break(BreakType::Page)),
            )
        })
    }

    /// Pack the document to `path` via `<path>.tmp` and a rename.
    pub fn save(&self, path: &Path) -> Result<(), DocVisionError> {
        let io_err = |source: std::io::Error| DocVisionError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp_path = PathBuf::from(tmp);

        let file = std::fs::File::create(&tmp_path).map_err(io_err)?;
        if let Err(e) = self.to_docx().build().pack(file) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(DocVisionError::DocumentWriteFailed {
                path: path.to_path_buf(),
                detail: e.to_string(),
            });
        }

        std::fs::rename(&tmp_path, path).map_err(io_err)?;
        debug!("Saved {} pages to {}", self.pages.len(), path.display());
        Ok(())
    }
}

/// One paragraph per page; line breaks and tabs inside the page become
/// `<w:br/>` and `<w:tab/>` so the page layout survives.
fn text_paragraph(text: &str) -> Paragraph {
    let normalised = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut run = Run::new();
    for (i, line) in normalised.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        for (j, cell) in line.split('\t').enumerate() {
            if j > 0 {
                run = run.add_tab();
            }
            if !cell.is_empty() {
                run = run.add_text(cell);
            }
        }
    }
    Paragraph::new().add_run(run)
}

async fn create_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => tokio::fs::create_dir_all(parent).await,
        None => Ok(()),
    }
}
