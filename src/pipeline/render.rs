//! PDF rasterisation: render every page to `<pdf>.d/<index>.jpg` via pdfium.
//!
//! ## Threading
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! Rendering runs on a dedicated blocking thread; each finished bitmap is
//! handed through a small bounded channel to JPEG encoder tasks, at most
//! `render_workers` of them at a time. Pdfium serialises access to a
//! document, so only the encoding side runs in parallel.

use crate::config::ConversionConfig;
use crate::error::DocVisionError;
use crate::output::{DocumentMetadata, Page};
use crate::pipeline::budget::effective_workers;
use crate::pipeline::input;
use futures::{StreamExt, TryStreamExt};
use image::{DynamicImage, ImageFormat};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

/// Scratch directory for a PDF's page images: `<pdf path>.d`.
pub fn scratch_dir_for(pdf_path: &Path) -> PathBuf {
    let mut dir = pdf_path.as_os_str().to_owned();
    dir.push(".d");
    PathBuf::from(dir)
}

/// Create `dir` if absent. An existing directory is reused; anything else
/// (a plain file in the way, permission denied, disk full) is an error.
pub fn ensure_scratch_dir(dir: &Path) -> Result<(), DocVisionError> {
    match std::fs::create_dir(dir) {
        Ok(()) => {
            debug!("Created scratch directory {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && dir.is_dir() => {
            debug!("Reusing scratch directory {}", dir.display());
            Ok(())
        }
        Err(source) => Err(DocVisionError::ScratchDirFailed {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Rasterise every page of `pdf_path` into its scratch directory.
///
/// The input is validated before anything is created on disk. Any pdfium
/// or encoder failure aborts the whole call; pages written so far stay on
/// disk but are not returned.
///
/// # Returns
/// One [`Page`] per PDF page, in document order.
pub async fn rasterize(
    pdf_path: &Path,
    config: &ConversionConfig,
) -> Result<Vec<Page>, DocVisionError> {
    let pdf = input::validate_pdf(pdf_path)?;
    let scratch = scratch_dir_for(&pdf);
    ensure_scratch_dir(&scratch)?;

    let workers = effective_workers(config.render_workers);
    let dpi = config.dpi;
    let password = config.password.clone();
    info!(
        "Converting {} to images at {} DPI with {} worker(s)",
        pdf.display(),
        dpi,
        workers
    );

    // Capacity 1 keeps at most `workers + 2` full-resolution bitmaps alive.
    let (tx, rx) = mpsc::channel::<(usize, DynamicImage)>(1);
    let producer = tokio::task::spawn_blocking(move || {
        render_pages_blocking(&pdf, dpi, password.as_deref(), tx)
    });

    let saved: Result<Vec<Page>, DocVisionError> = ReceiverStream::new(rx)
        .map(|(index, image)| save_page(scratch.clone(), index, image))
        .buffer_unordered(workers)
        .try_collect()
        .await;

    let rendered = producer
        .await
        .map_err(|e| DocVisionError::Internal(format!("Render task panicked: {}", e)))?;

    let mut pages = saved?;
    let total = rendered?;
    pages.sort_by_key(|p| p.index);
    debug_assert_eq!(pages.len(), total);
    info!("Converting from pdf to images is successful: {} pages", total);
    Ok(pages)
}

/// Encode one page as JPEG on the blocking pool.
async fn save_page(
    dir: PathBuf,
    index: usize,
    image: DynamicImage,
) -> Result<Page, DocVisionError> {
    tokio::task::spawn_blocking(move || {
        let path = dir.join(format!("{index}.jpg"));
        // JPEG has no alpha channel; pdfium hands out RGBA.
        image
            .to_rgb8()
            .save_with_format(&path, ImageFormat::Jpeg)
            .map_err(|source| DocVisionError::ImageWriteFailed {
                path: path.clone(),
                source,
            })?;
        debug!("Saved page {} at {}", index + 1, path.display());
        Ok(Page { index, path })
    })
    .await
    .map_err(|e| DocVisionError::Internal(format!("Encode task panicked: {}", e)))?
}

/// Blocking render loop. Returns the number of pages rendered.
fn render_pages_blocking(
    pdf_path: &Path,
    dpi: u32,
    password: Option<&str>,
    tx: mpsc::Sender<(usize, DynamicImage)>,
) -> Result<usize, DocVisionError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);

    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            DocVisionError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        if tx.blocking_send((idx, image)).is_err() {
            // The writer side bailed out; its error is the one to report.
            return Err(DocVisionError::Internal(
                "page writer stopped before rendering finished".into(),
            ));
        }
    }

    Ok(total_pages)
}

/// Bind pdfium from `PDFIUM_LIB_PATH` (library file or its directory), the
/// working directory, or the system loader, in that order.
fn bind_pdfium() -> Result<Pdfium, DocVisionError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => {
            let path = PathBuf::from(&p);
            let lib = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            Pdfium::bind_to_library(&lib)
        }
        _ => Pdfium::bind_to_library(&Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| DocVisionError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, DocVisionError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                DocVisionError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                DocVisionError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            DocVisionError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Read document metadata without rendering any page.
pub async fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, DocVisionError> {
    let path = input::validate_pdf(pdf_path)?;
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| DocVisionError::Internal(format!("Metadata task panicked: {}", e)))?
}

fn extract_metadata_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, DocVisionError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;

    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_dir_appends_suffix() {
        assert_eq!(
            scratch_dir_for(Path::new("/data/scan.pdf")),
            PathBuf::from("/data/scan.pdf.d")
        );
    }

    #[test]
    fn scratch_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("doc.pdf.d");
        ensure_scratch_dir(&dir).unwrap();
        std::fs::write(dir.join("0.jpg"), b"old").unwrap();
        ensure_scratch_dir(&dir).unwrap();
        assert!(dir.join("0.jpg").exists(), "existing contents are kept");
    }

    #[test]
    fn scratch_dir_blocked_by_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("doc.pdf.d");
        std::fs::write(&blocker, b"not a dir").unwrap();
        let err = ensure_scratch_dir(&blocker).unwrap_err();
        assert!(matches!(err, DocVisionError::ScratchDirFailed { .. }));
    }

    #[tokio::test]
    async fn rasterize_rejects_non_pdf_before_any_work() {
        let tmp = tempfile::tempdir().unwrap();
        let png = tmp.path().join("scan.png");
        std::fs::write(&png, b"\x89PNG").unwrap();

        let err = rasterize(&png, &ConversionConfig::default()).await.unwrap_err();
        assert!(matches!(err, DocVisionError::UnsupportedExtension { .. }));
        assert!(!scratch_dir_for(&png).exists(), "no scratch dir on precondition failure");
    }

    #[tokio::test]
    async fn rasterize_rejects_truncated_pdf_before_any_work() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = tmp.path().join("cut.pdf");
        std::fs::write(&pdf, b"%P").unwrap();

        let err = rasterize(&pdf, &ConversionConfig::default()).await.unwrap_err();
        assert!(matches!(err, DocVisionError::NotAPdf { .. }));
        assert!(!scratch_dir_for(&pdf).exists());
    }

    #[tokio::test]
    async fn garbage_after_signature_is_a_document_error() {
        // Passes the signature check, then reaches pdfium with and without
        // a password. Without a loadable libpdfium the binding error wins.
        let tmp = tempfile::tempdir().unwrap();
        let pdf = tmp.path().join("broken.pdf");
        std::fs::write(&pdf, b"%PDF-1.7\nthis is not a cross-reference table\n").unwrap();

        for password in [None, Some("secret")] {
            let err = extract_metadata(&pdf, password).await.unwrap_err();
            assert!(
                matches!(
                    err,
                    DocVisionError::CorruptPdf { .. } | DocVisionError::PdfiumBindingFailed(_)
                ),
                "got {err:?}"
            );
        }
    }
}
