//! End-to-end tests against real pdfium and Tesseract.
//!
//! These need a scanned PDF in `./test_cases/`, a loadable libpdfium and a
//! `tesseract` executable with the `eng` language pack. They are gated
//! behind the `E2E_ENABLED` environment variable.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/opt/pdfium/lib cargo test --test e2e -- --nocapture

use docvision::{
    convert, inspect, ConversionConfig, DocVisionError, OutputMode, OutputTarget, Source,
    PAGE_DELIMITER,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Copy the fixture into a fresh temp dir so `<pdf>.d/` lands there.
fn staged(pdf: &PathBuf) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let copy = dir.path().join(pdf.file_name().unwrap());
    std::fs::copy(pdf, &copy).unwrap();
    (dir, copy)
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP: test file not found: {}", p.display());
            return;
        }
        p
    }};
}

// ── Inspect ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inspect_scanned_pdf() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("scanned.pdf"));

    let meta = inspect(&path, None).await.expect("inspect() should succeed");

    assert!(meta.page_count >= 1);
    assert!(!meta.pdf_version.is_empty());
    println!("Metadata: {:?}", meta);
}

#[tokio::test]
async fn test_inspect_nonexistent() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP");
        return;
    }

    let err = inspect("/definitely/not/a/real/file.pdf", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DocVisionError::FileNotFound { .. }));
}

// ── Full runs ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_convert_to_plain_text() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("scanned.pdf"));
    let (dir, pdf) = staged(&path);
    let target = OutputTarget::from_base(dir.path().join("scanned"), OutputMode::PlainText);

    let config = ConversionConfig::builder()
        .dpi(200)
        .build()
        .expect("valid config");

    let stats = convert(&Source::Pdf(pdf.clone()), &target, &config)
        .await
        .expect("conversion should succeed");

    assert_eq!(stats.processed_pages, stats.total_pages);
    assert!(stats.total_pages >= 1);

    let text = std::fs::read_to_string(&target.path).unwrap();
    assert!(text.matches(PAGE_DELIMITER).count() >= stats.total_pages);
    assert!(!text.trim().is_empty(), "OCR should find some text");

    let scratch = dir.path().join("scanned.pdf.d");
    for i in 0..stats.total_pages {
        assert!(scratch.join(format!("{i}.jpg")).exists(), "page image {i} missing");
    }

    println!("--- BEGIN OUTPUT ---\n{}\n--- END OUTPUT ---", text);
}

#[tokio::test]
async fn test_resume_from_rendered_pages() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("scanned.pdf"));
    let (dir, pdf) = staged(&path);
    let config = ConversionConfig::builder()
        .dpi(150)
        .build()
        .expect("valid config");

    let first = convert(
        &Source::Pdf(pdf),
        &OutputTarget::from_base(dir.path().join("first"), OutputMode::PlainText),
        &config,
    )
    .await
    .expect("first run should succeed");

    let resumed = convert(
        &Source::ImageFolder(dir.path().join("scanned.pdf.d")),
        &OutputTarget::from_base(dir.path().join("resumed"), OutputMode::RichText),
        &config,
    )
    .await
    .expect("resume should succeed");

    assert_eq!(resumed.total_pages, first.total_pages);
    assert_eq!(resumed.render_duration_ms, 0);
    assert!(dir.path().join("resumed.docx").exists());
}

#[tokio::test]
async fn test_missing_tesseract_is_reported() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("scanned.pdf"));
    let (dir, pdf) = staged(&path);
    let config = ConversionConfig::builder()
        .dpi(72)
        .tesseract_binary("/nonexistent/tesseract")
        .build()
        .expect("valid config");

    let err = convert(
        &Source::Pdf(pdf),
        &OutputTarget::from_base(dir.path().join("out"), OutputMode::RichText),
        &config,
    )
    .await
    .unwrap_err();

    assert!(
        matches!(
            err,
            DocVisionError::PageFailed(docvision::PageError::EngineUnavailable { page: 0, .. })
        ),
        "got {err:?}"
    );
    assert!(!dir.path().join("out.docx").exists());
}
