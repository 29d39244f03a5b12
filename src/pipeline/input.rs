//! Input checks that run before any work starts.
//!
//! Every precondition failure (wrong extension, missing file, not a PDF,
//! not a folder) must surface before the scratch directory is created or
//! an engine is started, so these are plain synchronous filesystem
//! checks.

use crate::error::DocVisionError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `true` if `path` carries a `.pdf` extension (any case).
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Validate a PDF input: extension, existence, read permission, magic bytes.
pub fn validate_pdf(path: &Path) -> Result<PathBuf, DocVisionError> {
    if !has_pdf_extension(path) {
        return Err(DocVisionError::UnsupportedExtension {
            path: path.to_path_buf(),
        });
    }
    if !path.exists() {
        return Err(DocVisionError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(f) => {
            // Short or unreadable files (a directory named `x.pdf`) fail
            // the signature check too.
            let mut head = Vec::with_capacity(4);
            if f.take(4).read_to_end(&mut head).is_err() {
                head.clear();
            }
            if head != b"%PDF" {
                let mut magic = [0u8; 4];
                magic[..head.len()].copy_from_slice(&head);
                return Err(DocVisionError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DocVisionError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(DocVisionError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path.to_path_buf())
}

/// Validate an image-folder input: it must exist and be a directory.
pub fn validate_image_folder(path: &Path) -> Result<PathBuf, DocVisionError> {
    if !path.exists() {
        return Err(DocVisionError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(DocVisionError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}
