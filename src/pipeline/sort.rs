//! Natural ("human") ordering of page-image file names.
//!
//! Scanners and export tools number pages without zero padding, so a
//! byte-wise sort puts `10.jpg` before `2.jpg`. Splitting each basename into
//! digit and non-digit runs and comparing digit runs by value restores the
//! order a reader expects.

use crate::error::DocVisionError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

static RE_CHUNKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+|[^0-9]+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Number(&'a str),
    Text(&'a str),
}

impl<'a> Chunk<'a> {
    fn as_str(&self) -> &'a str {
        match self {
            Chunk::Number(s) | Chunk::Text(s) => s,
        }
    }
}

fn chunks(name: &str) -> impl Iterator<Item = Chunk<'_>> {
    RE_CHUNKS.find_iter(name).map(|m| {
        let s = m.as_str();
        if s.as_bytes()[0].is_ascii_digit() {
            Chunk::Number(s)
        } else {
            Chunk::Text(s)
        }
    })
}

/// Compare two ASCII digit runs by numeric value, any length.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

/// Natural ordering of two paths, by basename.
///
/// Digit runs compare by value, text runs as strings, a digit run against
/// a text run by their string forms, and a strict prefix sorts first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = chunks(basename(a));
    let mut right = chunks(basename(b));
    loop {
        let ord = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(Chunk::Number(x)), Some(Chunk::Number(y))) => cmp_digits(x, y),
            (Some(Chunk::Text(x)), Some(Chunk::Text(y))) => x.cmp(y),
            (Some(x), Some(y)) => x.as_str().cmp(y.as_str()),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
}

/// Sort paths in natural order. Stable: ties keep their input order.
///
/// ```rust
/// use docvision::natural_sort;
///
/// let sorted = natural_sort(vec!["p2.jpg".into(), "p10.jpg".into(), "p1.jpg".into()]);
/// assert_eq!(sorted, ["p1.jpg", "p2.jpg", "p10.jpg"]);
/// ```
pub fn natural_sort(mut paths: Vec<String>) -> Vec<String> {
    paths.sort_by(|a, b| natural_cmp(a, b));
    paths
}

/// [`natural_sort`] for `PathBuf`s. Non-UTF-8 names compare lossily.
pub fn natural_sort_paths(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
    paths
}

/// List the regular files of `dir` (not recursive), in natural order.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>, DocVisionError> {
    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DocVisionError::FileNotFound {
            path: dir.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => DocVisionError::PermissionDenied {
            path: dir.to_path_buf(),
        },
        _ => DocVisionError::Internal(format!("reading {}: {}", dir.display(), e)),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| DocVisionError::Internal(format!("reading {}: {}", dir.display(), e)))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        } else {
            warn!("Skipping non-file entry {}", path.display());
        }
    }

    let files = natural_sort_paths(files);
    debug!("Found {} page images in {}", files.len(), dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(v: &[&str]) -> Vec<String> {
        natural_sort(v.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(
            sorted(&["p2.jpg", "p10.jpg", "p1.jpg"]),
            ["p1.jpg", "p2.jpg", "p10.jpg"]
        );
    }

    #[test]
    fn bare_page_numbers() {
        assert_eq!(
            sorted(&["0.jpg", "1.jpg", "10.jpg", "2.jpg"]),
            ["0.jpg", "1.jpg", "2.jpg", "10.jpg"]
        );
    }

    #[test]
    fn idempotent() {
        let once = sorted(&["b3", "a10", "a2", "b1", "a"]);
        let twice = natural_sort(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once, ["a", "a2", "a10", "b1", "b3"]);
    }

    #[test]
    fn uses_basename_only() {
        assert_eq!(
            sorted(&["z/page10.jpg", "a/page9.jpg"]),
            ["a/page9.jpg", "z/page10.jpg"]
        );
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(natural_cmp("scan", "scan1"), Ordering::Less);
        assert_eq!(natural_cmp("scan1", "scan1b"), Ordering::Less);
    }

    #[test]
    fn mixed_kinds_fall_back_to_string_form() {
        // "1" vs "a" at position 0: '1' < 'a' as strings
        assert_eq!(natural_cmp("1a", "a1"), Ordering::Less);
        assert_eq!(natural_cmp("a1", "1a"), Ordering::Greater);
    }

    #[test]
    fn leading_zeros_tie_and_stay_stable() {
        assert_eq!(natural_cmp("p007", "p7"), Ordering::Equal);
        assert_eq!(sorted(&["p007", "p7", "p6"]), ["p6", "p007", "p7"]);
    }

    #[test]
    fn huge_numbers_do_not_overflow() {
        assert_eq!(
            natural_cmp("99999999999999999999999", "100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn collect_images_sorts_naturally_and_skips_dirs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["10.jpg", "2.jpg", "1.jpg"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("3.jpg")).unwrap();

        let files = collect_images(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["1.jpg", "2.jpg", "10.jpg"]);
    }

    #[test]
    fn collect_images_missing_dir() {
        let err = collect_images(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, DocVisionError::FileNotFound { .. }));
    }
}
