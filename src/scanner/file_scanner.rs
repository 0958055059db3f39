//! PDF file collection and pairing across two directory trees

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Two documents sharing a relative path under the left and right roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPair {
    pub relative: PathBuf,
    pub left: PathBuf,
    pub right: PathBuf,
}

/// Result of matching the PDF files of two directories by relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPairing {
    pub pairs: Vec<DocumentPair>,
    /// Relative paths found only under the left root.
    pub left_only: Vec<PathBuf>,
    /// Relative paths found only under the right root.
    pub right_only: Vec<PathBuf>,
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
}

/// Collect PDF files (case-insensitive `.pdf` extension) under `dir`, sorted.
///
/// Only the top level is scanned unless `recursive` is set. Symlinks are not followed.
///
/// # Arguments
/// * `dir` - Directory to scan
/// * `recursive` - Whether to descend into subdirectories
///
/// # Returns
/// Sorted paths of the PDF files found
pub fn collect_pdf_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir).follow_links(false).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut pdf_files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_pdf(entry.path()) {
            pdf_files.push(entry.into_path());
        }
    }
    pdf_files.sort();
    Ok(pdf_files)
}

/// Match PDF files under two roots by their path relative to each root.
///
/// # Arguments
/// * `left_dir` - Root of the left tree
/// * `right_dir` - Root of the right tree
/// * `recursive` - Whether to descend into subdirectories of both roots
///
/// # Returns
/// Matched pairs plus the relative paths present on one side only, all sorted
pub fn pair_documents(left_dir: &Path, right_dir: &Path, recursive: bool) -> Result<DocumentPairing> {
    let relative_map = |root: &Path| -> Result<BTreeMap<PathBuf, PathBuf>> {
        collect_pdf_files(root, recursive)?
            .into_iter()
            .map(|path| {
                let relative = path.strip_prefix(root)?.to_path_buf();
                Ok((relative, path))
            })
            .collect()
    };

    let left = relative_map(left_dir)?;
    let mut right = relative_map(right_dir)?;

    let mut pairing = DocumentPairing::default();
    for (relative, left_path) in left {
        match right.remove(&relative) {
            Some(right_path) => pairing.pairs.push(DocumentPair {
                relative,
                left: left_path,
                right: right_path,
            }),
            None => pairing.left_only.push(relative),
        }
    }
    pairing.right_only = right.into_keys().collect();
    Ok(pairing)
}
