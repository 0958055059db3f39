//! Comparison of one paired document inside a directory run

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::discrepancy::{ComparisonReport, Facet};
use super::options::CompareOptions;
use super::orchestrator::compare_files;
use crate::scanner::{compute_file_hash, DocumentPair};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairStatus {
    Compared { report: ComparisonReport },
    /// One of the two files could not be opened as a PDF.
    OpenFailed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairComparison {
    pub relative: PathBuf,
    pub left: PathBuf,
    pub right: PathBuf,
    pub left_sha256: Option<String>,
    pub right_sha256: Option<String>,
    #[serde(flatten)]
    pub status: PairStatus,
}

impl PairComparison {
    /// Both files hash to the same SHA-256. Says nothing about equivalence.
    pub fn is_identical(&self) -> bool {
        matches!(
            (&self.left_sha256, &self.right_sha256),
            (Some(left), Some(right)) if left == right
        )
    }

    pub fn is_equal(&self) -> bool {
        match &self.status {
            PairStatus::Compared { report } => report.overall_equal(),
            PairStatus::OpenFailed { .. } => false,
        }
    }
}

fn fingerprint(path: &Path) -> Option<String> {
    compute_file_hash(path)
        .map_err(|e| warn!(path = %path.display(), error = %e, "could not fingerprint file"))
        .ok()
}

/// Compare one pair and record both files' fingerprints.
///
/// Byte-identical files are still opened and compared: an unparseable file is
/// an open failure and a document without an outline is unequal to itself on
/// bookmarks, whatever its bytes.
///
/// # Arguments
/// * `pair` - Left and right paths sharing a relative path
/// * `facets` - Facets to compare
/// * `options` - Comparison switches
///
/// # Returns
/// The pair's fingerprints and either its report or the open error
pub fn compare_pair(pair: &DocumentPair, facets: &[Facet], options: &CompareOptions) -> PairComparison {
    let left_sha256 = fingerprint(&pair.left);
    let right_sha256 = fingerprint(&pair.right);

    let status = match compare_files(&pair.left, &pair.right, facets, options) {
        Ok(report) => PairStatus::Compared { report },
        Err(e) => {
            warn!(pair = %pair.relative.display(), error = %e, "pair not compared");
            PairStatus::OpenFailed {
                error: e.to_string(),
            }
        }
    };

    let comparison = PairComparison {
        relative: pair.relative.clone(),
        left: pair.left.clone(),
        right: pair.right.clone(),
        left_sha256,
        right_sha256,
        status,
    };
    debug!(
        pair = %comparison.relative.display(),
        identical = comparison.is_identical(),
        equal = comparison.is_equal(),
        "pair compared"
    );
    comparison
}
