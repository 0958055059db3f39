//! Multi-facet comparison entry points

use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use super::comparators::{
    compare_bookmarks, compare_links, compare_metadata, compare_page_properties, compare_text,
};
use super::discrepancy::{ComparisonReport, ComparisonResult, Facet};
use super::options::CompareOptions;
use crate::access::{DocumentAccess, PdfDocument};
use crate::error::DocumentOpenError;

/// Run a single facet comparator.
pub fn run_facet(
    facet: Facet,
    left: &dyn DocumentAccess,
    right: &dyn DocumentAccess,
    options: &CompareOptions,
) -> ComparisonResult {
    let result = match facet {
        Facet::TextContent => compare_text(left, right, options),
        Facet::Metadata => compare_metadata(left, right, options),
        Facet::Bookmarks => compare_bookmarks(left, right, options),
        Facet::LinkStructure => compare_links(left, right),
        Facet::PageProperties => compare_page_properties(left, right),
    };
    debug!(
        facet = %facet,
        equal = result.is_equal(),
        discrepancies = result.discrepancies().len(),
        "facet compared"
    );
    result
}

/// Compare two open documents on the given facets.
///
/// Every requested facet runs, in facet order, regardless of earlier
/// verdicts. Duplicate facets run once. With no facets the report is
/// vacuously equal.
pub fn compare_documents(
    left: &dyn DocumentAccess,
    right: &dyn DocumentAccess,
    facets: &[Facet],
    options: &CompareOptions,
) -> ComparisonReport {
    let selected: BTreeSet<Facet> = facets.iter().copied().collect();
    ComparisonReport::from_results(
        selected
            .into_iter()
            .map(|facet| run_facet(facet, left, right, options)),
    )
}

/// Open two PDF files and compare them on the given facets.
///
/// Failing to open either file is the only error; both documents are
/// released before returning on every path.
pub fn compare_files(
    left: &Path,
    right: &Path,
    facets: &[Facet],
    options: &CompareOptions,
) -> Result<ComparisonReport, DocumentOpenError> {
    let left_doc = PdfDocument::open(left)?;
    let right_doc = PdfDocument::open(right)?;
    debug!(left = %left.display(), right = %right.display(), "comparing documents");
    Ok(compare_documents(&left_doc, &right_doc, facets, options))
}

/// Extracted text of every page. `overall_equal` is the text verdict.
pub fn compare_text_content(
    left: &Path,
    right: &Path,
) -> Result<ComparisonReport, DocumentOpenError> {
    compare_files(left, right, &[Facet::TextContent], &CompareOptions::default())
}

/// Document information entries.
pub fn compare_metadata_files(
    left: &Path,
    right: &Path,
) -> Result<ComparisonReport, DocumentOpenError> {
    compare_files(left, right, &[Facet::Metadata], &CompareOptions::default())
}

/// Outline tree and per-page annotations; equal only when both facets are.
pub fn compare_bookmarks_and_links(
    left: &Path,
    right: &Path,
) -> Result<ComparisonReport, DocumentOpenError> {
    compare_files(
        left,
        right,
        &[Facet::Bookmarks, Facet::LinkStructure],
        &CompareOptions::default(),
    )
}

/// Page dimensions.
pub fn compare_page_properties_files(
    left: &Path,
    right: &Path,
) -> Result<ComparisonReport, DocumentOpenError> {
    compare_files(left, right, &[Facet::PageProperties], &CompareOptions::default())
}
