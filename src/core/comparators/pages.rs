//! Page geometry comparison

use super::{page_count_mismatch, read_both};
use crate::access::DocumentAccess;
use crate::core::discrepancy::{ComparisonResult, Discrepancy, DiscrepancyKind, Facet};

const FACET: Facet = Facet::PageProperties;

/// Compare page width and height within [`crate::access::GEOMETRY_EPSILON`].
/// All pages are checked; each differing page yields one discrepancy.
pub fn compare_page_properties(
    left: &dyn DocumentAccess,
    right: &dyn DocumentAccess,
) -> ComparisonResult {
    if let Some(mismatch) = page_count_mismatch(FACET, left, right) {
        return ComparisonResult::new(FACET, vec![mismatch]);
    }

    let mut discrepancies = Vec::new();
    for page in 1..=left.page_count() {
        match read_both(FACET, page, left.page_geometry(page), right.page_geometry(page)) {
            Ok((l, r)) if !l.approx_eq(&r) => discrepancies.push(
                Discrepancy::new(FACET, DiscrepancyKind::GeometryMismatch, "page size differs")
                    .at_page(page)
                    .with_left(l.to_string())
                    .with_right(r.to_string()),
            ),
            Ok(_) => {}
            Err(failure) => discrepancies.push(failure),
        }
    }

    ComparisonResult::new(FACET, discrepancies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{MemoryDocument, MemoryPage};

    fn sized(sizes: &[(f64, f64)]) -> MemoryDocument {
        sizes.iter().fold(MemoryDocument::new(), |doc, (w, h)| {
            doc.with_page(MemoryPage::new("").with_geometry(*w, *h))
        })
    }

    #[test]
    fn test_epsilon_boundary() {
        let base = sized(&[(612.0, 792.0)]);
        assert!(compare_page_properties(&base, &sized(&[(612.001, 792.0)])).is_equal());
        assert!(!compare_page_properties(&base, &sized(&[(612.0011, 792.0)])).is_equal());
    }

    #[test]
    fn test_continues_after_first_mismatch() {
        let left = sized(&[(612.0, 792.0), (612.0, 792.0), (612.0, 792.0)]);
        let right = sized(&[(595.0, 842.0), (612.0, 792.0), (792.0, 612.0)]);
        let result = compare_page_properties(&left, &right);

        let pages: Vec<Option<u32>> = result.discrepancies().iter().map(|d| d.page()).collect();
        assert_eq!(pages, vec![Some(1), Some(3)]);
        assert_eq!(result.discrepancies()[0].left(), Some("612.000 x 792.000 pt"));
        assert_eq!(result.discrepancies()[0].right(), Some("595.000 x 842.000 pt"));
    }

    #[test]
    fn test_page_count_mismatch_short_circuits() {
        let result = compare_page_properties(
            &MemoryDocument::with_blank_pages(3),
            &MemoryDocument::with_blank_pages(5),
        );
        assert_eq!(result.discrepancies().len(), 1);
        assert_eq!(result.discrepancies()[0].kind(), DiscrepancyKind::PageCountMismatch);
    }
}
