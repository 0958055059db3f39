//! Outline (bookmark) tree comparison

use super::access_failure;
use crate::access::{DocumentAccess, OutlineNode};
use crate::core::discrepancy::{ComparisonResult, Discrepancy, DiscrepancyKind, Facet};
use crate::core::options::CompareOptions;

const FACET: Facet = Facet::Bookmarks;

/// Compare outline trees structurally.
///
/// A missing outline on either side is a difference, and so is a missing
/// outline on both sides unless [`CompareOptions::absent_outlines_equal`] is
/// set. Any difference inside the trees is reported as one discrepancy.
pub fn compare_bookmarks(
    left: &dyn DocumentAccess,
    right: &dyn DocumentAccess,
    options: &CompareOptions,
) -> ComparisonResult {
    let (left_root, right_root) = match (left.outline_root(), right.outline_root()) {
        (Ok(l), Ok(r)) => (l, r),
        (Err(e), _) | (_, Err(e)) => {
            return ComparisonResult::new(FACET, vec![access_failure(FACET, None, &e)]);
        }
    };

    let discrepancy = match (&left_root, &right_root) {
        (Some(l), Some(r)) if l == r => None,
        (Some(l), Some(r)) => Some(
            Discrepancy::new(FACET, DiscrepancyKind::OutlineMismatch, "outline trees differ")
                .with_left(serialize_tree(l))
                .with_right(serialize_tree(r)),
        ),
        (None, None) if options.absent_outlines_equal => None,
        (None, None) => Some(Discrepancy::new(
            FACET,
            DiscrepancyKind::MissingOutline,
            "missing outline in both documents",
        )),
        (None, Some(r)) => Some(
            Discrepancy::new(
                FACET,
                DiscrepancyKind::MissingOutline,
                "missing outline in left document",
            )
            .with_right(serialize_tree(r)),
        ),
        (Some(l), None) => Some(
            Discrepancy::new(
                FACET,
                DiscrepancyKind::MissingOutline,
                "missing outline in right document",
            )
            .with_left(serialize_tree(l)),
        ),
    };

    ComparisonResult::new(FACET, discrepancy.into_iter().collect())
}

/// Depth-first JSON rendering of a tree, preserving sibling order.
fn serialize_tree(root: &OutlineNode) -> String {
    serde_json::to_string(root).unwrap_or_else(|_| format!("{:?}", root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Destination, MemoryDocument};

    fn outline() -> OutlineNode {
        OutlineNode::root(vec![
            OutlineNode::entry("Introduction", Some(Destination::Page(1)))
                .with_child(OutlineNode::entry("Background", Some(Destination::Page(2)))),
            OutlineNode::entry("Results", Some(Destination::Page(4))),
        ])
    }

    #[test]
    fn test_same_outline_is_equal() {
        let doc = MemoryDocument::with_blank_pages(4).with_outline(outline());
        assert!(compare_bookmarks(&doc, &doc.clone(), &CompareOptions::default()).is_equal());
    }

    #[test]
    fn test_nested_difference_collapses_to_one_discrepancy() {
        let mut changed = outline();
        changed.children[0].children[0].target = Some(Destination::Page(3));
        changed.children[1].title = "Findings".into();

        let left = MemoryDocument::with_blank_pages(4).with_outline(outline());
        let right = MemoryDocument::with_blank_pages(4).with_outline(changed);
        let result = compare_bookmarks(&left, &right, &CompareOptions::default());

        assert_eq!(result.discrepancies().len(), 1);
        let d = &result.discrepancies()[0];
        assert_eq!(d.kind(), DiscrepancyKind::OutlineMismatch);
        assert!(d.left().unwrap().contains("Results"));
        assert!(d.right().unwrap().contains("Findings"));
    }

    #[test]
    fn test_sibling_order_matters() {
        let mut reordered = outline();
        reordered.children.reverse();
        let left = MemoryDocument::new().with_outline(outline());
        let right = MemoryDocument::new().with_outline(reordered);
        assert!(!compare_bookmarks(&left, &right, &CompareOptions::default()).is_equal());
    }

    #[test]
    fn test_both_missing_is_unequal_by_default() {
        let doc = MemoryDocument::with_blank_pages(1);
        let result = compare_bookmarks(&doc, &doc.clone(), &CompareOptions::default());
        assert_eq!(result.discrepancies().len(), 1);
        assert_eq!(result.discrepancies()[0].kind(), DiscrepancyKind::MissingOutline);
    }

    #[test]
    fn test_both_missing_is_equal_when_allowed() {
        let doc = MemoryDocument::with_blank_pages(1);
        let options = CompareOptions {
            absent_outlines_equal: true,
            ..CompareOptions::default()
        };
        assert!(compare_bookmarks(&doc, &doc.clone(), &options).is_equal());
    }

    #[test]
    fn test_one_side_missing_is_always_unequal() {
        let with = MemoryDocument::new().with_outline(outline());
        let without = MemoryDocument::new();
        let result = compare_bookmarks(&with, &without, &CompareOptions::strict());
        assert_eq!(result.discrepancies()[0].description(), "missing outline in right document");
    }

    #[test]
    fn test_empty_outline_differs_from_missing_outline() {
        let empty = MemoryDocument::new().with_outline(OutlineNode::root(vec![]));
        assert!(compare_bookmarks(&empty, &empty.clone(), &CompareOptions::default()).is_equal());
        assert!(!compare_bookmarks(&empty, &MemoryDocument::new(), &CompareOptions::strict()).is_equal());
    }
}
