//! Per-page annotation structure comparison

use super::{page_count_mismatch, read_both};
use crate::access::{Annotation, DocumentAccess};
use crate::core::discrepancy::{ComparisonResult, Discrepancy, DiscrepancyKind, Facet};

const FACET: Facet = Facet::LinkStructure;

/// Compare the full annotation list of every page by canonical serialization.
///
/// All annotation subtypes take part, not only links. Every page is checked
/// and each differing page yields one discrepancy.
pub fn compare_links(left: &dyn DocumentAccess, right: &dyn DocumentAccess) -> ComparisonResult {
    if let Some(mismatch) = page_count_mismatch(FACET, left, right) {
        return ComparisonResult::new(FACET, vec![mismatch]);
    }

    let mut discrepancies = Vec::new();
    for page in 1..=left.page_count() {
        let (left_annots, right_annots) = match read_both(
            FACET,
            page,
            left.page_annotations(page),
            right.page_annotations(page),
        ) {
            Ok(annots) => annots,
            Err(failure) => {
                discrepancies.push(failure);
                continue;
            }
        };

        let left_forms: Vec<&str> = left_annots.iter().map(Annotation::canonical).collect();
        let right_forms: Vec<&str> = right_annots.iter().map(Annotation::canonical).collect();
        if left_forms == right_forms {
            continue;
        }

        let description = match (left_forms.is_empty(), right_forms.is_empty()) {
            (false, true) => "annotations present only in left document".to_string(),
            (true, false) => "annotations present only in right document".to_string(),
            _ => format!(
                "annotations differ ({} left, {} right)",
                left_forms.len(),
                right_forms.len()
            ),
        };
        discrepancies.push(
            Discrepancy::new(FACET, DiscrepancyKind::AnnotationMismatch, description)
                .at_page(page)
                .with_left(render(&left_forms))
                .with_right(render(&right_forms)),
        );
    }

    ComparisonResult::new(FACET, discrepancies)
}

fn render(forms: &[&str]) -> String {
    format!("[{}]", forms.join(", "))
}
