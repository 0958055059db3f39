//! Document information dictionary comparison

use super::access_failure;
use crate::access::DocumentAccess;
use crate::core::discrepancy::{ComparisonResult, Discrepancy, DiscrepancyKind, Facet};
use crate::core::options::CompareOptions;

const FACET: Facet = Facet::Metadata;

/// Compare metadata entries by exact string equality.
///
/// Driven by the left document's keys: keys only the right document carries
/// are reported only with [`CompareOptions::symmetric_metadata`].
pub fn compare_metadata(
    left: &dyn DocumentAccess,
    right: &dyn DocumentAccess,
    options: &CompareOptions,
) -> ComparisonResult {
    let (left_meta, right_meta) = match (left.metadata(), right.metadata()) {
        (Ok(l), Ok(r)) => (l, r),
        (Err(e), _) | (_, Err(e)) => {
            return ComparisonResult::new(FACET, vec![access_failure(FACET, None, &e)]);
        }
    };

    let mut discrepancies = Vec::new();
    for (key, left_value) in &left_meta {
        match right_meta.get(key) {
            None => discrepancies.push(
                Discrepancy::new(
                    FACET,
                    DiscrepancyKind::MetadataKeyMissing,
                    format!("key '{}' missing from right document", key),
                )
                .with_left(left_value.as_str()),
            ),
            Some(right_value) if right_value != left_value => discrepancies.push(
                Discrepancy::new(
                    FACET,
                    DiscrepancyKind::MetadataValueMismatch,
                    format!("value of '{}' differs", key),
                )
                .with_left(left_value.as_str())
                .with_right(right_value.as_str()),
            ),
            Some(_) => {}
        }
    }

    if options.symmetric_metadata {
        for (key, right_value) in right_meta.iter().filter(|(k, _)| !left_meta.contains_key(*k)) {
            discrepancies.push(
                Discrepancy::new(
                    FACET,
                    DiscrepancyKind::MetadataKeyExtra,
                    format!("key '{}' present only in right document", key),
                )
                .with_right(right_value.as_str()),
            );
        }
    }

    ComparisonResult::new(FACET, discrepancies)
}
