//! Facet comparators
//!
//! Each comparator is a pure function of two open documents. Failures are
//! reported as discrepancies, never returned as errors.

pub mod bookmarks;
pub mod links;
pub mod metadata;
pub mod pages;
pub mod text;

pub use bookmarks::compare_bookmarks;
pub use links::compare_links;
pub use metadata::compare_metadata;
pub use pages::compare_page_properties;
pub use text::compare_text;

use crate::access::DocumentAccess;
use crate::core::discrepancy::{Discrepancy, DiscrepancyKind, Facet};
use crate::error::AccessError;

/// Single discrepancy for facets that need matching page counts.
fn page_count_mismatch(
    facet: Facet,
    left: &dyn DocumentAccess,
    right: &dyn DocumentAccess,
) -> Option<Discrepancy> {
    let (left_count, right_count) = (left.page_count(), right.page_count());
    (left_count != right_count).then(|| {
        Discrepancy::new(
            facet,
            DiscrepancyKind::PageCountMismatch,
            "documents have a different number of pages",
        )
        .with_left(left_count.to_string())
        .with_right(right_count.to_string())
    })
}

fn access_failure(facet: Facet, page: Option<u32>, err: &AccessError) -> Discrepancy {
    let discrepancy = Discrepancy::new(
        facet,
        DiscrepancyKind::AccessFailure,
        format!("could not read document structure: {}", err),
    );
    match page {
        Some(page) => discrepancy.at_page(page),
        None => discrepancy,
    }
}

/// Read the same page from both sides, or record why it could not be read.
fn read_both<T>(
    facet: Facet,
    page: u32,
    left: Result<T, AccessError>,
    right: Result<T, AccessError>,
) -> Result<(T, T), Discrepancy> {
    match (left, right) {
        (Ok(l), Ok(r)) => Ok((l, r)),
        (Err(e), _) => Err(access_failure(facet, Some(page), &e).with_left("unreadable")),
        (_, Err(e)) => Err(access_failure(facet, Some(page), &e).with_right("unreadable")),
    }
}
