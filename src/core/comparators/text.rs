//! Extracted-text comparison, page by page and line by line

use super::{page_count_mismatch, read_both};
use crate::access::DocumentAccess;
use crate::core::discrepancy::{ComparisonResult, Discrepancy, DiscrepancyKind, Facet};
use crate::core::options::CompareOptions;

const FACET: Facet = Facet::TextContent;

/// Compare the extracted text of two documents.
///
/// Lines are compared positionally up to the shorter page's line count.
/// Extra lines on one side are itemized only with
/// [`CompareOptions::strict_line_count`]; otherwise a page whose text differs
/// without any differing compared line gets one `PageTextMismatch`.
pub fn compare_text(
    left: &dyn DocumentAccess,
    right: &dyn DocumentAccess,
    options: &CompareOptions,
) -> ComparisonResult {
    if let Some(mismatch) = page_count_mismatch(FACET, left, right) {
        return ComparisonResult::new(FACET, vec![mismatch]);
    }

    let mut discrepancies = Vec::new();
    for page in 1..=left.page_count() {
        let (left_text, right_text) =
            match read_both(FACET, page, left.page_text(page), right.page_text(page)) {
                Ok(texts) => texts,
                Err(failure) => {
                    discrepancies.push(failure);
                    continue;
                }
            };
        if left_text == right_text {
            continue;
        }

        let left_lines = split_lines(&left_text);
        let right_lines = split_lines(&right_text);
        let reported_before = discrepancies.len();

        for (idx, (l, r)) in left_lines.iter().zip(&right_lines).enumerate() {
            if l != r {
                discrepancies.push(
                    Discrepancy::new(FACET, DiscrepancyKind::LineMismatch, "line text differs")
                        .at_page(page)
                        .at_line(idx as u32 + 1)
                        .with_left(*l)
                        .with_right(*r),
                );
            }
        }

        if options.strict_line_count && left_lines.len() != right_lines.len() {
            discrepancies.push(
                Discrepancy::new(
                    FACET,
                    DiscrepancyKind::LineCountMismatch,
                    "pages have a different number of lines",
                )
                .at_page(page)
                .with_left(left_lines.len().to_string())
                .with_right(right_lines.len().to_string()),
            );
        }

        // Differences past the shorter page or in line endings still make the page unequal
        if discrepancies.len() == reported_before {
            discrepancies.push(
                Discrepancy::new(
                    FACET,
                    DiscrepancyKind::PageTextMismatch,
                    "page text differs outside the compared lines",
                )
                .at_page(page)
                .with_left(left_text.as_str())
                .with_right(right_text.as_str()),
            );
        }
    }

    ComparisonResult::new(FACET, discrepancies)
}

/// Split on `\n` or `\r\n`, dropping trailing empty lines.
/// Text without any line break is a single line, even when empty.
fn split_lines(text: &str) -> Vec<&str> {
    if !text.contains('\n') {
        return vec![text];
    }
    let mut lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{MemoryDocument, MemoryPage};

    fn doc(pages: &[&str]) -> MemoryDocument {
        pages
            .iter()
            .fold(MemoryDocument::new(), |doc, text| doc.with_page(MemoryPage::new(*text)))
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\r\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\n\n\n"), vec!["a"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines(""), vec![""]);
        assert!(split_lines("\n").is_empty());
    }

    #[test]
    fn test_identical_text_is_equal() {
        let left = doc(&["Title\nBody", "Second page"]);
        let result = compare_text(&left, &left.clone(), &CompareOptions::default());
        assert!(result.is_equal());
    }

    #[test]
    fn test_reports_each_differing_line() {
        let left = doc(&["same\nleft one\nsame\nleft two"]);
        let right = doc(&["same\nright one\nsame\nright two"]);
        let result = compare_text(&left, &right, &CompareOptions::default());

        let found: Vec<(Option<u32>, Option<u32>, Option<&str>, Option<&str>)> = result
            .discrepancies()
            .iter()
            .map(|d| (d.page(), d.line(), d.left(), d.right()))
            .collect();
        assert_eq!(
            found,
            vec![
                (Some(1), Some(2), Some("left one"), Some("right one")),
                (Some(1), Some(4), Some("left two"), Some("right two")),
            ]
        );
    }

    #[test]
    fn test_page_count_mismatch_short_circuits() {
        let left = doc(&["a", "b", "c"]);
        let right = doc(&["x", "y", "z", "w", "v"]);
        let result = compare_text(&left, &right, &CompareOptions::default());
        assert_eq!(result.discrepancies().len(), 1);
        let d = &result.discrepancies()[0];
        assert_eq!(d.kind(), DiscrepancyKind::PageCountMismatch);
        assert_eq!((d.left(), d.right()), (Some("3"), Some("5")));
    }

    #[test]
    fn test_extra_lines_make_page_unequal_by_default() {
        let left = doc(&["one\ntwo"]);
        let right = doc(&["one\ntwo\nthree"]);
        let result = compare_text(&left, &right, &CompareOptions::default());

        assert!(!result.is_equal());
        assert_eq!(result.discrepancies().len(), 1);
        let d = &result.discrepancies()[0];
        assert_eq!(d.kind(), DiscrepancyKind::PageTextMismatch);
        assert_eq!(d.page(), Some(1));
        assert_eq!(d.line(), None);
        assert_eq!((d.left(), d.right()), (Some("one\ntwo"), Some("one\ntwo\nthree")));
    }

    #[test]
    fn test_line_ending_difference_is_not_equal() {
        let left = doc(&["a\r\nb"]);
        let right = doc(&["a\nb"]);
        let result = compare_text(&left, &right, &CompareOptions::default());

        let kinds: Vec<DiscrepancyKind> = result.discrepancies().iter().map(|d| d.kind()).collect();
        assert_eq!(kinds, vec![DiscrepancyKind::PageTextMismatch]);
    }

    #[test]
    fn test_line_mismatch_is_not_doubled_by_page_mismatch() {
        let left = doc(&["one\ntwo"]);
        let right = doc(&["one\nTWO\nthree"]);
        let result = compare_text(&left, &right, &CompareOptions::default());

        let kinds: Vec<DiscrepancyKind> = result.discrepancies().iter().map(|d| d.kind()).collect();
        assert_eq!(kinds, vec![DiscrepancyKind::LineMismatch]);
    }

    #[test]
    fn test_extra_lines_flagged_when_strict() {
        let left = doc(&["one\ntwo"]);
        let right = doc(&["one\ntwo\nthree"]);
        let options = CompareOptions {
            strict_line_count: true,
            ..CompareOptions::default()
        };
        let result = compare_text(&left, &right, &options);
        assert_eq!(result.discrepancies().len(), 1);
        assert_eq!(
            result.discrepancies()[0].kind(),
            DiscrepancyKind::LineCountMismatch
        );
    }

    #[test]
    fn test_unreadable_page_degrades_and_continues() {
        let left = MemoryDocument::new()
            .with_page(MemoryPage::unreadable())
            .with_page(MemoryPage::new("left"));
        let right = doc(&["fine", "right"]);
        let result = compare_text(&left, &right, &CompareOptions::default());

        let kinds: Vec<DiscrepancyKind> = result.discrepancies().iter().map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec![DiscrepancyKind::AccessFailure, DiscrepancyKind::LineMismatch]
        );
        assert_eq!(result.discrepancies()[1].page(), Some(2));
    }
}
