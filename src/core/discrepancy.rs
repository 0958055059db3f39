//! Comparison verdicts and the differences behind them

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One independent dimension of document equivalence.
///
/// The declaration order is the order facets run and are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    TextContent,
    Metadata,
    Bookmarks,
    LinkStructure,
    PageProperties,
}

impl Facet {
    pub const ALL: [Facet; 5] = [
        Facet::TextContent,
        Facet::Metadata,
        Facet::Bookmarks,
        Facet::LinkStructure,
        Facet::PageProperties,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Facet::TextContent => "text_content",
            Facet::Metadata => "metadata",
            Facet::Bookmarks => "bookmarks",
            Facet::LinkStructure => "link_structure",
            Facet::PageProperties => "page_properties",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    PageCountMismatch,
    LineMismatch,
    LineCountMismatch,
    /// Page texts differ but no compared line does (extra lines, line endings).
    PageTextMismatch,
    MetadataValueMismatch,
    MetadataKeyMissing,
    MetadataKeyExtra,
    MissingOutline,
    OutlineMismatch,
    AnnotationMismatch,
    GeometryMismatch,
    /// A structural read failed; the facet is degraded, not aborted.
    AccessFailure,
}

/// A single recorded difference. Built by the comparators and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discrepancy {
    facet: Facet,
    kind: DiscrepancyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    description: String,
    left: Option<String>,
    right: Option<String>,
}

impl Discrepancy {
    pub(crate) fn new(facet: Facet, kind: DiscrepancyKind, description: impl Into<String>) -> Self {
        Self {
            facet,
            kind,
            page: None,
            line: None,
            description: description.into(),
            left: None,
            right: None,
        }
    }

    pub(crate) fn at_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub(crate) fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub(crate) fn with_left(mut self, value: impl Into<String>) -> Self {
        self.left = Some(value.into());
        self
    }

    pub(crate) fn with_right(mut self, value: impl Into<String>) -> Self {
        self.right = Some(value.into());
        self
    }

    pub fn facet(&self) -> Facet {
        self.facet
    }

    pub fn kind(&self) -> DiscrepancyKind {
        self.kind
    }

    /// 1-based page number, when the difference is tied to a page.
    pub fn page(&self) -> Option<u32> {
        self.page
    }

    /// 1-based line number within the page, for text differences.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn left(&self) -> Option<&str> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&str> {
        self.right.as_deref()
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.facet)?;
        if let Some(page) = self.page {
            write!(f, " page {}", page)?;
        }
        if let Some(line) = self.line {
            write!(f, " line {}", line)?;
        }
        write!(f, ": {}", self.description)?;
        if self.left.is_some() || self.right.is_some() {
            write!(
                f,
                " (left: {}, right: {})",
                self.left.as_deref().unwrap_or("<absent>"),
                self.right.as_deref().unwrap_or("<absent>")
            )?;
        }
        Ok(())
    }
}

/// Verdict of one facet. `equal` is true exactly when there are no discrepancies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    facet: Facet,
    equal: bool,
    discrepancies: Vec<Discrepancy>,
}

impl ComparisonResult {
    pub fn new(facet: Facet, discrepancies: Vec<Discrepancy>) -> Self {
        Self {
            facet,
            equal: discrepancies.is_empty(),
            discrepancies,
        }
    }

    pub fn facet(&self) -> Facet {
        self.facet
    }

    pub fn is_equal(&self) -> bool {
        self.equal
    }

    pub fn discrepancies(&self) -> &[Discrepancy] {
        &self.discrepancies
    }
}

/// Aggregate verdict across the facets that were run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    overall_equal: bool,
    facets: BTreeMap<Facet, ComparisonResult>,
}

impl ComparisonReport {
    /// Aggregate facet results; a later result for the same facet replaces an earlier one.
    pub fn from_results(results: impl IntoIterator<Item = ComparisonResult>) -> Self {
        let facets: BTreeMap<Facet, ComparisonResult> = results
            .into_iter()
            .map(|result| (result.facet(), result))
            .collect();
        let overall_equal = facets.values().all(ComparisonResult::is_equal);
        Self {
            overall_equal,
            facets,
        }
    }

    /// Logical AND of every facet's verdict.
    pub fn overall_equal(&self) -> bool {
        self.overall_equal
    }

    pub fn facet(&self, facet: Facet) -> Option<&ComparisonResult> {
        self.facets.get(&facet)
    }

    /// Facet results in facet order.
    pub fn results(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.facets.values()
    }

    /// All discrepancies, ordered by facet and then as each comparator produced them.
    pub fn discrepancies(&self) -> impl Iterator<Item = &Discrepancy> {
        self.facets.values().flat_map(|r| r.discrepancies().iter())
    }

    pub fn discrepancy_count(&self) -> usize {
        self.facets.values().map(|r| r.discrepancies().len()).sum()
    }
}
