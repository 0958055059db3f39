//! Read-only access to the structural facets of a document
//!
//! Comparators and the link validator only ever see a document through the
//! [`DocumentAccess`] trait. [`PdfDocument`] implements it over lopdf;
//! [`MemoryDocument`] holds the same facets as plain data.

pub mod memory;
pub mod pdf_document;

pub use memory::{MemoryDocument, MemoryPage};
pub use pdf_document::PdfDocument;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::AccessError;

/// Absolute tolerance, in points, for page dimension comparisons.
pub const GEOMETRY_EPSILON: f64 = 0.001;

/// Absorbs binary rounding of decimal inputs at the epsilon boundary.
const GEOMETRY_SLACK: f64 = 1e-9;

/// Structural view of one open document. Pages are numbered from 1.
pub trait DocumentAccess {
    fn page_count(&self) -> u32;

    /// Plain text of one page as produced by the text extractor.
    fn page_text(&self, page: u32) -> Result<String, AccessError>;

    /// Document information entries as key/value strings.
    fn metadata(&self) -> Result<BTreeMap<String, String>, AccessError>;

    /// Root of the outline tree, or `None` when the document has no outline.
    ///
    /// The root itself carries no title; its children are the top-level entries.
    fn outline_root(&self) -> Result<Option<OutlineNode>, AccessError>;

    /// Every annotation on a page, in document order, regardless of subtype.
    fn page_annotations(&self, page: u32) -> Result<Vec<Annotation>, AccessError>;

    fn page_geometry(&self, page: u32) -> Result<PageGeometry, AccessError>;
}

/// Where an outline entry or link annotation points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// A page of the same document (1-based).
    Page(u32),
    /// A named destination that was not resolved to a page.
    Named(String),
    /// An external URI.
    Uri(String),
}

/// One entry of the outline (bookmark) tree. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineNode {
    pub title: String,
    pub target: Option<Destination>,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// A titleless root holding the given top-level entries.
    pub fn root(children: Vec<OutlineNode>) -> Self {
        Self {
            title: String::new(),
            target: None,
            children,
        }
    }

    pub fn entry(title: impl Into<String>, target: Option<Destination>) -> Self {
        Self {
            title: title.into(),
            target,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: OutlineNode) -> Self {
        self.children.push(child);
        self
    }

    /// Number of entries in the subtree, excluding this node.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

/// A page-attached annotation.
///
/// `canonical` is the structural serialization the link-structure facet
/// compares; the other fields are the parts the link validator reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub subtype: Option<String>,
    pub action_type: Option<String>,
    pub target: Option<Destination>,
    pub bounding_box: Option<[f64; 4]>,
    #[serde(skip)]
    canonical: String,
}

impl Annotation {
    /// Build an annotation whose canonical form is derived from its fields.
    pub fn new(
        subtype: Option<String>,
        action_type: Option<String>,
        target: Option<Destination>,
        bounding_box: Option<[f64; 4]>,
    ) -> Self {
        let mut annotation = Self {
            subtype,
            action_type,
            target,
            bounding_box,
            canonical: String::new(),
        };
        annotation.canonical = serde_json::to_string(&annotation)
            .unwrap_or_else(|_| format!("{:?}", annotation));
        annotation
    }

    /// Build an annotation with a serialization supplied by the access layer.
    pub fn with_canonical(
        subtype: Option<String>,
        action_type: Option<String>,
        target: Option<Destination>,
        bounding_box: Option<[f64; 4]>,
        canonical: String,
    ) -> Self {
        Self {
            subtype,
            action_type,
            target,
            bounding_box,
            canonical,
        }
    }

    /// A `/Link` annotation with a `/URI` action.
    pub fn uri_link(rect: [f64; 4], uri: impl Into<String>) -> Self {
        Self::new(
            Some("Link".into()),
            Some("URI".into()),
            Some(Destination::Uri(uri.into())),
            Some(rect),
        )
    }

    /// A `/Link` annotation jumping to a page of the same document.
    pub fn page_link(rect: [f64; 4], page: u32) -> Self {
        Self::new(
            Some("Link".into()),
            Some("GoTo".into()),
            Some(Destination::Page(page)),
            Some(rect),
        )
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// The URI this annotation opens, if it is a `/Link` with a `/URI` action.
    pub fn link_uri(&self) -> Option<&str> {
        if self.subtype.as_deref() != Some("Link") || self.action_type.as_deref() != Some("URI") {
            return None;
        }
        match &self.target {
            Some(Destination::Uri(uri)) => Some(uri),
            _ => None,
        }
    }
}

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
}

impl PageGeometry {
    pub const US_LETTER: PageGeometry = PageGeometry {
        width: 612.0,
        height: 792.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Equal within [`GEOMETRY_EPSILON`] on both axes.
    pub fn approx_eq(&self, other: &PageGeometry) -> bool {
        let limit = GEOMETRY_EPSILON + GEOMETRY_SLACK;
        (self.width - other.width).abs() <= limit && (self.height - other.height).abs() <= limit
    }
}

impl fmt::Display for PageGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} x {:.3} pt", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_epsilon_boundary() {
        let base = PageGeometry::new(612.0, 792.0);
        assert!(base.approx_eq(&PageGeometry::new(612.001, 792.0)));
        assert!(base.approx_eq(&PageGeometry::new(611.999, 792.001)));
        assert!(!base.approx_eq(&PageGeometry::new(612.0011, 792.0)));
        assert!(!base.approx_eq(&PageGeometry::new(612.0, 791.9989)));
    }

    #[test]
    fn test_geometry_boundary_on_small_values() {
        let base = PageGeometry::new(100.0, 100.0);
        assert!(base.approx_eq(&PageGeometry::new(100.001, 100.001)));
        assert!(!base.approx_eq(&PageGeometry::new(100.0011, 100.0)));
    }

    #[test]
    fn test_link_uri_requires_link_subtype_and_uri_action() {
        let link = Annotation::uri_link([0.0, 0.0, 10.0, 10.0], "https://example.com");
        assert_eq!(link.link_uri(), Some("https://example.com"));

        let goto = Annotation::page_link([0.0, 0.0, 10.0, 10.0], 3);
        assert_eq!(goto.link_uri(), None);

        let widget = Annotation::new(
            Some("Widget".into()),
            Some("URI".into()),
            Some(Destination::Uri("https://example.com".into())),
            None,
        );
        assert_eq!(widget.link_uri(), None);
    }

    #[test]
    fn test_canonical_distinguishes_rectangles() {
        let a = Annotation::uri_link([0.0, 0.0, 10.0, 10.0], "https://example.com");
        let b = Annotation::uri_link([0.0, 0.0, 10.0, 12.0], "https://example.com");
        assert_ne!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), a.clone().canonical());
    }

    #[test]
    fn test_outline_descendant_count() {
        let root = OutlineNode::root(vec![
            OutlineNode::entry("Intro", Some(Destination::Page(1)))
                .with_child(OutlineNode::entry("Scope", Some(Destination::Page(2)))),
            OutlineNode::entry("Appendix", None),
        ]);
        assert_eq!(root.descendant_count(), 3);
    }
}
