//! In-memory documents
//!
//! Holds every facet as plain data. Used to compare documents that were
//! produced without a PDF on disk, and throughout the test suites.

use std::collections::BTreeMap;

use super::{Annotation, DocumentAccess, OutlineNode, PageGeometry};
use crate::error::AccessError;

/// One page of a [`MemoryDocument`].
#[derive(Debug, Clone)]
pub struct MemoryPage {
    /// `None` makes text extraction fail for this page.
    pub text: Option<String>,
    pub geometry: PageGeometry,
    pub annotations: Vec<Annotation>,
}

impl MemoryPage {
    /// A US Letter page with the given text and no annotations.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            geometry: PageGeometry::US_LETTER,
            annotations: Vec::new(),
        }
    }

    /// A page whose text cannot be extracted.
    pub fn unreadable() -> Self {
        Self {
            text: None,
            geometry: PageGeometry::US_LETTER,
            annotations: Vec::new(),
        }
    }

    pub fn with_geometry(mut self, width: f64, height: f64) -> Self {
        self.geometry = PageGeometry::new(width, height);
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
    metadata: BTreeMap<String, String>,
    outline: Option<OutlineNode>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document of `count` blank US Letter pages.
    pub fn with_blank_pages(count: u32) -> Self {
        Self {
            pages: (0..count).map(|_| MemoryPage::new("")).collect(),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, page: MemoryPage) -> Self {
        self.pages.push(page);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_outline(mut self, root: OutlineNode) -> Self {
        self.outline = Some(root);
        self
    }

    fn page(&self, page: u32) -> Result<&MemoryPage, AccessError> {
        let count = self.page_count();
        if page == 0 || page > count {
            return Err(AccessError::PageOutOfRange { page, count });
        }
        Ok(&self.pages[(page - 1) as usize])
    }
}

impl DocumentAccess for MemoryDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String, AccessError> {
        self.page(page)?
            .text
            .clone()
            .ok_or_else(|| AccessError::TextExtraction {
                page,
                message: "no extractable text".into(),
            })
    }

    fn metadata(&self) -> Result<BTreeMap<String, String>, AccessError> {
        Ok(self.metadata.clone())
    }

    fn outline_root(&self) -> Result<Option<OutlineNode>, AccessError> {
        Ok(self.outline.clone())
    }

    fn page_annotations(&self, page: u32) -> Result<Vec<Annotation>, AccessError> {
        Ok(self.page(page)?.annotations.clone())
    }

    fn page_geometry(&self, page: u32) -> Result<PageGeometry, AccessError> {
        Ok(self.page(page)?.geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_are_one_based() {
        let doc = MemoryDocument::new()
            .with_page(MemoryPage::new("first"))
            .with_page(MemoryPage::new("second"));

        assert_eq!(doc.page_text(1).unwrap(), "first");
        assert_eq!(doc.page_text(2).unwrap(), "second");
        assert_eq!(
            doc.page_text(0),
            Err(AccessError::PageOutOfRange { page: 0, count: 2 })
        );
        assert_eq!(
            doc.page_text(3),
            Err(AccessError::PageOutOfRange { page: 3, count: 2 })
        );
    }

    #[test]
    fn test_unreadable_page_fails_extraction_only() {
        let doc = MemoryDocument::new().with_page(MemoryPage::unreadable());
        assert!(matches!(
            doc.page_text(1),
            Err(AccessError::TextExtraction { page: 1, .. })
        ));
        assert_eq!(doc.page_geometry(1).unwrap(), PageGeometry::US_LETTER);
    }
}
