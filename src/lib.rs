//! PDF Equivalence Library
//!
//! Facet-by-facet comparison of PDF documents (text, metadata, bookmarks,
//! link annotations, page geometry) and HTTP validation of embedded links.

pub mod access;
pub mod core;
pub mod error;
pub mod reporting;
pub mod scanner;

pub use crate::core::orchestrator;
pub use crate::reporting::report_writer;
pub use crate::scanner::file_scanner;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::access::{DocumentAccess, MemoryDocument, MemoryPage, PdfDocument};
    pub use crate::core::batch::{compare_pair, PairComparison, PairStatus};
    pub use crate::core::discrepancy::{
        ComparisonReport, ComparisonResult, Discrepancy, DiscrepancyKind, Facet,
    };
    pub use crate::core::link_validator::{
        check_links, validate_links, LinkCheckReport, LinkCheckResult, LinkOutcome,
    };
    pub use crate::core::options::{CompareOptions, LinkCheckOptions};
    pub use crate::core::orchestrator::{
        compare_bookmarks_and_links, compare_documents, compare_files, compare_metadata_files,
        compare_page_properties_files, compare_text_content,
    };
    pub use crate::core::phrases::{find_phrases, search_phrases_in_pdf, PhraseReport};
    pub use crate::error::{AccessError, DocumentOpenError};
    pub use crate::reporting::report_writer::{
        render_comparison_report, render_link_report, render_phrase_report, write_batch_report,
        write_comparison_report, write_json, write_link_report,
    };
    pub use crate::scanner::{collect_pdf_files, compute_file_hash, pair_documents, DocumentPairing};
}
