//! Phrase search over extracted page text

use serde::Serialize;
use std::path::Path;
use tracing::warn;

use crate::access::{DocumentAccess, PdfDocument};
use crate::error::DocumentOpenError;

/// First page a phrase was found on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhraseHit {
    pub phrase: String,
    pub page: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhraseReport {
    /// Hits in the order the phrases were given.
    pub found: Vec<PhraseHit>,
    /// Phrases found on no page, in the order given.
    pub missing: Vec<String>,
}

impl PhraseReport {
    pub fn all_found(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Split a comma-separated phrase list, trimming each phrase and dropping empties.
pub fn parse_phrases(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .map(str::to_string)
        .collect()
}

/// Look for each phrase in the document's page text.
///
/// Pages are read once, in order, and reading stops as soon as every phrase
/// has been found. Pages whose text cannot be extracted are skipped.
pub fn find_phrases(doc: &dyn DocumentAccess, phrases: &[String]) -> PhraseReport {
    let mut first_page: Vec<Option<u32>> = vec![None; phrases.len()];

    for page in 1..=doc.page_count() {
        if first_page.iter().all(Option::is_some) {
            break;
        }
        let text = match doc.page_text(page) {
            Ok(text) => text,
            Err(e) => {
                warn!(page, error = %e, "skipping page during phrase search");
                continue;
            }
        };
        for (slot, phrase) in first_page.iter_mut().zip(phrases) {
            if slot.is_none() && text.contains(phrase.as_str()) {
                *slot = Some(page);
            }
        }
    }

    let mut report = PhraseReport::default();
    for (phrase, page) in phrases.iter().zip(first_page) {
        match page {
            Some(page) => report.found.push(PhraseHit {
                phrase: phrase.clone(),
                page,
            }),
            None => report.missing.push(phrase.clone()),
        }
    }
    report
}

/// Open a PDF file and search it for a comma-separated list of phrases.
pub fn search_phrases_in_pdf(
    path: &Path,
    phrase_list: &str,
) -> Result<PhraseReport, DocumentOpenError> {
    let doc = PdfDocument::open(path)?;
    Ok(find_phrases(&doc, &parse_phrases(phrase_list)))
}
