//! External hyperlink extraction and reachability classification
//!
//! Every `/Link` annotation with a `/URI` action goes through
//! extracted → parsed → requested or rejected. Rejected links never touch the
//! network; requested links are classified from the response or the failure.

use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::options::LinkCheckOptions;
use super::http_check::{HttpChecker, UrlChecker};
use crate::access::{DocumentAccess, PdfDocument};
use crate::error::DocumentOpenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
    /// The server answered 200.
    Valid,
    /// The server answered with any other status.
    Broken,
    /// No response: unresolvable host or transport failure.
    Unreachable,
    /// Not http or https; not checked.
    UnsupportedProtocol,
    MalformedUrl,
}

impl LinkOutcome {
    /// Whether this outcome means the link needs attention.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            LinkOutcome::Broken | LinkOutcome::Unreachable | LinkOutcome::MalformedUrl
        )
    }
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LinkOutcome::Valid => "VALID",
            LinkOutcome::Broken => "BROKEN",
            LinkOutcome::Unreachable => "UNREACHABLE",
            LinkOutcome::UnsupportedProtocol => "UNSUPPORTED",
            LinkOutcome::MalformedUrl => "MALFORMED",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCheckResult {
    pub url: String,
    /// Page the link was found on (1-based).
    pub page: u32,
    pub outcome: LinkOutcome,
    pub http_status: Option<u16>,
    pub status_message: Option<String>,
}

/// A URI link target as found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub page: u32,
    pub url: String,
}

/// A page whose annotations could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPage {
    pub page: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkCheckReport {
    /// One result per extracted link, in extraction order.
    pub links: Vec<LinkCheckResult>,
    pub skipped_pages: Vec<SkippedPage>,
}

impl LinkCheckReport {
    pub fn count(&self, outcome: LinkOutcome) -> usize {
        self.links.iter().filter(|r| r.outcome == outcome).count()
    }

    /// No broken, unreachable or malformed links and no skipped pages.
    pub fn all_reachable(&self) -> bool {
        self.skipped_pages.is_empty() && !self.links.iter().any(|r| r.outcome.is_failure())
    }
}

#[derive(Error, Debug)]
pub enum LinkCheckError {
    #[error(transparent)]
    Open(#[from] DocumentOpenError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Collect URI link targets page by page, in annotation order.
pub fn extract_links(doc: &dyn DocumentAccess) -> (Vec<ExtractedLink>, Vec<SkippedPage>) {
    let mut links = Vec::new();
    let mut skipped = Vec::new();

    for page in 1..=doc.page_count() {
        match doc.page_annotations(page) {
            Ok(annotations) => links.extend(annotations.iter().filter_map(|a| {
                a.link_uri().map(|url| ExtractedLink {
                    page,
                    url: url.to_string(),
                })
            })),
            Err(e) => {
                warn!(page, error = %e, "skipping page with unreadable annotations");
                skipped.push(SkippedPage {
                    page,
                    reason: e.to_string(),
                });
            }
        }
    }
    (links, skipped)
}

enum ParsedLink {
    Request(Url),
    Rejected(LinkOutcome, String),
}

fn parse_link(raw: &str) -> ParsedLink {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => ParsedLink::Request(url),
        Ok(url) => ParsedLink::Rejected(
            LinkOutcome::UnsupportedProtocol,
            format!("protocol '{}' is not checked", url.scheme()),
        ),
        Err(e) => ParsedLink::Rejected(LinkOutcome::MalformedUrl, e.to_string()),
    }
}

/// Classify one link, requesting it only when it is a well-formed web URL.
pub fn request_link(link: &ExtractedLink, checker: &dyn UrlChecker) -> LinkCheckResult {
    let result = |outcome, http_status, status_message| LinkCheckResult {
        url: link.url.clone(),
        page: link.page,
        outcome,
        http_status,
        status_message,
    };

    let url = match parse_link(&link.url) {
        ParsedLink::Request(url) => url,
        ParsedLink::Rejected(outcome, reason) => return result(outcome, None, Some(reason)),
    };

    let requested = match checker.head(&url) {
        Ok(response) if response.status == 200 => {
            result(LinkOutcome::Valid, Some(response.status), response.reason)
        }
        Ok(response) => result(LinkOutcome::Broken, Some(response.status), response.reason),
        Err(e) => result(LinkOutcome::Unreachable, None, Some(e.to_string())),
    };
    debug!(url = %link.url, outcome = %requested.outcome, status = ?requested.http_status, "link requested");
    requested
}

/// Extract and classify every link of a document.
///
/// Requests run on a pool of at most `workers` threads; results keep
/// extraction order. Nothing is cached between calls.
pub fn validate_links(
    doc: &dyn DocumentAccess,
    checker: &dyn UrlChecker,
    workers: usize,
) -> LinkCheckReport {
    let (links, skipped_pages) = extract_links(doc);
    debug!(links = links.len(), workers, "requesting links");

    let request = |link: &ExtractedLink| request_link(link, checker);
    let results: Vec<LinkCheckResult> = match rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|idx| format!("link-check-{}", idx))
        .build()
    {
        Ok(pool) => pool.install(|| links.par_iter().map(request).collect()),
        Err(e) => {
            warn!(error = %e, "request pool unavailable, requesting sequentially");
            links.iter().map(request).collect()
        }
    };

    LinkCheckReport {
        links: results,
        skipped_pages,
    }
}

/// Open a PDF file and check every hyperlink it contains.
pub fn check_links(
    path: &Path,
    options: &LinkCheckOptions,
) -> Result<LinkCheckReport, LinkCheckError> {
    let doc = PdfDocument::open(path)?;
    let checker = HttpChecker::new(options)?;
    Ok(validate_links(&doc, &checker, options.workers))
}
