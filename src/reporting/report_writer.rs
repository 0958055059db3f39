//! Plain-text and JSON report writing

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::batch::{PairComparison, PairStatus};
use crate::core::discrepancy::ComparisonReport;
use crate::core::link_validator::{LinkCheckReport, LinkOutcome};
use crate::core::phrases::PhraseReport;
use crate::scanner::DocumentPairing;

fn verdict(equal: bool) -> &'static str {
    if equal {
        "EQUAL"
    } else {
        "DIFFERENT"
    }
}

fn create(output_path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create report file {}", output_path.display()))?;
    Ok(BufWriter::new(file))
}

/// Render a two-document comparison: one verdict line per facet, then every discrepancy.
pub fn render_comparison_report<W: Write>(
    out: &mut W,
    left: &Path,
    right: &Path,
    report: &ComparisonReport,
) -> Result<()> {
    writeln!(out, "PDF Comparison Report")?;
    writeln!(out, "=====================")?;
    writeln!(out, "Left:  {}", left.display())?;
    writeln!(out, "Right: {}", right.display())?;
    writeln!(out)?;

    writeln!(out, "Facets:")?;
    writeln!(out, "-------")?;
    for result in report.results() {
        writeln!(
            out,
            "  {:<16} {:<9} ({} discrepancies)",
            result.facet().name(),
            verdict(result.is_equal()),
            result.discrepancies().len()
        )?;
    }
    writeln!(out)?;

    if report.discrepancy_count() > 0 {
        writeln!(out, "Discrepancies:")?;
        writeln!(out, "--------------")?;
        for discrepancy in report.discrepancies() {
            writeln!(out, "  {}", discrepancy)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Overall: {}", verdict(report.overall_equal()))?;
    Ok(())
}

/// Write a two-document comparison report to a file
///
/// # Arguments
/// * `output_path` - Path to output file
/// * `left` - Left document path, as shown in the header
/// * `right` - Right document path, as shown in the header
/// * `report` - Comparison outcome to write
///
/// # Returns
/// Result indicating success or failure
pub fn write_comparison_report(
    output_path: &Path,
    left: &Path,
    right: &Path,
    report: &ComparisonReport,
) -> Result<()> {
    let mut out = create(output_path)?;
    render_comparison_report(&mut out, left, right, report)?;
    out.flush()?;
    Ok(())
}

/// Render link check results grouped under a count summary.
pub fn render_link_report<W: Write>(out: &mut W, pdf: &Path, report: &LinkCheckReport) -> Result<()> {
    writeln!(out, "PDF Link Check Report")?;
    writeln!(out, "=====================")?;
    writeln!(out, "Document: {}", pdf.display())?;
    writeln!(out)?;

    writeln!(out, "Summary Statistics:")?;
    writeln!(out, "-------------------")?;
    writeln!(out, "  Total links: {}", report.links.len())?;
    for outcome in [
        LinkOutcome::Valid,
        LinkOutcome::Broken,
        LinkOutcome::Unreachable,
        LinkOutcome::UnsupportedProtocol,
        LinkOutcome::MalformedUrl,
    ] {
        writeln!(out, "  {}: {}", outcome, report.count(outcome))?;
    }
    if !report.skipped_pages.is_empty() {
        writeln!(out, "  Pages skipped: {}", report.skipped_pages.len())?;
    }
    writeln!(out)?;

    if !report.links.is_empty() {
        writeln!(out, "Links:")?;
        writeln!(out, "------")?;
        for link in &report.links {
            write!(out, "  [{}] page {}: {}", link.outcome, link.page, link.url)?;
            match (link.http_status, &link.status_message) {
                (Some(status), Some(message)) => writeln!(out, " ({} {})", status, message)?,
                (Some(status), None) => writeln!(out, " ({})", status)?,
                (None, Some(message)) => writeln!(out, " ({})", message)?,
                (None, None) => writeln!(out)?,
            }
        }
        writeln!(out)?;
    }

    for skipped in &report.skipped_pages {
        writeln!(out, "  Skipped page {}: {}", skipped.page, skipped.reason)?;
    }
    Ok(())
}

/// Write link check results to a file
///
/// # Arguments
/// * `output_path` - Path to output file
/// * `pdf` - Checked document, as shown in the header
/// * `report` - Link check results to write
pub fn write_link_report(output_path: &Path, pdf: &Path, report: &LinkCheckReport) -> Result<()> {
    let mut out = create(output_path)?;
    render_link_report(&mut out, pdf, report)?;
    out.flush()?;
    Ok(())
}

pub fn render_phrase_report<W: Write>(out: &mut W, report: &PhraseReport) -> Result<()> {
    for hit in &report.found {
        writeln!(out, "FOUND   page {}: {}", hit.page, hit.phrase)?;
    }
    for phrase in &report.missing {
        writeln!(out, "MISSING {}", phrase)?;
    }
    Ok(())
}

/// Write the outcome of a directory comparison.
///
/// # Arguments
/// * `output_path` - Path to output file
/// * `results` - Pairs compared so far
/// * `pairing` - Full pairing, including unmatched files
/// * `interrupted` - Report written after a shutdown request; pairs never
///   scheduled are simply absent
///
/// # Returns
/// Result indicating success or failure
pub fn write_batch_report(
    output_path: &Path,
    results: &[PairComparison],
    pairing: &DocumentPairing,
    interrupted: bool,
) -> Result<()> {
    let mut out = create(output_path)?;

    let now = std::time::SystemTime::now();
    writeln!(out, "PDF Directory Comparison Report")?;
    writeln!(out, "===============================")?;
    writeln!(out, "Generated: {:?}", now)?;
    if interrupted {
        writeln!(out, "Status: INTERRUPTED ({} of {} pairs compared)", results.len(), pairing.pairs.len())?;
    }
    writeln!(out)?;

    let identical = results.iter().filter(|r| r.is_identical()).count();
    let equal = results.iter().filter(|r| r.is_equal()).count();
    let failed: Vec<_> = results
        .iter()
        .filter_map(|r| match &r.status {
            PairStatus::OpenFailed { error } => Some((r, error)),
            PairStatus::Compared { .. } => None,
        })
        .collect();
    let different: Vec<_> = results
        .iter()
        .filter_map(|r| match &r.status {
            PairStatus::Compared { report } if !report.overall_equal() => Some((r, report)),
            _ => None,
        })
        .collect();

    writeln!(out, "Summary Statistics:")?;
    writeln!(out, "-------------------")?;
    writeln!(out, "  Pairs compared: {}", results.len())?;
    writeln!(out, "  Equivalent: {}", equal)?;
    writeln!(out, "  Byte-identical: {}", identical)?;
    writeln!(out, "  Different: {}", different.len())?;
    writeln!(out, "  Could not open: {}", failed.len())?;
    writeln!(out, "  Only in left: {}", pairing.left_only.len())?;
    writeln!(out, "  Only in right: {}", pairing.right_only.len())?;
    writeln!(out)?;

    if !different.is_empty() {
        writeln!(out, "Different Pairs:")?;
        writeln!(out, "----------------")?;
        for (pair, report) in &different {
            writeln!(out, "  {}", pair.relative.display())?;
            for discrepancy in report.discrepancies() {
                writeln!(out, "    {}", discrepancy)?;
            }
        }
        writeln!(out)?;
    }

    if !failed.is_empty() {
        writeln!(out, "Unopenable Pairs:")?;
        writeln!(out, "-----------------")?;
        for (pair, error) in &failed {
            writeln!(out, "  {}: {}", pair.relative.display(), error)?;
        }
        writeln!(out)?;
    }

    for (title, paths) in [("Only in left:", &pairing.left_only), ("Only in right:", &pairing.right_only)] {
        if paths.is_empty() {
            continue;
        }
        writeln!(out, "{}", title)?;
        for path in paths {
            writeln!(out, "  {}", path.display())?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

/// Serialize any report as pretty-printed JSON.
///
/// # Arguments
/// * `output_path` - Path to output file
/// * `value` - Any serializable report
pub fn write_json<T: Serialize + ?Sized>(output_path: &Path, value: &T) -> Result<()> {
    let mut out = create(output_path)?;
    serde_json::to_writer_pretty(&mut out, value).context("Failed to serialize report")?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
