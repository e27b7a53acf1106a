//! Run bookkeeping written next to the reports: `summary.log` and
//! `reconciliation.log`.

use std::path::{Path, PathBuf};

use ledger_core::error::Result;
use ledger_core::formatting::{format_amount, format_count};
use ledger_data::analysis::{AnalysisMetadata, AnalysisResult, FileFailure};
use ledger_data::reconcile::Reconciliation;

use crate::{join_lines, write_text};

pub const SUMMARY_LOG_NAME: &str = "summary.log";
pub const RECONCILIATION_LOG_NAME: &str = "reconciliation.log";

pub fn render_summary_log(metadata: &AnalysisMetadata, failures: &[FileFailure]) -> String {
    let count = |n: usize| format_count(n as u64);
    let mut lines = vec![
        "Processing Summary".to_string(),
        format!("Generated at: {}", metadata.generated_at),
        "=".repeat(40),
        format!("Files found: {}", count(metadata.files_found)),
        format!("Files processed: {}", count(metadata.files_processed)),
        format!("Files failed: {}", count(metadata.files_failed)),
        format!("Transactions: {}", count(metadata.transactions)),
        format!("Estimated dates: {}", count(metadata.estimated_dates)),
        format!("Skipped records: {}", count(metadata.skipped_records)),
        String::new(),
    ];

    if failures.is_empty() {
        lines.push("Errors: none".to_string());
    } else {
        lines.push("Errors:".to_string());
        for failure in failures {
            lines.push(format!("  {}: {}", failure.path.display(), failure.message));
        }
    }

    join_lines(lines)
}

pub fn render_reconciliation_log(reconciliations: &[Reconciliation], native_token: &str) -> String {
    let mut lines = vec![format!("{native_token} Reconciliation"), "=".repeat(40)];

    for rec in reconciliations {
        if rec.is_match() {
            lines.push(format!("{}: MATCH ({})", rec.wallet, format_amount(rec.parsed_net)));
        } else {
            lines.push(format!(
                "{}: MISMATCH (parsed {}, raw {}, difference {})",
                rec.wallet,
                format_amount(rec.parsed_net),
                format_amount(rec.raw_net),
                format_amount(rec.difference()),
            ));
        }
    }

    let mismatches = reconciliations.iter().filter(|r| !r.is_match()).count();
    lines.push(String::new());
    lines.push(format!(
        "Total: {} wallets, {} mismatched",
        reconciliations.len(),
        mismatches
    ));

    join_lines(lines)
}

pub fn write_summary_log(dir: &Path, result: &AnalysisResult) -> Result<PathBuf> {
    let path = dir.join(SUMMARY_LOG_NAME);
    write_text(&path, &render_summary_log(&result.metadata, &result.failures))?;
    Ok(path)
}

pub fn write_reconciliation_log(
    dir: &Path,
    reconciliations: &[Reconciliation],
    native_token: &str,
) -> Result<PathBuf> {
    let path = dir.join(RECONCILIATION_LOG_NAME);
    write_text(&path, &render_reconciliation_log(reconciliations, native_token))?;
    Ok(path)
}
