//! Main parsing pipeline.
//!
//! Walks the dump directory one file at a time, segments each wallet into
//! records, feeds accepted records into the run's [`LedgerAggregator`], and
//! returns an [`AnalysisResult`] ready for the report layer.

use std::path::{Path, PathBuf};

use chrono::Utc;
use ledger_core::error::Result;
use ledger_core::models::{DateQuality, TransactionRecord};
use ledger_core::settings::{RunConfig, UnknownDatePolicy};
use tracing::{debug, info, warn};

use crate::aggregator::LedgerAggregator;
use crate::reader::{find_dump_files, read_dump, wallet_name};
use crate::reconcile::{reconcile_wallet, Reconciliation};
use crate::segmenter::RecordSegmenter;

// ── Public types ──────────────────────────────────────────────────────────────

/// All accepted records of one wallet dump, in file order.
#[derive(Debug, Clone)]
pub struct WalletLedger {
    pub wallet: String,
    pub path: PathBuf,
    pub records: Vec<TransactionRecord>,
}

/// A dump that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Counters describing one run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    pub files_found: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    /// Records accepted into aggregation and reports.
    pub transactions: usize,
    /// Records whose header could not be resolved and were dated with the
    /// reference day.
    pub estimated_dates: usize,
    /// Records left out because their date could not be resolved.
    pub skipped_records: usize,
}

/// The complete output of [`analyze_dumps`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub wallets: Vec<WalletLedger>,
    pub aggregator: LedgerAggregator,
    pub failures: Vec<FileFailure>,
    pub reconciliations: Vec<Reconciliation>,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Every accepted record across all wallets, in processing order.
    pub fn all_records(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.wallets.iter().flat_map(|w| w.records.iter())
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Records of one wallet split by the unknown-date policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedWallet {
    /// Records folded into the aggregator and written to reports.
    pub accepted: Vec<TransactionRecord>,
    /// Records left out under [`UnknownDatePolicy::Skip`].
    pub skipped: Vec<TransactionRecord>,
}

impl ProcessedWallet {
    /// Every segmented record: accepted ones first, then skipped ones.
    pub fn all_parsed(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.accepted.iter().chain(self.skipped.iter())
    }
}

/// Segment one wallet's lines and fold the accepted records into `aggregator`.
pub fn process_lines<S: AsRef<str>>(
    wallet: &str,
    lines: &[S],
    config: &RunConfig,
    aggregator: &mut LedgerAggregator,
) -> ProcessedWallet {
    let segmenter = RecordSegmenter::new(wallet, config.resolver);
    let records = segmenter.segment(lines.iter().map(|l| l.as_ref()));

    let (skipped, accepted): (Vec<_>, Vec<_>) = records.into_iter().partition(|r| {
        config.unknown_dates == UnknownDatePolicy::Skip && r.date_quality == DateQuality::Fallback
    });

    for record in &accepted {
        aggregator.record(record);
    }

    ProcessedWallet { accepted, skipped }
}

/// Run the full pipeline over every dump in `input_dir`.
///
/// A dump that cannot be read is recorded as a [`FileFailure`] and the run
/// continues; only a missing input directory aborts.
pub fn analyze_dumps(input_dir: &Path, config: &RunConfig) -> Result<AnalysisResult> {
    let files = find_dump_files(input_dir)?;
    if files.is_empty() {
        warn!("No dump files found in {}", input_dir.display());
    }

    let mut aggregator = LedgerAggregator::new(config.exclusions.clone());
    let mut wallets = Vec::new();
    let mut failures = Vec::new();
    let mut reconciliations = Vec::new();
    let mut metadata = AnalysisMetadata {
        files_found: files.len(),
        ..Default::default()
    };

    for path in &files {
        let wallet = wallet_name(path);
        info!("Processing file: {}", wallet);

        let lines = match read_dump(path) {
            Ok(lines) => lines,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                failures.push(FileFailure {
                    path: path.clone(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        let processed = process_lines(&wallet, &lines, config, &mut aggregator);
        let estimated = processed
            .accepted
            .iter()
            .filter(|r| r.date_quality == DateQuality::Fallback)
            .count();

        debug!(
            "File {}: {} lines, {} records, {} estimated dates, {} skipped",
            path.display(),
            lines.len(),
            processed.accepted.len(),
            estimated,
            processed.skipped.len(),
        );

        // Skipped records were still parsed; their amounts belong in the check.
        reconciliations.push(reconcile_wallet(
            &wallet,
            &lines,
            processed.all_parsed(),
            &config.native_token,
        ));

        metadata.files_processed += 1;
        metadata.transactions += processed.accepted.len();
        metadata.estimated_dates += estimated;
        metadata.skipped_records += processed.skipped.len();

        wallets.push(WalletLedger {
            wallet,
            path: path.clone(),
            records: processed.accepted,
        });
    }

    metadata.files_failed = failures.len();
    metadata.generated_at = Utc::now().to_rfc3339();

    info!(
        "Processed {} of {} files ({} failed), {} transactions",
        metadata.files_processed, metadata.files_found, metadata.files_failed, metadata.transactions
    );

    Ok(AnalysisResult {
        wallets,
        aggregator,
        failures,
        reconciliations,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
