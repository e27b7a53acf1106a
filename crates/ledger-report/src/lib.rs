//! Report emitter for parsed wallet dumps.
//!
//! Everything here is a function of an [`AnalysisResult`] and the
//! [`RunConfig`] it was produced with. The tax reports, the address
//! artefacts and `reconciliation.log` are byte-identical for the same inputs
//! (their "generated on" date is the run's reference day). `summary.log`
//! carries the run's wall-clock timestamp and differs between runs.

pub mod address_report;
pub mod run_log;
pub mod tax_report;
pub mod wallet_export;

use std::path::{Path, PathBuf};

use ledger_core::error::{LedgerError, Result};
use ledger_core::settings::{OutputLayout, RunConfig};
use ledger_data::analysis::AnalysisResult;
use tracing::{info, warn};

pub use address_report::{AddressReport, AddressReportPaths};

/// Every file written by [`write_reports`].
#[derive(Debug, Clone, Default)]
pub struct ReportOutputs {
    pub wallet_csvs: Vec<PathBuf>,
    pub wallet_yamls: Vec<PathBuf>,
    pub tax_reports: Vec<PathBuf>,
    pub address_reports: AddressReportPaths,
    pub summary_log: PathBuf,
    pub reconciliation_log: PathBuf,
}

/// Write the complete artefact set for one run under `layout`.
///
/// A per-wallet export that cannot be written is logged and skipped; failures
/// on the run-level reports abort with the underlying error.
pub fn write_reports(
    layout: &OutputLayout,
    result: &AnalysisResult,
    config: &RunConfig,
) -> Result<ReportOutputs> {
    let generated_on = config.resolver.reference();
    let mut outputs = ReportOutputs::default();

    for wallet in &result.wallets {
        match wallet_export::write_wallet_csv(&layout.csv_dir, wallet) {
            Ok(path) => outputs.wallet_csvs.push(path),
            Err(e) => warn!("Failed to write CSV for {}: {}", wallet.wallet, e),
        }
        if config.write_yaml {
            match wallet_export::write_wallet_yaml(&layout.yaml_dir, wallet) {
                Ok(path) => outputs.wallet_yamls.push(path),
                Err(e) => warn!("Failed to write YAML for {}: {}", wallet.wallet, e),
            }
        }
    }

    outputs.tax_reports = tax_report::write_tax_reports(
        &layout.reports_dir,
        &result.wallets,
        &result.aggregator,
        &config.native_token,
        generated_on,
    )?;

    let report = AddressReport::new(result.aggregator.qualified(config.threshold));
    outputs.address_reports =
        report.write_all(&layout.reports_dir, config.threshold, config.top_n)?;

    outputs.summary_log = run_log::write_summary_log(&layout.reports_dir, result)?;
    outputs.reconciliation_log = run_log::write_reconciliation_log(
        &layout.reports_dir,
        &result.reconciliations,
        &config.native_token,
    )?;

    info!(
        "Wrote {} wallet CSVs, {} wallet YAML files, {} tax reports, {} qualifying addresses",
        outputs.wallet_csvs.len(),
        outputs.wallet_yamls.len(),
        outputs.tax_reports.len(),
        report.rows().len(),
    );

    Ok(outputs)
}

/// Write `content` to `path`, replacing any previous file.
pub(crate) fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| LedgerError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Join report lines with a trailing newline.
pub(crate) fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
