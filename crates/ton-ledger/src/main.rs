mod bootstrap;

use anyhow::{Context, Result};
use clap::Parser;
use ledger_core::formatting::{format_amount, format_count};
use ledger_core::settings::{OutputLayout, RunConfig, Settings};
use ledger_data::analysis::{analyze_dumps, AnalysisResult};
use ledger_report::{write_reports, ReportOutputs};

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::info!("TON Ledger v{} starting", env!("CARGO_PKG_VERSION"));

    let config = RunConfig::from_settings(&settings).context("failed to resolve configuration")?;
    tracing::info!(
        "Input: {}, threshold: {}, native token: {}, {} excluded addresses",
        settings.input_dir.display(),
        config.threshold,
        config.native_token,
        config.exclusions.len()
    );

    let layout = bootstrap::prepare_output(&settings.output_dir)?;

    let result = analyze_dumps(&settings.input_dir, &config)
        .with_context(|| format!("failed to process dumps in {}", settings.input_dir.display()))?;

    let outputs = write_reports(&layout, &result, &config)?;

    print_summary(&result, &outputs, &layout, &config.native_token);

    Ok(())
}

fn print_summary(
    result: &AnalysisResult,
    outputs: &ReportOutputs,
    layout: &OutputLayout,
    native_token: &str,
) {
    let rule = "-".repeat(40);
    let aggregator = &result.aggregator;
    let years: Vec<String> = aggregator.years().iter().map(|y| y.to_string()).collect();

    println!("\nProcessing Summary:");
    println!("{rule}");
    println!("Total wallets processed: {}", format_count(result.wallets.len() as u64));
    println!("Total transactions processed: {}", format_count(aggregator.records_seen()));
    println!("Years processed: {}", years.join(", "));
    println!(
        "Net {native_token} balance: {}",
        format_amount(aggregator.token_balance(native_token))
    );
    if result.metadata.files_failed > 0 {
        println!("Files failed: {}", result.metadata.files_failed);
    }
    if result.metadata.estimated_dates > 0 {
        println!("Transactions with estimated dates: {}", result.metadata.estimated_dates);
    }
    if result.metadata.skipped_records > 0 {
        println!("Transactions skipped for unknown dates: {}", result.metadata.skipped_records);
    }

    println!("\nTransaction Type Counts:");
    println!("{rule}");
    for (action, count) in aggregator.action_counts() {
        println!("{action}: {}", format_count(*count));
    }

    let mismatches = result.reconciliations.iter().filter(|r| !r.is_match()).count();
    if mismatches > 0 {
        println!(
            "\nReconciliation mismatches: {mismatches} (see {})",
            outputs.reconciliation_log.display()
        );
    }

    println!("\nReports generated in:");
    println!("{rule}");
    println!("Per-wallet CSVs      : {}", layout.csv_dir.display());
    if !outputs.wallet_yamls.is_empty() {
        println!("Per-wallet YAML      : {}", layout.yaml_dir.display());
    }
    println!("Tax & address reports: {}", layout.reports_dir.display());
}
