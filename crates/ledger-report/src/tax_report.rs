//! Yearly and combined plain-text tax summaries.
//!
//! Each report has the same three numbered sections:
//!
//! 1. Transaction Statistics: record count and counts per action
//! 2. `<native>` Movements: total sent, received and net of the native token
//! 3. Jetton Holdings: net balance of every other token
//!
//! Yearly reports only look at records dated in that year. The combined report
//! reads its totals from the run's [`LedgerAggregator`] and adds a fourth
//! per-wallet breakdown section.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use ledger_core::error::Result;
use ledger_core::formatting::{format_amount, format_count};
use ledger_core::models::{ActionKind, TransactionRecord};
use ledger_data::aggregator::{action_counts, token_balances, LedgerAggregator, TokenMovements};
use ledger_data::analysis::WalletLedger;
use rust_decimal::Decimal;
use tracing::debug;

use crate::{join_lines, write_text};

pub const COMBINED_REPORT_NAME: &str = "Combined_TON_Tax_Report.txt";

const RULE_WIDTH: usize = 80;
const SECTION_RULE_WIDTH: usize = 40;

/// File name of the report for `year`.
pub fn year_report_name(year: i32) -> String {
    format!("TON_Tax_Report_{year}.txt")
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn header(lines: &mut Vec<String>, title: String, generated_on: NaiveDate) {
    lines.push(title);
    lines.push(format!("Generated on: {generated_on}"));
    lines.push("=".repeat(RULE_WIDTH));
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(String::new());
    lines.push(title.to_string());
    lines.push("-".repeat(SECTION_RULE_WIDTH));
}

fn statistics_section(lines: &mut Vec<String>, total: u64, counts: &BTreeMap<ActionKind, u64>) {
    lines.push(format!("Total transactions: {}", format_count(total)));
    lines.push(String::new());
    lines.push("Transaction types:".to_string());
    for (action, count) in counts {
        lines.push(format!("  {action}: {}", format_count(*count)));
    }
}

fn movements_section(lines: &mut Vec<String>, movements: TokenMovements) {
    lines.push(format!("Sent: {}", format_amount(movements.sent)));
    lines.push(format!("Received: {}", format_amount(movements.received)));
    lines.push(format!("Net: {}", format_amount(movements.net())));
}

fn holdings_section(
    lines: &mut Vec<String>,
    balances: &BTreeMap<String, Decimal>,
    native_token: &str,
) {
    let mut jettons = balances
        .iter()
        .filter(|(token, _)| !token.eq_ignore_ascii_case(native_token))
        .peekable();
    if jettons.peek().is_none() {
        lines.push("No jetton movements".to_string());
    }
    for (token, balance) in jettons {
        lines.push(format!("{token}: {}", format_amount(*balance)));
    }
}

/// Render the report for one calendar year.
///
/// `records` may span several years; only those dated in `year` are counted.
pub fn render_year_report(
    year: i32,
    records: &[&TransactionRecord],
    native_token: &str,
    generated_on: NaiveDate,
) -> String {
    let in_year: Vec<&TransactionRecord> =
        records.iter().copied().filter(|r| r.year() == year).collect();

    let mut lines = Vec::new();
    header(&mut lines, format!("{native_token} Wallet Tax Report {year}"), generated_on);

    section(&mut lines, "1. Transaction Statistics");
    let counts = action_counts(in_year.iter().copied());
    statistics_section(&mut lines, in_year.len() as u64, &counts);

    section(&mut lines, &format!("2. {native_token} Movements"));
    let movements = TokenMovements::for_token(in_year.iter().copied(), native_token);
    movements_section(&mut lines, movements);

    section(&mut lines, "3. Jetton Holdings");
    holdings_section(&mut lines, &token_balances(in_year.iter().copied()), native_token);

    join_lines(lines)
}

/// Render the all-years report across every wallet.
///
/// Totals, action counts and jetton balances come from `aggregator`, which
/// must have been fed exactly the records held by `wallets`.
pub fn render_combined_report(
    wallets: &[WalletLedger],
    aggregator: &LedgerAggregator,
    native_token: &str,
    generated_on: NaiveDate,
) -> String {
    let mut lines = Vec::new();
    header(&mut lines, format!("Combined {native_token} Wallet Tax Report"), generated_on);

    section(&mut lines, "1. Transaction Statistics");
    lines.push(format!("Wallets processed: {}", format_count(wallets.len() as u64)));
    statistics_section(&mut lines, aggregator.records_seen(), aggregator.action_counts());

    section(&mut lines, &format!("2. {native_token} Movements"));
    let records = wallets.iter().flat_map(|w| w.records.iter());
    movements_section(&mut lines, TokenMovements::for_token(records, native_token));

    section(&mut lines, "3. Jetton Holdings");
    holdings_section(&mut lines, aggregator.token_balances(), native_token);

    section(&mut lines, "4. Wallet Breakdown");
    for wallet in wallets {
        let movements = TokenMovements::for_token(&wallet.records, native_token);
        lines.push(format!(
            "{}: {} transactions, in {}, out {}, net {}",
            wallet.wallet,
            format_count(wallet.records.len() as u64),
            format_amount(movements.received),
            format_amount(movements.sent),
            format_amount(movements.net()),
        ));
    }

    join_lines(lines)
}

// ── Writing ───────────────────────────────────────────────────────────────────

/// Write one report per year seen by `aggregator` plus the combined report.
///
/// Returns the written paths, yearly reports in ascending year order first.
pub fn write_tax_reports(
    dir: &Path,
    wallets: &[WalletLedger],
    aggregator: &LedgerAggregator,
    native_token: &str,
    generated_on: NaiveDate,
) -> Result<Vec<PathBuf>> {
    let records: Vec<&TransactionRecord> =
        wallets.iter().flat_map(|w| w.records.iter()).collect();

    let mut written = Vec::with_capacity(aggregator.years().len() + 1);
    for &year in aggregator.years() {
        let path = dir.join(year_report_name(year));
        let text = render_year_report(year, &records, native_token, generated_on);
        write_text(&path, &text)?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }

    let path = dir.join(COMBINED_REPORT_NAME);
    let text = render_combined_report(wallets, aggregator, native_token, generated_on);
    write_text(&path, &text)?;
    written.push(path);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::models::{DateQuality, TokenAmount};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(
        source: &str,
        on: NaiveDate,
        action: ActionKind,
        values: &[(&str, Decimal)],
    ) -> TransactionRecord {
        TransactionRecord {
            date: on,
            date_quality: DateQuality::Exact,
            action,
            counterparty: "ADDR1".to_string(),
            memo: None,
            values: values.iter().map(|(t, a)| TokenAmount::new(*t, *a)).collect(),
            source: source.to_string(),
        }
    }

    fn wallets() -> Vec<WalletLedger> {
        let swap = [("TON", dec!(-1)), ("USDT", dec!(4.50))];
        vec![
            WalletLedger {
                wallet: "main".to_string(),
                path: PathBuf::from("main.txt"),
                records: vec![
                    record("main", date(2024, 9, 12), ActionKind::Sent, &[("TON", dec!(-5))]),
                    record("main", date(2024, 9, 13), ActionKind::Received, &[("TON", dec!(3))]),
                    record("main", date(2025, 1, 2), ActionKind::Swap, &swap),
                ],
            },
            WalletLedger {
                wallet: "side".to_string(),
                path: PathBuf::from("side.txt"),
                records: vec![record(
                    "side",
                    date(2024, 3, 1),
                    ActionKind::Received,
                    &[("NOT", dec!(100))],
                )],
            },
        ]
    }

    fn all_records(wallets: &[WalletLedger]) -> Vec<&TransactionRecord> {
        wallets.iter().flat_map(|w| w.records.iter()).collect()
    }

    fn aggregate(wallets: &[WalletLedger]) -> LedgerAggregator {
        let mut aggregator = LedgerAggregator::default();
        for record in all_records(wallets) {
            aggregator.record(record);
        }
        aggregator
    }

    // ── render_year_report ────────────────────────────────────────────────────

    #[test]
    fn test_year_report_sections() {
        let ws = wallets();
        let text = render_year_report(2024, &all_records(&ws), "TON", date(2025, 6, 30));

        assert!(text.starts_with("TON Wallet Tax Report 2024\nGenerated on: 2025-06-30\n"));
        assert!(text.contains("1. Transaction Statistics"));
        assert!(text.contains("2. TON Movements"));
        assert!(text.contains("3. Jetton Holdings"));
        assert!(text.contains("Total transactions: 3"));
        assert!(text.contains("  sent: 1"));
        assert!(text.contains("  received: 2"));
        assert!(text.contains("Sent: 5\nReceived: 3\nNet: -2"));
        assert!(text.contains("NOT: 100"));
    }

    #[test]
    fn test_year_report_scopes_holdings_to_year() {
        let ws = wallets();
        let text_2024 = render_year_report(2024, &all_records(&ws), "TON", date(2025, 6, 30));
        let text_2025 = render_year_report(2025, &all_records(&ws), "TON", date(2025, 6, 30));

        assert!(!text_2024.contains("USDT"));
        assert!(text_2025.contains("USDT: 4.5"));
        assert!(!text_2025.contains("NOT:"));
        assert!(text_2025.contains("Sent: 1\nReceived: 0\nNet: -1"));
    }

    #[test]
    fn test_year_report_without_jettons() {
        let ws = vec![WalletLedger {
            wallet: "w".to_string(),
            path: PathBuf::from("w.txt"),
            records: vec![record("w", date(2024, 1, 1), ActionKind::Sent, &[("TON", dec!(-1))])],
        }];
        let text = render_year_report(2024, &all_records(&ws), "TON", date(2025, 6, 30));
        let rule = "-".repeat(SECTION_RULE_WIDTH);
        assert!(text.contains(&format!("3. Jetton Holdings\n{rule}\nNo jetton movements")));
    }

    // ── render_combined_report ────────────────────────────────────────────────

    #[test]
    fn test_combined_report() {
        let ws = wallets();
        let text = render_combined_report(&ws, &aggregate(&ws), "TON", date(2025, 6, 30));

        assert!(text.starts_with("Combined TON Wallet Tax Report\n"));
        assert!(text.contains("Wallets processed: 2"));
        assert!(text.contains("Total transactions: 4"));
        assert!(text.contains("  received: 2"));
        assert!(text.contains("  swap: 1"));
        assert!(text.contains("Sent: 6\nReceived: 3\nNet: -3"));
        assert!(text.contains("NOT: 100"));
        assert!(text.contains("USDT: 4.5"));
        assert!(text.contains("4. Wallet Breakdown"));
        assert!(text.contains("main: 3 transactions, in 3, out 6, net -3"));
        assert!(text.contains("side: 1 transactions, in 0, out 0, net 0"));
    }

    #[test]
    fn test_combined_report_reads_totals_from_aggregator() {
        let ws = wallets();
        let mut aggregator = aggregate(&ws);
        let extra = record("side", date(2024, 3, 2), ActionKind::Received, &[("NOT", dec!(5))]);
        aggregator.record(&extra);

        let text = render_combined_report(&ws, &aggregator, "TON", date(2025, 6, 30));

        assert!(text.contains("Total transactions: 5"));
        assert!(text.contains("  received: 3"));
        assert!(text.contains("NOT: 105"));
    }

    // ── write_tax_reports ─────────────────────────────────────────────────────

    #[test]
    fn test_write_tax_reports_one_per_year_plus_combined() {
        let dir = TempDir::new().unwrap();
        let ws = wallets();
        let paths =
            write_tax_reports(dir.path(), &ws, &aggregate(&ws), "TON", date(2025, 6, 30)).unwrap();

        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "TON_Tax_Report_2024.txt",
                "TON_Tax_Report_2025.txt",
                "Combined_TON_Tax_Report.txt"
            ]
        );
    }

    #[test]
    fn test_write_tax_reports_empty_run_writes_combined_only() {
        let dir = TempDir::new().unwrap();
        let aggregator = LedgerAggregator::default();
        let paths =
            write_tax_reports(dir.path(), &[], &aggregator, "TON", date(2025, 6, 30)).unwrap();
        assert_eq!(paths.len(), 1);
        let text = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(text.contains("Total transactions: 0"));
    }
}
