//! Address-frequency report.
//!
//! The qualified rows are computed once and then written three ways: a YAML
//! list, a flat CSV and a human-readable digest. All three iterate the same
//! `Vec<AddressRow>`, so they always agree on membership and order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::Writer;
use ledger_core::categories::AddressCategory;
use ledger_core::error::Result;
use ledger_core::formatting::format_count;
use ledger_data::aggregator::AddressRow;
use tracing::debug;

use crate::{join_lines, write_text};

pub const YAML_NAME: &str = "report.yaml";
pub const CSV_NAME: &str = "report.csv";
pub const SUMMARY_NAME: &str = "summary.txt";

pub const ADDRESS_CSV_HEADER: [&str; 5] =
    ["address", "tx_count", "first_seen", "last_seen", "category"];

/// Paths of the three address-frequency artefacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressReportPaths {
    pub yaml: PathBuf,
    pub csv: PathBuf,
    pub summary: PathBuf,
}

/// Qualifying addresses of one run.
#[derive(Debug, Clone, Default)]
pub struct AddressReport {
    rows: Vec<AddressRow>,
}

impl AddressReport {
    pub fn new(rows: Vec<AddressRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[AddressRow] {
        &self.rows
    }

    /// Sum of occurrence counts over all rows.
    pub fn total_transactions(&self) -> u64 {
        self.rows.iter().map(|r| u64::from(r.tx_count)).sum()
    }

    /// The `n` busiest addresses: count descending, then address ascending.
    pub fn top(&self, n: usize) -> Vec<&AddressRow> {
        let mut sorted: Vec<&AddressRow> = self.rows.iter().collect();
        sorted.sort_by(|a, b| b.tx_count.cmp(&a.tx_count).then_with(|| a.address.cmp(&b.address)));
        sorted.truncate(n);
        sorted
    }

    pub fn category_distribution(&self) -> BTreeMap<AddressCategory, usize> {
        let mut dist = BTreeMap::new();
        for row in &self.rows {
            *dist.entry(row.category).or_default() += 1;
        }
        dist
    }

    /// Addresses classified as a DEX.
    pub fn exchange_count(&self) -> usize {
        self.rows.iter().filter(|r| r.category.is_exchange()).count()
    }

    /// Earliest `first_seen` and latest `last_seen` over all rows.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.iter().map(|r| r.first_seen).min()?;
        let last = self.rows.iter().map(|r| r.last_seen).max()?;
        Some((first, last))
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    pub fn render_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.rows)?)
    }

    pub fn render_digest(&self, threshold: u32, top_n: usize) -> String {
        let mut lines = vec![
            "TON Address Activity Summary".to_string(),
            "=".repeat(60),
            format!(
                "Distinct addresses (>= {threshold} txs, exclusions removed): {}",
                format_count(self.rows.len() as u64)
            ),
            format!("Transactions represented: {}", format_count(self.total_transactions())),
            format!("Exchange addresses: {}", format_count(self.exchange_count() as u64)),
            String::new(),
            format!("Top {top_n} active addresses"),
            "-".repeat(40),
        ];
        for row in self.top(top_n) {
            lines.push(format!("  * {} - {} txs ({})", row.address, row.tx_count, row.category));
        }

        lines.push(String::new());
        lines.push("Category distribution".to_string());
        lines.push("-".repeat(40));
        for (category, count) in self.category_distribution() {
            lines.push(format!("  * {category}: {count}"));
        }

        lines.push(String::new());
        lines.push("Global date range".to_string());
        lines.push("-".repeat(40));
        match self.date_range() {
            Some((first, last)) => {
                lines.push(format!("Earliest transaction: {first}"));
                lines.push(format!("Latest transaction:   {last}"));
            }
            None => lines.push("No qualifying addresses".to_string()),
        }

        join_lines(lines)
    }

    // ── Writing ───────────────────────────────────────────────────────────────

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut wtr = Writer::from_path(path)?;
        wtr.write_record(ADDRESS_CSV_HEADER)?;
        for row in &self.rows {
            wtr.write_record([
                row.address.clone(),
                row.tx_count.to_string(),
                row.first_seen.to_string(),
                row.last_seen.to_string(),
                row.category.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write `report.yaml`, `report.csv` and `summary.txt` into `dir`.
    pub fn write_all(
        &self,
        dir: &Path,
        threshold: u32,
        top_n: usize,
    ) -> Result<AddressReportPaths> {
        let paths = AddressReportPaths {
            yaml: dir.join(YAML_NAME),
            csv: dir.join(CSV_NAME),
            summary: dir.join(SUMMARY_NAME),
        };

        write_text(&paths.yaml, &self.render_yaml()?)?;
        self.write_csv(&paths.csv)?;
        write_text(&paths.summary, &self.render_digest(threshold, top_n))?;

        debug!("Wrote address report with {} rows to {}", self.rows.len(), dir.display());
        Ok(paths)
    }
}
