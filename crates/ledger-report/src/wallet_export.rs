//! Per-wallet exports: one CSV and one YAML file per dump.

use std::path::{Path, PathBuf};

use csv::Writer;
use ledger_core::error::Result;
use ledger_core::formatting::format_values;
use ledger_core::models::TransactionRecord;
use ledger_data::aggregator::net_values;
use ledger_data::analysis::WalletLedger;
use serde::Serialize;
use tracing::debug;

use crate::write_text;

/// Column order of every per-wallet CSV.
pub const WALLET_CSV_HEADER: [&str; 6] =
    ["date", "wallet", "action", "counterparty", "memo", "values"];

#[derive(Serialize)]
struct WalletYaml<'a> {
    wallet: &'a str,
    transaction_count: usize,
    records: &'a [TransactionRecord],
}

/// CSV row for one record; values are collapsed to one net amount per token.
fn csv_row(record: &TransactionRecord) -> [String; 6] {
    [
        record.date.to_string(),
        record.source.clone(),
        record.action.to_string(),
        record.counterparty.clone(),
        record.memo.clone().unwrap_or_default(),
        format_values(&net_values(&record.values)),
    ]
}

/// Write `<dir>/<wallet>.csv`.
pub fn write_wallet_csv(dir: &Path, wallet: &WalletLedger) -> Result<PathBuf> {
    let path = dir.join(format!("{}.csv", wallet.wallet));
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(WALLET_CSV_HEADER)?;
    for record in &wallet.records {
        wtr.write_record(csv_row(record))?;
    }
    wtr.flush()?;

    debug!("Wrote {} rows to {}", wallet.records.len(), path.display());
    Ok(path)
}

/// Write `<dir>/<wallet>.yaml` with the full record list.
pub fn write_wallet_yaml(dir: &Path, wallet: &WalletLedger) -> Result<PathBuf> {
    let path = dir.join(format!("{}.yaml", wallet.wallet));
    let doc = WalletYaml {
        wallet: &wallet.wallet,
        transaction_count: wallet.records.len(),
        records: &wallet.records,
    };
    write_text(&path, &serde_yaml::to_string(&doc)?)?;
    Ok(path)
}
