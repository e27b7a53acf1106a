//! Cross-check of parsed native-token totals against the raw dump text.
//!
//! The segmenter reads at most one value per action line and ignores lines
//! outside a record. Scanning every line independently catches dumps where
//! that loses amounts.

use ledger_core::models::TransactionRecord;
use ledger_core::values::ValueExtractor;
use rust_decimal::Decimal;
use tracing::warn;

use crate::reader::is_failed_line;

/// Result of reconciling one wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub wallet: String,
    /// Net native amount summed from parsed records.
    pub parsed_net: Decimal,
    /// Net native amount summed from a raw scan of the dump lines.
    pub raw_net: Decimal,
}

impl Reconciliation {
    pub fn is_match(&self) -> bool {
        self.parsed_net == self.raw_net
    }

    pub fn difference(&self) -> Decimal {
        (self.parsed_net - self.raw_net).abs()
    }
}

/// Sum every signed `token` amount in the non-failed `lines`.
pub fn raw_token_net<S: AsRef<str>>(lines: &[S], token: &str) -> Decimal {
    lines
        .iter()
        .map(|l| l.as_ref())
        .filter(|l| !is_failed_line(l))
        .flat_map(ValueExtractor::scan)
        .filter(|v| v.is_token(token))
        .map(|v| v.amount)
        .sum()
}

/// Compare parsed records for `wallet` with its raw dump lines.
pub fn reconcile_wallet<'a, S: AsRef<str>>(
    wallet: &str,
    lines: &[S],
    records: impl IntoIterator<Item = &'a TransactionRecord>,
    token: &str,
) -> Reconciliation {
    let parsed_net = records
        .into_iter()
        .flat_map(|r| r.values.iter())
        .filter(|v| v.is_token(token))
        .map(|v| v.amount)
        .sum();
    let result = Reconciliation {
        wallet: wallet.to_string(),
        parsed_net,
        raw_net: raw_token_net(lines, token),
    };
    if !result.is_match() {
        warn!(
            "{}: parsed {} net {} differs from raw scan {}",
            wallet, token, result.parsed_net, result.raw_net
        );
    }
    result
}
