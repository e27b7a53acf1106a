//! Run-level aggregation over parsed transactions.
//!
//! One [`LedgerAggregator`] is created per run and fed every accepted record
//! in processing order. It owns the token balances, per-address statistics
//! and action counts; nothing here is process-global.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use ledger_core::categories::{classify, AddressCategory};
use ledger_core::models::{ActionKind, AddressStat, TokenAmount, TransactionRecord};
use rust_decimal::Decimal;
use serde::Serialize;

// ── Net values ────────────────────────────────────────────────────────────────

/// Collapse repeated token entries into one signed net amount per token.
///
/// Tokens keep the order of their first appearance; each net amount is the
/// exact sum of every entry for that token.
pub fn net_values(values: &[TokenAmount]) -> Vec<TokenAmount> {
    let mut net: Vec<TokenAmount> = Vec::new();
    for value in values {
        match net.iter_mut().find(|n| n.token == value.token) {
            Some(existing) => existing.amount += value.amount,
            None => net.push(value.clone()),
        }
    }
    net
}

// ── TokenMovements ────────────────────────────────────────────────────────────

/// Inflow / outflow totals for one token across a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenMovements {
    /// Sum of outgoing amounts, as a positive number.
    pub sent: Decimal,
    pub received: Decimal,
}

impl TokenMovements {
    /// Sum the raw signed entries for `token` across `records`.
    pub fn for_token<'a>(
        records: impl IntoIterator<Item = &'a TransactionRecord>,
        token: &str,
    ) -> Self {
        let mut movements = Self::default();
        for value in records
            .into_iter()
            .flat_map(|r| r.values.iter())
            .filter(|v| v.is_token(token))
        {
            if value.amount < Decimal::ZERO {
                movements.sent += value.amount.abs();
            } else {
                movements.received += value.amount;
            }
        }
        movements
    }

    pub fn net(&self) -> Decimal {
        self.received - self.sent
    }
}

/// Cumulative signed amount per token symbol.
pub fn token_balances<'a>(
    records: impl IntoIterator<Item = &'a TransactionRecord>,
) -> BTreeMap<String, Decimal> {
    let mut balances: BTreeMap<String, Decimal> = BTreeMap::new();
    for value in records.into_iter().flat_map(|r| r.values.iter()) {
        *balances.entry(value.token.clone()).or_default() += value.amount;
    }
    balances
}

/// Number of records per action.
pub fn action_counts<'a>(
    records: impl IntoIterator<Item = &'a TransactionRecord>,
) -> BTreeMap<ActionKind, u64> {
    let mut counts: BTreeMap<ActionKind, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(record.action).or_default() += 1;
    }
    counts
}

// ── AddressRow ────────────────────────────────────────────────────────────────

/// One qualifying address as written to every address-frequency artefact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRow {
    pub address: String,
    pub tx_count: u32,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    pub category: AddressCategory,
}

// ── LedgerAggregator ──────────────────────────────────────────────────────────

/// Incrementally updated aggregates for one run.
#[derive(Debug, Clone, Default)]
pub struct LedgerAggregator {
    exclusions: BTreeSet<String>,
    token_balances: BTreeMap<String, Decimal>,
    address_stats: BTreeMap<String, AddressStat>,
    action_counts: BTreeMap<ActionKind, u64>,
    years: BTreeSet<i32>,
    records_seen: u64,
}

impl LedgerAggregator {
    pub fn new(exclusions: BTreeSet<String>) -> Self {
        Self {
            exclusions,
            ..Default::default()
        }
    }

    /// Fold one closed record into every aggregate.
    pub fn record(&mut self, record: &TransactionRecord) {
        self.records_seen += 1;
        self.years.insert(record.year());
        *self.action_counts.entry(record.action).or_default() += 1;

        for value in &record.values {
            *self.token_balances.entry(value.token.clone()).or_default() += value.amount;
        }

        if record.has_counterparty() && !self.exclusions.contains(&record.counterparty) {
            match self.address_stats.get_mut(&record.counterparty) {
                Some(stat) => stat.record_sighting(record.date),
                None => {
                    self.address_stats.insert(
                        record.counterparty.clone(),
                        AddressStat::first_sighting(record.counterparty.clone(), record.date),
                    );
                }
            }
        }
    }

    pub fn token_balances(&self) -> &BTreeMap<String, Decimal> {
        &self.token_balances
    }

    pub fn token_balance(&self, token: &str) -> Decimal {
        self.token_balances
            .get(token)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn address_stats(&self) -> &BTreeMap<String, AddressStat> {
        &self.address_stats
    }

    pub fn action_counts(&self) -> &BTreeMap<ActionKind, u64> {
        &self.action_counts
    }

    /// Calendar years that contain at least one record, ascending.
    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    pub fn records_seen(&self) -> u64 {
        self.records_seen
    }

    /// Addresses seen at least `threshold` times, ordered by address.
    pub fn qualified(&self, threshold: u32) -> Vec<AddressRow> {
        self.address_stats
            .values()
            .filter(|stat| stat.count >= threshold)
            .map(|stat| AddressRow {
                address: stat.address.clone(),
                tx_count: stat.count,
                first_seen: stat.first_seen,
                last_seen: stat.last_seen,
                category: classify(&stat.address),
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::models::DateQuality;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_record(
        d: NaiveDate,
        action: ActionKind,
        counterparty: &str,
        values: &[(&str, Decimal)],
    ) -> TransactionRecord {
        TransactionRecord {
            date: d,
            date_quality: DateQuality::Exact,
            action,
            counterparty: counterparty.to_string(),
            memo: None,
            values: values
                .iter()
                .map(|(t, a)| TokenAmount::new(*t, *a))
                .collect(),
            source: "wallet".to_string(),
        }
    }

    // ── net_values ────────────────────────────────────────────────────────────

    #[test]
    fn test_net_values_groups_by_token() {
        let values = vec![
            TokenAmount::new("TON", dec!(-10)),
            TokenAmount::new("USDT", dec!(55)),
            TokenAmount::new("TON", dec!(0.25)),
            TokenAmount::new("TON", dec!(-0.05)),
        ];
        let net = net_values(&values);
        assert_eq!(
            net,
            vec![TokenAmount::new("TON", dec!(-9.80)), TokenAmount::new("USDT", dec!(55))]
        );
    }

    #[test]
    fn test_net_values_equals_raw_sum_per_token() {
        let values = vec![
            TokenAmount::new("A", dec!(1.1)),
            TokenAmount::new("B", dec!(-2)),
            TokenAmount::new("A", dec!(-3.3)),
            TokenAmount::new("B", dec!(0.000001)),
        ];
        for net in net_values(&values) {
            let raw: Decimal = values
                .iter()
                .filter(|v| v.token == net.token)
                .map(|v| v.amount)
                .sum();
            assert_eq!(net.amount, raw);
        }
    }

    #[test]
    fn test_net_values_empty() {
        assert!(net_values(&[]).is_empty());
    }

    #[test]
    fn test_net_values_case_sensitive_symbols() {
        let values = vec![TokenAmount::new("TON", dec!(1)), TokenAmount::new("ton", dec!(1))];
        assert_eq!(net_values(&values).len(), 2);
    }

    // ── TokenMovements ────────────────────────────────────────────────────────

    #[test]
    fn test_token_movements_split_sent_received() {
        let records = vec![
            make_record(date(2024, 1, 1), ActionKind::Sent, "A", &[("TON", dec!(-5))]),
            make_record(
                date(2024, 1, 2),
                ActionKind::Received,
                "A",
                &[("TON", dec!(3)), ("USDT", dec!(7))],
            ),
            make_record(date(2024, 1, 3), ActionKind::Sent, "B", &[("ton", dec!(-1.5))]),
        ];
        let movements = TokenMovements::for_token(&records, "TON");
        assert_eq!(movements.sent, dec!(6.5));
        assert_eq!(movements.received, dec!(3));
        assert_eq!(movements.net(), dec!(-3.5));
    }

    // ── token_balances / action_counts ────────────────────────────────────────

    #[test]
    fn test_token_balances_and_action_counts() {
        let records = vec![
            make_record(date(2024, 1, 1), ActionKind::Sent, "A", &[("TON", dec!(-5))]),
            make_record(date(2024, 1, 2), ActionKind::Received, "A", &[("TON", dec!(3))]),
            make_record(date(2024, 1, 3), ActionKind::Received, "B", &[("NOT", dec!(100))]),
        ];
        let balances = token_balances(&records);
        assert_eq!(balances["TON"], dec!(-2));
        assert_eq!(balances["NOT"], dec!(100));

        let counts = action_counts(&records);
        assert_eq!(counts[&ActionKind::Received], 2);
        assert_eq!(counts[&ActionKind::Sent], 1);
    }

    // ── LedgerAggregator ──────────────────────────────────────────────────────

    #[test]
    fn test_aggregator_two_record_scenario() {
        let mut agg = LedgerAggregator::default();
        let sent = [("TON", dec!(-5))];
        let received = [("TON", dec!(3))];
        agg.record(&make_record(date(2024, 9, 12), ActionKind::Sent, "ADDR1", &sent));
        agg.record(&make_record(date(2024, 9, 13), ActionKind::Received, "ADDR1", &received));

        assert_eq!(agg.token_balance("TON"), dec!(-2));
        let stat = &agg.address_stats()["ADDR1"];
        assert_eq!(stat.count, 2);
        assert_eq!(stat.first_seen, date(2024, 9, 12));
        assert_eq!(stat.last_seen, date(2024, 9, 13));
        assert_eq!(agg.records_seen(), 2);
    }

    #[test]
    fn test_aggregator_skips_excluded_and_placeholder() {
        let exclusions: BTreeSet<String> = ["UQself".to_string()].into_iter().collect();
        let mut agg = LedgerAggregator::new(exclusions);
        let sent = [("TON", dec!(-1))];
        agg.record(&make_record(date(2024, 1, 1), ActionKind::Sent, "UQself", &sent));
        agg.record(&make_record(date(2024, 1, 1), ActionKind::Unknown, "-", &[]));

        assert!(agg.address_stats().is_empty());
        // Excluded counterparties still contribute to balances.
        assert_eq!(agg.token_balance("TON"), dec!(-1));
        assert_eq!(agg.action_counts()[&ActionKind::Unknown], 1);
    }

    #[test]
    fn test_aggregator_unseen_address_absent() {
        let agg = LedgerAggregator::default();
        assert!(agg.address_stats().get("never").is_none());
        assert_eq!(agg.token_balance("TON"), Decimal::ZERO);
    }

    #[test]
    fn test_aggregator_years_sorted() {
        let mut agg = LedgerAggregator::default();
        agg.record(&make_record(date(2025, 1, 1), ActionKind::Sent, "A", &[]));
        agg.record(&make_record(date(2023, 1, 1), ActionKind::Sent, "A", &[]));
        agg.record(&make_record(date(2024, 1, 1), ActionKind::Sent, "A", &[]));
        let years: Vec<i32> = agg.years().iter().copied().collect();
        assert_eq!(years, vec![2023, 2024, 2025]);
    }

    #[test]
    fn test_qualified_threshold_boundary() {
        let mut agg = LedgerAggregator::default();
        for day in 1..=4 {
            agg.record(&make_record(date(2024, 3, day), ActionKind::Sent, "UQXfour", &[]));
        }
        for day in 1..=5 {
            agg.record(&make_record(date(2024, 3, day), ActionKind::Sent, "dedust.ton", &[]));
        }

        let rows = agg.qualified(5);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].address, "dedust.ton");
        assert_eq!(rows[0].tx_count, 5);
        assert_eq!(rows[0].category, AddressCategory::DexDedust);

        agg.record(&make_record(date(2024, 4, 1), ActionKind::Sent, "UQXfour", &[]));
        let rows = agg.qualified(5);
        assert_eq!(rows.len(), 2);
        let four = rows.iter().find(|r| r.address == "UQXfour").unwrap();
        assert_eq!(four.tx_count, 5);
        assert_eq!(four.last_seen, date(2024, 4, 1));
    }

    #[test]
    fn test_qualified_ordered_by_address() {
        let mut agg = LedgerAggregator::default();
        for addr in ["c", "a", "b"] {
            agg.record(&make_record(date(2024, 1, 1), ActionKind::Sent, addr, &[]));
        }
        let order: Vec<String> = agg.qualified(1).into_iter().map(|r| r.address).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}
