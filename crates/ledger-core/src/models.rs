use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counterparty used when no action line named one.
pub const COUNTERPARTY_PLACEHOLDER: &str = "-";

// ── ActionKind ────────────────────────────────────────────────────────────────

/// What a transaction did, as named by its first action-detail line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Sent,
    Received,
    Swap,
    Stake,
    Withdraw,
    NftTransfer,
    ContractCall,
    Burn,
    Mint,
    /// No action line was recognised inside the record.
    Unknown,
}

/// Line prefixes that open an action-detail line, evaluated top to bottom.
pub const ACTION_PREFIXES: &[(&str, ActionKind)] = &[
    ("Sent TON", ActionKind::Sent),
    ("Send token", ActionKind::Sent),
    ("Received TON", ActionKind::Received),
    ("Received token", ActionKind::Received),
    ("Swap tokens", ActionKind::Swap),
    ("Deposit stake", ActionKind::Stake),
    ("Stake withdraw", ActionKind::Withdraw),
    ("Withdrawal request", ActionKind::Withdraw),
    ("Send NFT", ActionKind::NftTransfer),
    ("Received NFT", ActionKind::NftTransfer),
    ("Called contract", ActionKind::ContractCall),
    ("Burn token", ActionKind::Burn),
    ("Mint token", ActionKind::Mint),
];

impl ActionKind {
    /// Match `line` against [`ACTION_PREFIXES`].
    ///
    /// Returns the action together with the byte length of the matched prefix.
    pub fn from_line(line: &str) -> Option<(ActionKind, usize)> {
        ACTION_PREFIXES
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix))
            .map(|(prefix, kind)| (*kind, prefix.len()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Sent => "sent",
            ActionKind::Received => "received",
            ActionKind::Swap => "swap",
            ActionKind::Stake => "stake",
            ActionKind::Withdraw => "withdraw",
            ActionKind::NftTransfer => "nft-transfer",
            ActionKind::ContractCall => "contract-call",
            ActionKind::Burn => "burn",
            ActionKind::Mint => "mint",
            ActionKind::Unknown => "unknown",
        }
    }

    /// Actions that legitimately carry no amount lines.
    pub fn allows_empty_values(&self) -> bool {
        matches!(
            self,
            ActionKind::ContractCall | ActionKind::NftTransfer | ActionKind::Unknown
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── DateQuality ───────────────────────────────────────────────────────────────

/// How trustworthy a record's date is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateQuality {
    /// The header carried day, month and a four-digit year.
    #[default]
    Exact,
    /// The header had no year; the reference year was assumed.
    YearAssumed,
    /// The header could not be resolved and the reference date was used.
    Fallback,
}

// ── TokenAmount ───────────────────────────────────────────────────────────────

/// One signed amount of one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Token symbol exactly as written in the dump (e.g. `TON`, `USD₮`).
    pub token: String,
    /// Positive for incoming, negative for outgoing.
    pub amount: Decimal,
}

impl TokenAmount {
    pub fn new(token: impl Into<String>, amount: Decimal) -> Self {
        Self {
            token: token.into(),
            amount,
        }
    }

    /// Case-insensitive symbol comparison.
    pub fn is_token(&self, symbol: &str) -> bool {
        self.token.eq_ignore_ascii_case(symbol)
    }
}

// ── TransactionRecord ─────────────────────────────────────────────────────────

/// A single transaction reconstructed from a dump file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Calendar day of the transaction.
    pub date: NaiveDate,
    /// Whether `date` was read, partially assumed, or guessed.
    #[serde(default)]
    pub date_quality: DateQuality,
    pub action: ActionKind,
    /// Other side of the transaction, or [`COUNTERPARTY_PLACEHOLDER`].
    pub counterparty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Signed amounts in encounter order.
    #[serde(default)]
    pub values: Vec<TokenAmount>,
    /// Wallet (dump file stem) the record came from.
    pub source: String,
}

impl TransactionRecord {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// `true` when the counterparty is a real address rather than the placeholder.
    pub fn has_counterparty(&self) -> bool {
        !self.counterparty.is_empty() && self.counterparty != COUNTERPARTY_PLACEHOLDER
    }

    /// `true` when the record carries no amounts although its action should.
    pub fn lacks_expected_values(&self) -> bool {
        self.values.is_empty() && !self.action.allows_empty_values()
    }
}

// ── AddressStat ───────────────────────────────────────────────────────────────

/// Occurrence statistics for one counterparty address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressStat {
    pub address: String,
    pub count: u32,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
}

impl AddressStat {
    /// Statistics for an address seen once on `date`.
    pub fn first_sighting(address: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            address: address.into(),
            count: 1,
            first_seen: date,
            last_seen: date,
        }
    }

    /// Count another occurrence, widening the seen range with min/max semantics.
    pub fn record_sighting(&mut self, date: NaiveDate) {
        self.count += 1;
        self.first_seen = self.first_seen.min(date);
        self.last_seen = self.last_seen.max(date);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
