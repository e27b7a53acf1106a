use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Heuristic label for a counterparty address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressCategory {
    DexDedust,
    DexStonfi,
    NftMarketplace,
    NftCollection,
    UserWallet,
    Other,
}

impl AddressCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressCategory::DexDedust => "dex_dedust",
            AddressCategory::DexStonfi => "dex_stonfi",
            AddressCategory::NftMarketplace => "nft_marketplace",
            AddressCategory::NftCollection => "nft_collection",
            AddressCategory::UserWallet => "user_wallet",
            AddressCategory::Other => "other",
        }
    }

    pub fn is_exchange(&self) -> bool {
        matches!(self, AddressCategory::DexDedust | AddressCategory::DexStonfi)
    }
}

impl fmt::Display for AddressCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered rules; the first matching pattern decides the category.
static RULES: LazyLock<Vec<(Regex, AddressCategory)>> = LazyLock::new(|| {
    [
        (r"(?i)dedust", AddressCategory::DexDedust),
        (r"(?i)ston\.?fi", AddressCategory::DexStonfi),
        (r"(?i)official[-_]nft\.ton", AddressCategory::NftMarketplace),
        (r"(?i)getgems", AddressCategory::NftMarketplace),
        (r"(?i)sphynxmeme\.ton", AddressCategory::NftCollection),
        (r"^UQ[A-Z]{2}", AddressCategory::UserWallet),
    ]
    .into_iter()
    .map(|(pattern, category)| (Regex::new(pattern).expect("regex is valid"), category))
    .collect()
});

/// Categorise `address`. Pure; falls back to [`AddressCategory::Other`].
pub fn classify(address: &str) -> AddressCategory {
    RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(address))
        .map(|(_, category)| *category)
        .unwrap_or(AddressCategory::Other)
}
