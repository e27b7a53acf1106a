use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use rust_decimal::Decimal;

use crate::models::TokenAmount;

/// Sign, amount with optional thousands groups, then a token symbol.
///
/// The sign must open the line or follow whitespace so hyphens inside
/// addresses are never read as a minus.
static SIGNED_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|\s)([+\-\x{2212}])\s*(\d+(?:[, \x{00A0}\x{202F}]\d{3})*(?:\.\d+)?)\s+([\p{L}\p{Sc}][\p{L}\p{N}\p{Sc}_\-]*)",
    )
    .expect("regex is valid")
});

/// A value found in a line together with the byte range of its match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedValue {
    pub value: TokenAmount,
    /// Byte offset of the sign character.
    pub start: usize,
    /// Byte offset just past the token symbol.
    pub end: usize,
}

// ── ValueExtractor ────────────────────────────────────────────────────────────

/// Reads signed token amounts such as `+ 12.5 TON`, `− 1 000 USD₮` or
/// `-3,250.75 NOT` out of dump lines.
pub struct ValueExtractor;

impl ValueExtractor {
    /// First signed value in `line`, if any.
    pub fn extract(line: &str) -> Option<ExtractedValue> {
        SIGNED_VALUE
            .captures_iter(line)
            .find_map(|caps| Self::from_captures(&caps))
    }

    /// Every signed value in `line`, in order.
    pub fn scan(line: &str) -> Vec<TokenAmount> {
        SIGNED_VALUE
            .captures_iter(line)
            .filter_map(|caps| Self::from_captures(&caps))
            .map(|extracted| extracted.value)
            .collect()
    }

    fn from_captures(caps: &Captures<'_>) -> Option<ExtractedValue> {
        let sign = caps.get(1)?;
        let digits: String = caps[2]
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        // Amounts beyond Decimal's range are treated as unparseable.
        let magnitude = Decimal::from_str(&digits).ok()?;
        let amount = if sign.as_str() == "+" {
            magnitude
        } else {
            -magnitude
        };
        let token = caps.get(3)?;

        Some(ExtractedValue {
            value: TokenAmount::new(token.as_str(), amount),
            start: sign.start(),
            end: token.end(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
