use rust_decimal::Decimal;

use crate::models::TokenAmount;

/// Render a decimal without trailing zeros.
///
/// # Examples
///
/// ```
/// use ledger_core::formatting::format_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_amount(Decimal::new(1250, 2)), "12.5");
/// assert_eq!(format_amount(Decimal::new(-500, 2)), "-5");
/// assert_eq!(format_amount(Decimal::ZERO), "0");
/// ```
pub fn format_amount(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Render net values as `"<amount> <token> | <amount> <token> ..."`.
///
/// # Examples
///
/// ```
/// use ledger_core::formatting::format_values;
/// use ledger_core::models::TokenAmount;
/// use rust_decimal::Decimal;
///
/// let values = vec![
///     TokenAmount::new("TON", Decimal::new(-5, 0)),
///     TokenAmount::new("USDT", Decimal::new(300, 2)),
/// ];
/// assert_eq!(format_values(&values), "-5 TON | 3 USDT");
/// assert_eq!(format_values(&[]), "");
/// ```
pub fn format_values(values: &[TokenAmount]) -> String {
    values
        .iter()
        .map(|v| format!("{} {}", format_amount(v.amount), v.token))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Format an integer count with thousands separators.
///
/// # Examples
///
/// ```
/// use ledger_core::formatting::format_count;
///
/// assert_eq!(format_count(5), "5");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // ── format_amount ────────────────────────────────────────────────────────

    #[test]
    fn test_format_amount_strips_trailing_zeros() {
        assert_eq!(format_amount(dec!(4.9600)), "4.96");
        assert_eq!(format_amount(dec!(100.00)), "100");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(format_amount(dec!(-0.5)), "-0.5");
    }

    #[test]
    fn test_format_amount_keeps_small_precision() {
        assert_eq!(format_amount(dec!(0.000000001)), "0.000000001");
    }

    // ── format_values ────────────────────────────────────────────────────────

    #[test]
    fn test_format_values_single() {
        let values = vec![TokenAmount::new("TON", dec!(-2))];
        assert_eq!(format_values(&values), "-2 TON");
    }

    #[test]
    fn test_format_values_keeps_order() {
        let values = vec![
            TokenAmount::new("USD₮", dec!(10)),
            TokenAmount::new("TON", dec!(-1.25)),
        ];
        assert_eq!(format_values(&values), "10 USD₮ | -1.25 TON");
    }

    // ── format_count ─────────────────────────────────────────────────────────

    #[test]
    fn test_group_thousands_one_digit() {
        assert_eq!(format_count(5), "5");
    }

    #[test]
    fn test_group_thousands_four_digits() {
        assert_eq!(format_count(1234), "1,234");
    }

    #[test]
    fn test_group_thousands_exact_thousands() {
        assert_eq!(format_count(1_000), "1,000");
    }

    #[test]
    fn test_group_thousands_seven_digits() {
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
