//! Peso amounts.
//!
//! Money is a plain [`Decimal`] in Philippine pesos; there is no multi-currency
//! support because the backend has none.

use rust_decimal::Decimal;

/// Currency symbol shown in front of every amount.
pub const PESO_SIGN: char = '₱';

/// Format an amount for display, e.g. `₱1,250.00`.
///
/// ```
/// use rust_decimal::Decimal;
/// use segunda_mana_core::format_peso;
///
/// assert_eq!(format_peso(Decimal::new(125_050, 2)), "₱1,250.50");
/// assert_eq!(format_peso(Decimal::ZERO), "₱0.00");
/// ```
#[must_use]
pub fn format_peso(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2).abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{PESO_SIGN}{grouped}.{cents}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_thousands() {
        assert_eq!(format_peso(Decimal::new(1_234_567, 0)), "₱1,234,567.00");
        assert_eq!(format_peso(Decimal::new(999, 0)), "₱999.00");
        assert_eq!(format_peso(Decimal::new(1000, 0)), "₱1,000.00");
    }

    #[test]
    fn test_rounds_to_centavos() {
        assert_eq!(format_peso(Decimal::new(19_999, 3)), "₱20.00");
    }

    #[test]
    fn test_negative() {
        assert_eq!(format_peso(Decimal::new(-5000, 2)), "-₱50.00");
    }
}
