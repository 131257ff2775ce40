//! Shared numeric helpers for money and percentage arithmetic
//!
//! All amounts are `rust_decimal::Decimal` values in a single implicit
//! currency. Money is carried at two decimal places and rounded half away
//! from zero, which is how the amounts are printed on a quote.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::error::PricingError;

/// Number of decimal places kept on money amounts
pub const MONEY_SCALE: u32 = 2;

/// One hundred, the denominator of every percentage
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round an amount to cents
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage for display (two decimals)
pub fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `value × pct / 100`, unrounded
pub fn percent_of(value: Decimal, pct: Decimal) -> Decimal {
    value * pct / HUNDRED
}

/// `a × b`, failing instead of overflowing
pub fn checked_mul(
    a: Decimal,
    b: Decimal,
    operation: &'static str,
) -> Result<Decimal, PricingError> {
    a.checked_mul(b).ok_or(PricingError::AmountOverflow { operation })
}

/// `a + b`, failing instead of overflowing
pub fn checked_add(
    a: Decimal,
    b: Decimal,
    operation: &'static str,
) -> Result<Decimal, PricingError> {
    a.checked_add(b).ok_or(PricingError::AmountOverflow { operation })
}

/// `value × pct / 100`, failing instead of overflowing
pub fn checked_percent_of(
    value: Decimal,
    pct: Decimal,
    operation: &'static str,
) -> Result<Decimal, PricingError> {
    checked_mul(value, pct / HUNDRED, operation)
}

/// Share of `part` in `total` as a percentage, 0 when `total` is 0
pub fn share_of(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        part / total * HUNDRED
    }
}

/// `numerator / denominator`, 0 when the denominator is 0
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(1.004)), dec!(1.00));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_money(dec!(1125)), dec!(1125));
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(dec!(1125), dec!(20)), dec!(225));
        assert_eq!(percent_of(dec!(0), dec!(20)), dec!(0));
    }

    #[test]
    fn test_share_of_zero_total() {
        assert_eq!(share_of(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(share_of(dec!(20), dec!(80)), dec!(25));
    }

    #[test]
    fn test_checked_helpers_report_overflow() {
        assert_eq!(checked_mul(dec!(1.5), dec!(4), "test").unwrap(), dec!(6));
        assert_eq!(checked_percent_of(dec!(1125), dec!(20), "test").unwrap(), dec!(225));
        assert_eq!(
            checked_mul(Decimal::MAX, dec!(2), "line cost"),
            Err(PricingError::AmountOverflow {
                operation: "line cost"
            })
        );
        assert!(checked_add(Decimal::MAX, Decimal::ONE, "total").is_err());
        assert!(checked_percent_of(Decimal::MAX, dec!(150), "margin").is_err());
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(dec!(12), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(dec!(12), dec!(4)), dec!(3));
    }
}
