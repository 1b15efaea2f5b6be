//! Half-day quantities for leave amounts.
//!
//! CRITICAL: Never use floating-point for leave amounts.
//! Amounts are `rust_decimal::Decimal` in the domain and integer half-day
//! units at the storage boundary, the ledger's smallest unit.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Half a day, the ledger's granularity.
pub const HALF_DAY: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Returns true if `days` is a whole multiple of half a day.
#[must_use]
pub fn is_half_day_multiple(days: Decimal) -> bool {
    (days * Decimal::TWO).fract().is_zero()
}

/// Converts a day amount into half-day units.
///
/// Returns `None` when the amount is not a multiple of 0.5 or does not fit.
#[must_use]
pub fn to_half_days(days: Decimal) -> Option<i64> {
    let doubled = days * Decimal::TWO;
    if doubled.fract().is_zero() {
        doubled.to_i64()
    } else {
        None
    }
}

/// Converts half-day units back into a day amount.
#[must_use]
pub fn from_half_days(units: i64) -> Decimal {
    (Decimal::from(units) / Decimal::TWO).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0), Some(0))]
    #[case(dec!(0.5), Some(1))]
    #[case(dec!(1), Some(2))]
    #[case(dec!(10.5), Some(21))]
    #[case(dec!(30.0), Some(60))]
    #[case(dec!(0.25), None)]
    #[case(dec!(1.3), None)]
    fn test_to_half_days(#[case] days: Decimal, #[case] expected: Option<i64>) {
        assert_eq!(to_half_days(days), expected);
    }

    #[test]
    fn test_from_half_days() {
        assert_eq!(from_half_days(0), Decimal::ZERO);
        assert_eq!(from_half_days(1), dec!(0.5));
        assert_eq!(from_half_days(60), dec!(30));
        assert_eq!(from_half_days(-3), dec!(-1.5));
    }

    #[test]
    fn test_half_day_constant() {
        assert_eq!(HALF_DAY, dec!(0.5));
        assert!(is_half_day_multiple(HALF_DAY));
        assert!(!is_half_day_multiple(dec!(0.75)));
    }
}
