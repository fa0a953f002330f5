//! Discount arithmetic
//!
//! Money-level helpers shared by voucher types: percentage-of-amount, caps and clamps.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// Rounds half away from zero to the nearest minor unit.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the result overflows or cannot be represented.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage does not expose its inner Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Calculate a percentage of a money amount.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the result cannot be represented.
pub fn percent_of<'a>(
    percent: &Percentage,
    amount: &Money<'a, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let minor = percent_of_minor(percent, amount.to_minor_units())?;

    Ok(Money::from_minor(minor, amount.currency()))
}

/// Returns the smaller of two amounts in the same currency.
pub fn min_money<'a>(a: Money<'a, Currency>, b: Money<'a, Currency>) -> Money<'a, Currency> {
    if b.to_minor_units() < a.to_minor_units() {
        b
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use decimal_percentage::Percentage;
    use rusty_money::iso::VND;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let percent = Percentage::from(2.0);
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));
    }

    #[test]
    fn percent_of_minor_checked_mul_overflow_returns_error() -> TestResult {
        // 1e20 fits in a Decimal, the product with i64::MAX does not.
        let percent = Percentage::try_from("100000000000000000000")?;
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));

        Ok(())
    }

    #[test]
    fn percent_of_minor_calculates_correctly() -> TestResult {
        let percent = Percentage::from(0.25);

        assert_eq!(percent_of_minor(&percent, 200)?, 50);

        Ok(())
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        let percent = Percentage::from(0.5);

        assert_eq!(percent_of_minor(&percent, 3)?, 2);

        Ok(())
    }

    #[test]
    fn percent_of_money_keeps_currency() -> TestResult {
        let percent = Percentage::from(0.1);
        let amount = Money::from_minor(1_000_000, VND);

        assert_eq!(percent_of(&percent, &amount)?, Money::from_minor(100_000, VND));

        Ok(())
    }

    #[test]
    fn min_money_picks_smaller_amount() {
        let small = Money::from_minor(10, VND);
        let large = Money::from_minor(20, VND);

        assert_eq!(min_money(small, large), small);
        assert_eq!(min_money(large, small), small);
    }
}
