//! Pricing

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::carts::CartLine;

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// A line subtotal did not fit in minor units.
    #[error("line subtotal overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates the subtotal of a single line (unit price × quantity).
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: The subtotal does not fit in minor units.
pub fn line_subtotal<'a>(line: &CartLine<'a>) -> Result<Money<'a, Currency>, TotalPriceError> {
    let minor = line
        .price()
        .to_minor_units()
        .checked_mul(i64::from(line.quantity()))
        .ok_or(TotalPriceError::Overflow)?;

    Ok(Money::from_minor(minor, line.price().currency()))
}

/// Calculates the total price of a list of cart lines.
///
/// An empty list totals to zero in the given currency.
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: A line subtotal does not fit in minor units.
/// - [`TotalPriceError::Money`]: Wrapped money arithmetic or currency mismatch error.
pub fn total_price<'a>(
    lines: &[CartLine<'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            Ok(acc.add(line_subtotal(line)?)?)
        })
}
