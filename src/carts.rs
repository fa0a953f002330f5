//! Carts

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    ids::{CartId, ProductId},
    pricing::{TotalPriceError, total_price},
};

/// Errors related to cart construction.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A line was priced below zero.
    #[error("Product {0} has a negative unit price")]
    NegativePrice(ProductId),

    /// A line was added with no quantity.
    #[error("Product {0} has a zero quantity")]
    ZeroQuantity(ProductId),

    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),
}

/// A product line in a cart.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine<'a> {
    product: ProductId,
    price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Creates a new line for the given product, unit price and quantity.
    ///
    /// # Errors
    ///
    /// - [`CartError::NegativePrice`]: The unit price is below zero.
    /// - [`CartError::ZeroQuantity`]: The quantity is zero.
    pub fn new(
        product: ProductId,
        price: Money<'a, Currency>,
        quantity: u32,
    ) -> Result<Self, CartError> {
        if price.is_negative() {
            return Err(CartError::NegativePrice(product));
        }

        if quantity == 0 {
            return Err(CartError::ZeroQuantity(product));
        }

        Ok(Self {
            product,
            price,
            quantity,
        })
    }

    /// Returns the product on this line
    pub fn product(&self) -> ProductId {
        self.product
    }

    /// Returns the unit price
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Returns the quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Read-only snapshot of a cart as returned by the order management backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot<'a> {
    id: CartId,
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> CartSnapshot<'a> {
    /// Create an empty cart.
    #[must_use]
    pub fn empty(id: CartId, currency: &'static Currency) -> Self {
        Self {
            id,
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if any line is priced in another currency.
    pub fn with_lines(
        id: CartId,
        lines: impl Into<Vec<CartLine<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.price().currency();

            if line_currency == currency {
                Ok(())
            } else {
                Err(CartError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        Ok(Self {
            id,
            lines,
            currency,
        })
    }

    /// Merchandise total: the sum of every line subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalPriceError`] if a line subtotal overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        total_price(&self.lines, self.currency)
    }

    /// Cart identifier
    pub fn id(&self) -> CartId {
        self.id
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.iter()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{USD, VND};
    use testresult::TestResult;

    use super::*;

    fn test_lines<'a>() -> Result<[CartLine<'a>; 3], CartError> {
        Ok([
            CartLine::new(ProductId(1), Money::from_minor(100_000, VND), 1)?,
            CartLine::new(ProductId(2), Money::from_minor(200_000, VND), 2)?,
            CartLine::new(ProductId(3), Money::from_minor(300_000, VND), 1)?,
        ])
    }

    #[test]
    fn line_rejects_negative_price() {
        let result = CartLine::new(ProductId(9), Money::from_minor(-1, VND), 1);

        assert_eq!(result, Err(CartError::NegativePrice(ProductId(9))));
    }

    #[test]
    fn line_rejects_zero_quantity() {
        let result = CartLine::new(ProductId(9), Money::from_minor(100, VND), 0);

        assert_eq!(result, Err(CartError::ZeroQuantity(ProductId(9))));
    }

    #[test]
    fn with_lines_currency_mismatch_errors() -> TestResult {
        let lines = [
            CartLine::new(ProductId(1), Money::from_minor(100, VND), 1)?,
            CartLine::new(ProductId(2), Money::from_minor(100, USD), 1)?,
        ];

        let result = CartSnapshot::with_lines(CartId(1), lines, VND);

        assert_eq!(
            result,
            Err(CartError::CurrencyMismatch(
                1,
                USD.iso_alpha_code,
                VND.iso_alpha_code
            ))
        );

        Ok(())
    }

    #[test]
    fn subtotal_with_lines() -> TestResult {
        let cart = CartSnapshot::with_lines(CartId(1), test_lines()?, VND)?;

        assert_eq!(cart.subtotal()?, Money::from_minor(800_000, VND));
        assert_eq!(cart.unit_count(), 4);
        assert_eq!(cart.len(), 3);

        Ok(())
    }

    #[test]
    fn subtotal_with_no_lines() -> TestResult {
        let cart = CartSnapshot::empty(CartId(1), VND);

        assert!(cart.is_empty());
        assert_eq!(cart.subtotal()?, Money::from_minor(0, VND));

        Ok(())
    }

    #[test]
    fn iter_returns_lines_in_order() -> TestResult {
        let cart = CartSnapshot::with_lines(CartId(1), test_lines()?, VND)?;

        let products: Vec<ProductId> = cart.iter().map(CartLine::product).collect();

        assert_eq!(products, vec![ProductId(1), ProductId(2), ProductId(3)]);

        Ok(())
    }
}
