//! Totals
//!
//! Grand total arithmetic and the price breakdown shown next to the checkout button.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    carts::CartSnapshot, delivery::DeliveryQuote, pricing::TotalPriceError,
    vouchers::VoucherApplication,
};

/// Errors computing checkout totals.
#[derive(Debug, Error, PartialEq)]
pub enum TotalsError {
    /// The discount exceeded the merchandise and shipping combined. Discounts are clamped when
    /// computed, so this means an unclamped discount reached the total.
    #[error("grand total would be negative")]
    NegativeTotal,

    /// The voucher discount was computed against a different cart total.
    #[error("voucher discount was computed for a different cart total")]
    StaleDiscount,

    /// Errors bubbled up from merchandise total calculation.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// `cart_total + (shipping_enabled ? delivery_fee : 0) - discount`.
///
/// # Errors
///
/// - [`TotalsError::NegativeTotal`]: the discount exceeds everything it is taken from.
/// - [`TotalsError::Money`]: the amounts are in different currencies.
pub fn grand_total<'a>(
    cart_total: Money<'a, Currency>,
    shipping_enabled: bool,
    delivery_fee: Money<'a, Currency>,
    discount: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, TotalsError> {
    let with_shipping = if shipping_enabled {
        cart_total.add(delivery_fee)?
    } else {
        cart_total
    };

    let total = with_shipping.sub(discount)?;

    if total.is_negative() {
        return Err(TotalsError::NegativeTotal);
    }

    Ok(total)
}

/// Line-by-line summary of what the customer pays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBreakdown<'a> {
    /// Sum of all cart lines
    pub merchandise: Money<'a, Currency>,

    /// Delivery fee, `None` for in-store sales
    pub shipping: Option<Money<'a, Currency>>,

    /// Voucher discount
    pub discount: Money<'a, Currency>,

    /// Amount due
    pub total: Money<'a, Currency>,
}

impl<'a> PriceBreakdown<'a> {
    /// Compute the breakdown for a cart.
    ///
    /// # Errors
    ///
    /// - [`TotalsError::StaleDiscount`]: the voucher was applied to a different cart total.
    /// - [`TotalsError::TotalPrice`]: the merchandise total could not be computed.
    /// - [`TotalsError::NegativeTotal`] / [`TotalsError::Money`]: see [`grand_total`].
    pub fn compute(
        cart: &CartSnapshot<'a>,
        shipping_enabled: bool,
        quote: &DeliveryQuote<'a>,
        voucher: &VoucherApplication<'a>,
    ) -> Result<Self, TotalsError> {
        let merchandise = cart.subtotal()?;

        if !voucher.is_current_for(&merchandise) {
            return Err(TotalsError::StaleDiscount);
        }

        let discount = voucher.discount();
        let total = grand_total(merchandise, shipping_enabled, quote.fee(), discount)?;

        Ok(Self {
            merchandise,
            shipping: shipping_enabled.then(|| quote.fee()),
            discount,
            total,
        })
    }
}
