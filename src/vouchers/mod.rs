//! Vouchers
//!
//! Voucher offers, and the computation of the discount a chosen offer grants against a cart
//! total. Eligibility (status, stock, validity window, minimum order value) is a separate
//! concern handled by [`catalog`]; applying a voucher never re-checks it.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    discounts::{DiscountError, min_money, percent_of},
    ids::VoucherId,
};

pub mod catalog;

/// Errors raised while applying a voucher.
#[derive(Debug, Error, PartialEq)]
pub enum VoucherError {
    /// The offer's parameters cannot produce a meaningful discount.
    #[error("voucher {code} has invalid parameters: {reason}")]
    InvalidVoucherParameters {
        /// Voucher code
        code: String,

        /// What was wrong with it
        reason: &'static str,
    },

    /// The voucher amount is in a different currency to the cart (voucher, cart).
    #[error("voucher is in {0}, but cart is in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Percentage arithmetic failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// How a voucher discounts the cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoucherKind<'a> {
    /// Percentage points (0, 100] of the cart total, optionally capped.
    Percent {
        /// Percentage points, e.g. `10` for 10%.
        points: Decimal,

        /// Largest discount this voucher may grant. `None` or zero means uncapped.
        max_value: Option<Money<'a, Currency>>,
    },

    /// A fixed amount off the cart total.
    FixedAmount(Money<'a, Currency>),
}

/// Voucher lifecycle status as managed in the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherStatus {
    /// Can be redeemed
    Active,

    /// Deactivated by an administrator
    Inactive,
}

/// A discount offer identified by its code.
#[derive(Debug, Clone, PartialEq)]
pub struct VoucherOffer<'a> {
    /// Voucher identifier
    pub id: VoucherId,

    /// Redemption code
    pub code: String,

    /// Discount semantics
    pub kind: VoucherKind<'a>,

    /// Minimum merchandise total needed to qualify
    pub required_value: Money<'a, Currency>,

    /// Lifecycle status
    pub status: VoucherStatus,

    /// Remaining redemptions, `None` when unlimited
    pub quantity: Option<u32>,

    /// Start of the validity window
    pub valid_from: Option<Timestamp>,

    /// End of the validity window
    pub valid_until: Option<Timestamp>,
}

impl<'a> VoucherOffer<'a> {
    /// Create an active percentage voucher with no stock limit or validity window.
    pub fn percent(
        id: VoucherId,
        code: impl Into<String>,
        points: Decimal,
        max_value: Option<Money<'a, Currency>>,
        required_value: Money<'a, Currency>,
    ) -> Self {
        Self::with_kind(
            id,
            code,
            VoucherKind::Percent { points, max_value },
            required_value,
        )
    }

    /// Create an active fixed-amount voucher with no stock limit or validity window.
    pub fn fixed_amount(
        id: VoucherId,
        code: impl Into<String>,
        amount: Money<'a, Currency>,
        required_value: Money<'a, Currency>,
    ) -> Self {
        Self::with_kind(id, code, VoucherKind::FixedAmount(amount), required_value)
    }

    fn with_kind(
        id: VoucherId,
        code: impl Into<String>,
        kind: VoucherKind<'a>,
        required_value: Money<'a, Currency>,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            kind,
            required_value,
            status: VoucherStatus::Active,
            quantity: None,
            valid_from: None,
            valid_until: None,
        }
    }

    /// Set the lifecycle status.
    #[must_use]
    pub fn with_status(mut self, status: VoucherStatus) -> Self {
        self.status = status;
        self
    }

    /// Limit the number of remaining redemptions.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Restrict the voucher to a validity window.
    #[must_use]
    pub fn with_validity(mut self, from: Option<Timestamp>, until: Option<Timestamp>) -> Self {
        self.valid_from = from;
        self.valid_until = until;
        self
    }

    /// Human readable value, `"10 %"` for percentages or the formatted amount otherwise.
    pub fn describe_value(&self) -> String {
        match self.kind {
            VoucherKind::Percent { points, .. } => format!("{} %", points.normalize()),
            VoucherKind::FixedAmount(amount) => amount.to_string(),
        }
    }

    /// Effective cap, ignoring zero caps.
    pub fn cap(&self) -> Option<Money<'a, Currency>> {
        match self.kind {
            VoucherKind::Percent {
                max_value: Some(max),
                ..
            } if max.is_positive() => Some(max),
            VoucherKind::Percent { .. } | VoucherKind::FixedAmount(_) => None,
        }
    }
}

/// Reference to a voucher embedded in the checkout payload. Only the id is sent; the order
/// service re-validates the voucher itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherRef {
    /// Voucher identifier
    pub id: VoucherId,
}

/// The voucher currently chosen for a cart, with the discount it grants.
#[derive(Clone, PartialEq)]
pub struct VoucherApplication<'a> {
    offer: Option<VoucherOffer<'a>>,
    discount: Money<'a, Currency>,
    basis: Option<Money<'a, Currency>>,
}

impl<'a> VoucherApplication<'a> {
    /// No voucher selected.
    #[must_use]
    pub fn none(currency: &'a Currency) -> Self {
        Self {
            offer: None,
            discount: Money::from_minor(0, currency),
            basis: None,
        }
    }

    /// The chosen offer, if any.
    pub fn offer(&self) -> Option<&VoucherOffer<'a>> {
        self.offer.as_ref()
    }

    /// Discount granted against the cart total it was computed for.
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Whether the discount was computed against `cart_total`. Always true when no voucher
    /// is selected.
    pub fn is_current_for(&self, cart_total: &Money<'a, Currency>) -> bool {
        self.basis.as_ref().is_none_or(|basis| basis == cart_total)
    }

    /// Whether no voucher is selected.
    pub fn is_none(&self) -> bool {
        self.offer.is_none()
    }

    /// Payload reference for the chosen offer.
    pub fn voucher_ref(&self) -> Option<VoucherRef> {
        self.offer.as_ref().map(|offer| VoucherRef { id: offer.id })
    }
}

impl fmt::Debug for VoucherApplication<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoucherApplication")
            .field("code", &self.offer.as_ref().map(|offer| offer.code.as_str()))
            .field("discount", &self.discount)
            .field("basis", &self.basis)
            .finish()
    }
}

/// Compute the discount an offer grants against a cart total.
///
/// - Percent: `total × points / 100`, capped by the offer's max value when it is positive,
///   then clamped to the total.
/// - Fixed amount: the amount, clamped to the total.
///
/// # Errors
///
/// - [`VoucherError::InvalidVoucherParameters`]: a percent voucher outside (0, 100], or a
///   negative fixed amount.
/// - [`VoucherError::CurrencyMismatch`]: the voucher amount is not in the cart currency.
/// - [`VoucherError::Discount`]: the percentage could not be applied.
pub fn apply_voucher<'a>(
    cart_total: Money<'a, Currency>,
    offer: &VoucherOffer<'a>,
) -> Result<VoucherApplication<'a>, VoucherError> {
    let discount = match offer.kind {
        VoucherKind::Percent { points, .. } => {
            if points <= Decimal::ZERO || points > Decimal::ONE_HUNDRED {
                return Err(VoucherError::InvalidVoucherParameters {
                    code: offer.code.clone(),
                    reason: "percentage must be greater than 0 and at most 100",
                });
            }

            let raw = percent_of(
                &Percentage::from(points / Decimal::ONE_HUNDRED),
                &cart_total,
            )?;

            let capped = match offer.cap() {
                Some(cap) => {
                    ensure_currency(&cap, &cart_total)?;
                    min_money(raw, cap)
                }
                None => raw,
            };

            min_money(capped, cart_total)
        }
        VoucherKind::FixedAmount(amount) => {
            if amount.is_negative() {
                return Err(VoucherError::InvalidVoucherParameters {
                    code: offer.code.clone(),
                    reason: "fixed amount must not be negative",
                });
            }

            ensure_currency(&amount, &cart_total)?;

            min_money(amount, cart_total)
        }
    };

    Ok(VoucherApplication {
        offer: Some(offer.clone()),
        discount,
        basis: Some(cart_total),
    })
}

fn ensure_currency(
    amount: &Money<'_, Currency>,
    cart_total: &Money<'_, Currency>,
) -> Result<(), VoucherError> {
    if amount.currency() == cart_total.currency() {
        Ok(())
    } else {
        Err(VoucherError::CurrencyMismatch(
            amount.currency().iso_alpha_code,
            cart_total.currency().iso_alpha_code,
        ))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::{USD, VND};
    use testresult::TestResult;

    use super::*;

    fn vnd(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, VND)
    }

    fn percent(points: i64, max_value: i64) -> VoucherOffer<'static> {
        VoucherOffer::percent(
            VoucherId(1),
            "SALE",
            Decimal::from(points),
            Some(vnd(max_value)),
            vnd(0),
        )
    }

    #[test]
    fn percent_voucher_is_capped_by_max_value() -> TestResult {
        let application = apply_voucher(vnd(1_000_000), &percent(10, 50_000))?;

        assert_eq!(application.discount(), vnd(50_000));
        assert_eq!(application.voucher_ref(), Some(VoucherRef { id: VoucherId(1) }));

        Ok(())
    }

    #[test]
    fn percent_voucher_below_cap_uses_raw_discount() -> TestResult {
        let application = apply_voucher(vnd(200_000), &percent(10, 50_000))?;

        assert_eq!(application.discount(), vnd(20_000));

        Ok(())
    }

    #[test]
    fn percent_voucher_with_zero_cap_is_uncapped() -> TestResult {
        let application = apply_voucher(vnd(1_000_000), &percent(25, 0))?;

        assert_eq!(application.discount(), vnd(250_000));

        Ok(())
    }

    #[test]
    fn percent_voucher_without_cap_is_uncapped() -> TestResult {
        let offer = VoucherOffer::percent(VoucherId(2), "HALF", Decimal::from(50), None, vnd(0));

        assert_eq!(apply_voucher(vnd(90_000), &offer)?.discount(), vnd(45_000));

        Ok(())
    }

    #[test]
    fn hundred_percent_voucher_discounts_whole_total() -> TestResult {
        let application = apply_voucher(vnd(123_456), &percent(100, 0))?;

        assert_eq!(application.discount(), vnd(123_456));

        Ok(())
    }

    #[test]
    fn fractional_percent_rounds_to_whole_minor_units() -> TestResult {
        let offer = VoucherOffer::percent(
            VoucherId(3),
            "ODD",
            Decimal::new(125, 1), // 12.5
            None,
            vnd(0),
        );

        assert_eq!(apply_voucher(vnd(1_001), &offer)?.discount(), vnd(125));

        Ok(())
    }

    #[test]
    fn percent_out_of_range_is_rejected() {
        for points in [0, -5, 101] {
            let result = apply_voucher(vnd(100_000), &percent(points, 0));

            assert!(
                matches!(result, Err(VoucherError::InvalidVoucherParameters { .. })),
                "expected {points} points to be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn fixed_amount_is_clamped_to_total() -> TestResult {
        let offer = VoucherOffer::fixed_amount(VoucherId(4), "50K", vnd(50_000), vnd(0));

        assert_eq!(apply_voucher(vnd(30_000), &offer)?.discount(), vnd(30_000));
        assert_eq!(apply_voucher(vnd(80_000), &offer)?.discount(), vnd(50_000));

        Ok(())
    }

    #[test]
    fn negative_fixed_amount_is_rejected() {
        let offer = VoucherOffer::fixed_amount(VoucherId(4), "BAD", vnd(-1), vnd(0));

        assert!(matches!(
            apply_voucher(vnd(30_000), &offer),
            Err(VoucherError::InvalidVoucherParameters { .. })
        ));
    }

    #[test]
    fn fixed_amount_in_other_currency_is_rejected() {
        let offer = VoucherOffer::fixed_amount(
            VoucherId(5),
            "USD",
            Money::from_minor(500, USD),
            vnd(0),
        );

        assert_eq!(
            apply_voucher(vnd(30_000), &offer),
            Err(VoucherError::CurrencyMismatch(
                USD.iso_alpha_code,
                VND.iso_alpha_code
            ))
        );
    }

    #[test]
    fn discount_on_empty_cart_is_zero() -> TestResult {
        assert_eq!(apply_voucher(vnd(0), &percent(10, 50_000))?.discount(), vnd(0));

        let offer = VoucherOffer::fixed_amount(VoucherId(4), "50K", vnd(50_000), vnd(0));
        assert_eq!(apply_voucher(vnd(0), &offer)?.discount(), vnd(0));

        Ok(())
    }

    #[test]
    fn none_has_zero_discount_and_no_reference() {
        let application = VoucherApplication::none(VND);

        assert!(application.is_none());
        assert_eq!(application.discount(), vnd(0));
        assert_eq!(application.voucher_ref(), None);
    }

    #[test]
    fn application_tracks_the_total_it_was_computed_for() -> TestResult {
        let application = apply_voucher(vnd(200_000), &percent(10, 0))?;

        assert!(application.is_current_for(&vnd(200_000)));
        assert!(!application.is_current_for(&vnd(250_000)));
        assert!(VoucherApplication::none(VND).is_current_for(&vnd(250_000)));

        Ok(())
    }

    #[test]
    fn describe_value_distinguishes_kinds() {
        assert_eq!(percent(10, 0).describe_value(), "10 %");

        let offer = VoucherOffer::fixed_amount(VoucherId(4), "50K", vnd(50_000), vnd(0));
        assert_eq!(offer.describe_value(), vnd(50_000).to_string());
    }

    #[test]
    fn percent_discount_stays_within_bounds() -> TestResult {
        for total in [0, 1, 99, 10_000, 1_234_567, 999_999_999] {
            for points in [1, 7, 33, 50, 99, 100] {
                for cap in [0, 1, 5_000, 1_000_000_000] {
                    let discount = apply_voucher(vnd(total), &percent(points, cap))?.discount();

                    assert!(
                        (0..=total).contains(&discount.to_minor_units()),
                        "discount {discount} out of range for total {total}"
                    );

                    if cap > 0 {
                        assert!(
                            discount.to_minor_units() <= cap,
                            "discount {discount} exceeds cap {cap}"
                        );
                    }
                }
            }
        }

        Ok(())
    }
}
