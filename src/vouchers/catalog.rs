//! Voucher Catalog
//!
//! Filtering of the voucher catalog down to the offers a cart may use.

use std::fmt;

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};

use crate::vouchers::{VoucherOffer, VoucherStatus};

/// Why an offer can or cannot be selected for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// The offer can be selected.
    Eligible,

    /// The offer was deactivated.
    Inactive,

    /// No redemptions remain.
    Exhausted,

    /// The validity window has not opened yet.
    NotStarted,

    /// The validity window has closed.
    Expired,

    /// The cart total is below the offer's required value.
    BelowRequiredValue,
}

impl Eligibility {
    /// Whether the offer can be selected.
    pub fn is_eligible(self) -> bool {
        self == Eligibility::Eligible
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eligible => "eligible",
            Self::Inactive => "inactive",
            Self::Exhausted => "used up",
            Self::NotStarted => "not started",
            Self::Expired => "expired",
            Self::BelowRequiredValue => "order too small",
        })
    }
}

impl VoucherOffer<'_> {
    /// Check whether this offer may be used on a cart with the given total at `now`.
    pub fn eligibility(&self, cart_total: &Money<'_, Currency>, now: Timestamp) -> Eligibility {
        if self.status != VoucherStatus::Active {
            return Eligibility::Inactive;
        }

        if self.quantity == Some(0) {
            return Eligibility::Exhausted;
        }

        if self.valid_from.is_some_and(|from| now < from) {
            return Eligibility::NotStarted;
        }

        if self.valid_until.is_some_and(|until| now > until) {
            return Eligibility::Expired;
        }

        if cart_total.to_minor_units() < self.required_value.to_minor_units() {
            return Eligibility::BelowRequiredValue;
        }

        Eligibility::Eligible
    }
}

/// Offers from the catalog that a cart with `cart_total` may select at `now`, in catalog order.
pub fn eligible_offers<'o, 'a>(
    offers: &'o [VoucherOffer<'a>],
    cart_total: &Money<'_, Currency>,
    now: Timestamp,
) -> Vec<&'o VoucherOffer<'a>> {
    offers
        .iter()
        .filter(|offer| offer.eligibility(cart_total, now).is_eligible())
        .collect()
}

/// Look an offer up by its code, ignoring case and surrounding whitespace.
pub fn find_by_code<'o, 'a>(
    offers: &'o [VoucherOffer<'a>],
    code: &str,
) -> Option<&'o VoucherOffer<'a>> {
    let code = code.trim();

    offers
        .iter()
        .find(|offer| offer.code.eq_ignore_ascii_case(code))
}
