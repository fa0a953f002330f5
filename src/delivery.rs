//! Delivery
//!
//! Delivery fee quotes returned by the shipping carrier integration.

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors building a delivery quote.
#[derive(Debug, Error, PartialEq)]
pub enum DeliveryError {
    /// The carrier quoted a fee below zero.
    #[error("delivery fee must not be negative")]
    NegativeFee,

    /// The lead time was not a representable timestamp.
    #[error("invalid lead time: {0} seconds since the epoch")]
    InvalidLeadTime(i64),
}

/// District and ward a quote is requested for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    /// Carrier district id
    pub district_id: u32,

    /// Carrier ward code
    pub ward_code: String,
}

/// A delivery fee quote with its estimated completion time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryQuote<'a> {
    fee: Money<'a, Currency>,
    lead_time: Option<Timestamp>,
}

impl<'a> DeliveryQuote<'a> {
    /// Create a quote.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::NegativeFee`] if the fee is below zero.
    pub fn new(
        fee: Money<'a, Currency>,
        lead_time: Option<Timestamp>,
    ) -> Result<Self, DeliveryError> {
        if fee.is_negative() {
            return Err(DeliveryError::NegativeFee);
        }

        Ok(Self { fee, lead_time })
    }

    /// Create a quote from a lead time expressed in seconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::NegativeFee`] for a negative fee and
    /// [`DeliveryError::InvalidLeadTime`] when the seconds are out of range.
    pub fn from_epoch_seconds(
        fee: Money<'a, Currency>,
        lead_time: Option<i64>,
    ) -> Result<Self, DeliveryError> {
        let lead_time = match lead_time {
            Some(seconds) => Some(
                Timestamp::from_second(seconds)
                    .ok()
                    .ok_or(DeliveryError::InvalidLeadTime(seconds))?,
            ),
            None => None,
        };

        Self::new(fee, lead_time)
    }

    /// The quote before any lookup has resolved: no fee, no lead time.
    #[must_use]
    pub fn pending(currency: &'a Currency) -> Self {
        Self {
            fee: Money::from_minor(0, currency),
            lead_time: None,
        }
    }

    /// Delivery fee
    pub fn fee(&self) -> Money<'a, Currency> {
        self.fee
    }

    /// Estimated delivery completion time, if resolved
    pub fn lead_time(&self) -> Option<Timestamp> {
        self.lead_time
    }
}
