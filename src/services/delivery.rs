//! Delivery quote provider.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{
    delivery::{DeliveryQuote, Destination},
    ids::CartId,
};

/// Errors returned by the delivery quote provider.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeliveryQuoteError {
    /// The carrier does not recognise the district or ward.
    #[error("carrier does not serve this address")]
    UnknownAddress,

    /// The carrier could not be reached.
    #[error("delivery quotes unavailable: {0}")]
    Unavailable(String),
}

/// Delivery fee lookup.
#[automock]
#[async_trait]
pub trait DeliveryQuoteProvider: Send + Sync {
    /// Quote the delivery fee and lead time for shipping a cart to a destination.
    async fn quote(
        &self,
        cart: CartId,
        destination: Destination,
    ) -> Result<DeliveryQuote<'static>, DeliveryQuoteError>;
}
