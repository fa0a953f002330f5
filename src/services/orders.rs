//! Order submission.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{
    checkout::CheckoutPayload,
    ids::{CartId, OrderId},
};

/// Errors returned when submitting an order.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrderSubmitError {
    /// The order service rejected the payload; the message is meant for the user.
    #[error("order rejected: {0}")]
    Validation(String),

    /// Anything outside the user's control.
    #[error("order submission failed: {0}")]
    Transient(String),
}

/// Order submission endpoint.
#[automock]
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Turn a cart into an order.
    async fn submit(
        &self,
        cart: CartId,
        payload: CheckoutPayload,
    ) -> Result<OrderId, OrderSubmitError>;
}
