//! Cart store.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{
    carts::CartSnapshot,
    ids::{CartId, ProductId},
};

/// Errors returned by the cart store.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CartStoreError {
    /// No cart with this id.
    #[error("cart not found")]
    NotFound,

    /// The backend could not be reached.
    #[error("cart store unavailable: {0}")]
    Unavailable(String),
}

/// Cart retrieval and mutation.
#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Retrieve the current contents of a cart.
    async fn fetch_cart(&self, id: CartId) -> Result<CartSnapshot<'static>, CartStoreError>;

    /// Add a quantity of a product to a cart.
    async fn add_item(
        &self,
        cart: CartId,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), CartStoreError>;
}
