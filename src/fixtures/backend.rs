//! In-memory backend serving a loaded fixture.

use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use jiff::Timestamp;
use tracing::debug;

use crate::{
    carts::{CartLine, CartSnapshot},
    checkout::CheckoutPayload,
    delivery::{DeliveryQuote, Destination},
    fixtures::Fixture,
    ids::{CartId, OrderId, ProductId},
    services::{
        CartStore, CartStoreError, DeliveryQuoteError, DeliveryQuoteProvider, OrderSubmitError,
        OrderSubmitter, VoucherCatalog, VoucherCatalogError,
    },
    vouchers::VoucherOffer,
};

/// Backend that answers every collaborator call from a [`Fixture`].
///
/// The carrier quote is the same for every destination. Submitted orders are numbered from 1.
/// Vouchers are re-checked on submission the way the order service does it.
#[derive(Debug)]
pub struct FixtureBackend {
    fixture: Fixture,
    cart: Mutex<CartSnapshot<'static>>,
    next_order: AtomicU64,
    now: Timestamp,
}

impl FixtureBackend {
    /// Serve `fixture`, judging voucher validity at `now`.
    pub fn new(fixture: Fixture, now: Timestamp) -> Self {
        let cart = fixture.cart().clone();

        Self {
            fixture,
            cart: Mutex::new(cart),
            next_order: AtomicU64::new(1),
            now,
        }
    }

    fn cart(&self) -> CartSnapshot<'static> {
        self.cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CartStore for FixtureBackend {
    async fn fetch_cart(&self, id: CartId) -> Result<CartSnapshot<'static>, CartStoreError> {
        let cart = self.cart();

        if cart.id() != id {
            return Err(CartStoreError::NotFound);
        }

        Ok(cart)
    }

    async fn add_item(
        &self,
        cart: CartId,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), CartStoreError> {
        let price = self
            .fixture
            .price(product)
            .map_err(|err| CartStoreError::Unavailable(err.to_string()))?;

        let mut current = self.cart.lock().unwrap_or_else(PoisonError::into_inner);

        if current.id() != cart {
            return Err(CartStoreError::NotFound);
        }

        let mut lines: Vec<CartLine<'static>> = Vec::with_capacity(current.len() + 1);
        let mut merged = false;

        for line in current.iter() {
            if line.product() == product {
                let total = line.quantity().saturating_add(quantity);

                lines.push(
                    CartLine::new(product, *line.price(), total)
                        .map_err(|err| CartStoreError::Unavailable(err.to_string()))?,
                );
                merged = true;
            } else {
                lines.push(line.clone());
            }
        }

        if !merged {
            lines.push(
                CartLine::new(product, price, quantity)
                    .map_err(|err| CartStoreError::Unavailable(err.to_string()))?,
            );
        }

        *current = CartSnapshot::with_lines(cart, lines, current.currency())
            .map_err(|err| CartStoreError::Unavailable(err.to_string()))?;

        debug!(cart_id = %cart, product_id = %product, quantity, "item added");

        Ok(())
    }
}

#[async_trait]
impl DeliveryQuoteProvider for FixtureBackend {
    async fn quote(
        &self,
        _cart: CartId,
        _destination: Destination,
    ) -> Result<DeliveryQuote<'static>, DeliveryQuoteError> {
        self.fixture
            .delivery()
            .ok_or(DeliveryQuoteError::UnknownAddress)
    }
}

#[async_trait]
impl VoucherCatalog for FixtureBackend {
    async fn list_vouchers(&self) -> Result<Vec<VoucherOffer<'static>>, VoucherCatalogError> {
        Ok(self.fixture.vouchers().to_vec())
    }
}

#[async_trait]
impl OrderSubmitter for FixtureBackend {
    async fn submit(
        &self,
        cart: CartId,
        payload: CheckoutPayload,
    ) -> Result<OrderId, OrderSubmitError> {
        let snapshot = self.cart();

        if snapshot.id() != cart {
            return Err(OrderSubmitError::Validation("Cart not found".to_string()));
        }

        if let Some(voucher) = payload.voucher {
            let offer = self
                .fixture
                .vouchers()
                .iter()
                .find(|offer| offer.id == voucher.id)
                .ok_or_else(|| OrderSubmitError::Validation("Voucher not found".to_string()))?;

            let total = snapshot
                .subtotal()
                .map_err(|err| OrderSubmitError::Transient(err.to_string()))?;

            let eligibility = offer.eligibility(&total, self.now);

            if !eligibility.is_eligible() {
                return Err(OrderSubmitError::Validation(format!(
                    "Voucher {} cannot be used: {eligibility}",
                    offer.code
                )));
            }
        }

        Ok(OrderId(self.next_order.fetch_add(1, Ordering::Relaxed)))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::VND};
    use testresult::TestResult;

    use crate::{
        checkout::{CustomerInfoPayload, SaleMethod},
        ids::VoucherId,
        vouchers::VoucherRef,
    };

    use super::*;

    const SCENARIO: &str = r"
products:
  101: { name: Ao thun, price: 250000 VND }
  102: { name: Quan jean, price: 500000 VND }
cart:
  id: 1
  lines:
    - { product: 101, quantity: 1 }
delivery:
  fee: 30000 VND
vouchers:
  - id: 2
    code: BIG
    type: DISCOUNT
    value: 50000 VND
    requiredValue: 1000000 VND
";

    fn backend() -> Result<FixtureBackend, crate::fixtures::FixtureError> {
        Ok(FixtureBackend::new(
            Fixture::parse(SCENARIO)?,
            Timestamp::UNIX_EPOCH,
        ))
    }

    fn payload(voucher: Option<VoucherRef>) -> CheckoutPayload {
        CheckoutPayload {
            customer_info: CustomerInfoPayload::default(),
            email: None,
            sale_method: SaleMethod::Retail,
            voucher,
        }
    }

    #[tokio::test]
    async fn add_item_merges_existing_lines() -> TestResult {
        let backend = backend()?;

        backend.add_item(CartId(1), ProductId(101), 2).await?;
        backend.add_item(CartId(1), ProductId(102), 1).await?;

        let cart = backend.fetch_cart(CartId(1)).await?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.unit_count(), 4);
        assert_eq!(cart.subtotal()?, Money::from_minor(1_250_000, VND));

        Ok(())
    }

    #[tokio::test]
    async fn fetch_unknown_cart_is_not_found() -> TestResult {
        let result = backend()?.fetch_cart(CartId(9)).await;

        assert_eq!(result, Err(CartStoreError::NotFound));

        Ok(())
    }

    #[tokio::test]
    async fn submit_rechecks_voucher_eligibility() -> TestResult {
        let backend = backend()?;
        let voucher = Some(VoucherRef {
            id: VoucherId(2),
        });

        let rejected = backend.submit(CartId(1), payload(voucher)).await;

        assert!(matches!(rejected, Err(OrderSubmitError::Validation(message))
            if message.contains("BIG")));

        backend.add_item(CartId(1), ProductId(102), 2).await?;

        assert_eq!(backend.submit(CartId(1), payload(voucher)).await?, OrderId(1));
        assert_eq!(backend.submit(CartId(1), payload(None)).await?, OrderId(2));

        Ok(())
    }
}
