//! Checkout Session
//!
//! State container for the cart detail screen. It owns every input of the pricing engine,
//! recomputes from scratch whenever one changes, and tags each asynchronous lookup with a
//! generation so that a lookup overtaken by a newer one cannot overwrite fresher state.
//!
//! Invariants:
//! - replacing the cart drops the selected voucher and the delivery quote, so neither a
//!   discount nor a fee is carried over to different contents;
//! - a delivery quote is only accepted for the latest destination and cart contents;
//! - nothing is sent to the order service until the payload validates locally.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    carts::CartSnapshot,
    checkout::{CheckoutError, CheckoutPayload, build_checkout_payload},
    delivery::{DeliveryQuote, Destination},
    ids::{CartId, OrderId, ProductId},
    pricing::TotalPriceError,
    recipients::{AddressInput, RecipientSelection},
    services::{
        CartStore, CartStoreError, DeliveryQuoteError, DeliveryQuoteProvider, Notification,
        NotificationSink, OrderSubmitError, OrderSubmitter,
    },
    totals::{PriceBreakdown, TotalsError},
    vouchers::{VoucherApplication, VoucherError, VoucherOffer, apply_voucher},
};

/// Shown when a failure is outside the cashier's control.
pub const RETRY_LATER_MESSAGE: &str = "Something went wrong, please try again later.";

/// Errors raised by the checkout session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The payload failed local validation.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The voucher could not be applied.
    #[error(transparent)]
    Voucher(#[from] VoucherError),

    /// Totals could not be computed.
    #[error(transparent)]
    Totals(#[from] TotalsError),

    /// A snapshot for another cart was offered to this session.
    #[error("session is for cart {expected}, got a snapshot of cart {found}")]
    CartMismatch {
        /// Cart this session was opened for
        expected: CartId,

        /// Cart the snapshot belongs to
        found: CartId,
    },

    /// The cart store failed.
    #[error(transparent)]
    CartStore(#[from] CartStoreError),

    /// The delivery quote lookup failed.
    #[error(transparent)]
    DeliveryQuote(#[from] DeliveryQuoteError),

    /// The order service refused or failed the submission.
    #[error(transparent)]
    Submit(#[from] OrderSubmitError),
}

impl From<TotalPriceError> for SessionError {
    fn from(error: TotalPriceError) -> Self {
        Self::Totals(TotalsError::TotalPrice(error))
    }
}

impl SessionError {
    /// Whether the cashier can fix this by changing their input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Checkout(_)
                | Self::Voucher(VoucherError::InvalidVoucherParameters { .. })
                | Self::Submit(OrderSubmitError::Validation(_))
        )
    }

    /// Message suitable for the cashier.
    pub fn user_message(&self) -> String {
        match self {
            Self::Checkout(CheckoutError::EmptyCart) => "The cart has no items.".to_string(),
            Self::Checkout(CheckoutError::IncompleteAddress { .. }) => {
                "The delivery address is not finished.".to_string()
            }
            Self::Checkout(CheckoutError::MissingEmail) => "Please enter an email.".to_string(),
            Self::Voucher(VoucherError::InvalidVoucherParameters { .. }) => {
                "This voucher's value is invalid.".to_string()
            }
            Self::Submit(OrderSubmitError::Validation(message)) => message.clone(),
            _ => RETRY_LATER_MESSAGE.to_string(),
        }
    }
}

/// An in-flight delivery quote lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryLookup {
    generation: u64,

    /// Cart being quoted
    pub cart: CartId,

    /// Where it would ship
    pub destination: Destination,
}

/// An in-flight cart refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartRefresh {
    generation: u64,

    /// Cart being fetched
    pub cart: CartId,
}

/// Mutable checkout state for one cart.
#[derive(Debug)]
pub struct CheckoutSession {
    cart: CartSnapshot<'static>,
    recipient: RecipientSelection,
    shipping_enabled: bool,
    address: AddressInput,
    delivery: DeliveryQuote<'static>,
    voucher: VoucherApplication<'static>,
    delivery_generation: u64,
    cart_generation: u64,
}

impl CheckoutSession {
    /// Open a session for a freshly fetched cart: anonymous, in store, no voucher.
    #[must_use]
    pub fn new(cart: CartSnapshot<'static>) -> Self {
        let currency = cart.currency();

        Self {
            cart,
            recipient: RecipientSelection::Anonymous,
            shipping_enabled: false,
            address: AddressInput::default(),
            delivery: DeliveryQuote::pending(currency),
            voucher: VoucherApplication::none(currency),
            delivery_generation: 0,
            cart_generation: 0,
        }
    }

    /// Current cart contents
    pub fn cart(&self) -> &CartSnapshot<'static> {
        &self.cart
    }

    /// Current recipient
    pub fn recipient(&self) -> &RecipientSelection {
        &self.recipient
    }

    /// Whether the order ships
    pub fn shipping_enabled(&self) -> bool {
        self.shipping_enabled
    }

    /// Hand-entered address form
    pub fn address(&self) -> &AddressInput {
        &self.address
    }

    /// Latest accepted delivery quote
    pub fn delivery(&self) -> &DeliveryQuote<'static> {
        &self.delivery
    }

    /// Selected voucher
    pub fn voucher(&self) -> &VoucherApplication<'static> {
        &self.voucher
    }

    fn currency(&self) -> &'static Currency {
        self.cart.currency()
    }

    /// Merchandise total of the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart total overflows.
    pub fn merchandise_total(&self) -> Result<Money<'static, Currency>, SessionError> {
        Ok(self.cart.subtotal()?)
    }

    /// Replace the cart contents. Drops the selected voucher, the delivery quote and any in-flight
    /// lookups that were started against the old contents.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CartMismatch`] if the snapshot is for another cart.
    pub fn replace_cart(&mut self, cart: CartSnapshot<'static>) -> Result<(), SessionError> {
        if cart.id() != self.cart.id() {
            return Err(SessionError::CartMismatch {
                expected: self.cart.id(),
                found: cart.id(),
            });
        }

        self.cart = cart;
        self.voucher = VoucherApplication::none(self.currency());
        self.delivery = DeliveryQuote::pending(self.currency());
        self.cart_generation += 1;
        self.delivery_generation += 1;

        Ok(())
    }

    /// Select a voucher, replacing any previous one. The discount is computed against the
    /// current cart total. On error the previous selection is kept.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Voucher`] if the offer cannot be applied.
    pub fn select_voucher(&mut self, offer: &VoucherOffer<'static>) -> Result<(), SessionError> {
        let total = self.merchandise_total()?;

        self.voucher = apply_voucher(total, offer)?;

        debug!(
            code = %offer.code,
            discount = %self.voucher.discount(),
            "voucher selected"
        );

        Ok(())
    }

    /// Remove the selected voucher.
    pub fn clear_voucher(&mut self) {
        self.voucher = VoucherApplication::none(self.currency());
    }

    /// Toggle between delivery and in-store sale.
    pub fn set_shipping(&mut self, enabled: bool) {
        self.shipping_enabled = enabled;
    }

    /// Choose who the order is for.
    pub fn select_recipient(&mut self, recipient: RecipientSelection) {
        let before = self.destination();

        self.recipient = recipient;

        self.invalidate_delivery_if_moved(before);
    }

    /// Go back to an anonymous sale.
    pub fn clear_recipient(&mut self) {
        self.select_recipient(RecipientSelection::Anonymous);
    }

    /// Replace the hand-entered address form.
    pub fn update_address(&mut self, address: AddressInput) {
        let before = self.destination();

        self.address = address;

        self.invalidate_delivery_if_moved(before);
    }

    /// The destination a delivery would go to, if it is resolved.
    pub fn destination(&self) -> Option<Destination> {
        match &self.recipient {
            RecipientSelection::SavedAddress { customer_info, .. } => {
                Some(customer_info.destination())
            }
            RecipientSelection::Anonymous | RecipientSelection::Account(_) => {
                self.address.destination()
            }
        }
    }

    fn invalidate_delivery_if_moved(&mut self, before: Option<Destination>) {
        if self.destination() != before {
            self.delivery_generation += 1;
            self.delivery = DeliveryQuote::pending(self.currency());
        }
    }

    /// Start a delivery quote lookup for the current destination. Any lookup started earlier
    /// is superseded. Returns `None` while no destination is resolved.
    pub fn begin_delivery_lookup(&mut self) -> Option<DeliveryLookup> {
        let destination = self.destination()?;

        self.delivery_generation += 1;

        Some(DeliveryLookup {
            generation: self.delivery_generation,
            cart: self.cart.id(),
            destination,
        })
    }

    /// Accept a quote for a lookup. Returns `false`, leaving state untouched, if the lookup has
    /// been superseded.
    pub fn complete_delivery_lookup(
        &mut self,
        lookup: &DeliveryLookup,
        quote: DeliveryQuote<'static>,
    ) -> bool {
        if lookup.generation != self.delivery_generation || lookup.cart != self.cart.id() {
            debug!(
                generation = lookup.generation,
                current = self.delivery_generation,
                "discarding superseded delivery quote"
            );

            return false;
        }

        self.delivery = quote;

        true
    }

    /// Start a cart refetch. Any refetch started earlier is superseded.
    pub fn begin_cart_refresh(&mut self) -> CartRefresh {
        self.cart_generation += 1;

        CartRefresh {
            generation: self.cart_generation,
            cart: self.cart.id(),
        }
    }

    /// Accept a refetched cart. Returns `Ok(false)`, leaving state untouched, if the refetch has
    /// been superseded.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CartMismatch`] if the snapshot is for another cart.
    pub fn complete_cart_refresh(
        &mut self,
        refresh: CartRefresh,
        cart: CartSnapshot<'static>,
    ) -> Result<bool, SessionError> {
        if refresh.generation != self.cart_generation {
            debug!(
                generation = refresh.generation,
                current = self.cart_generation,
                "discarding superseded cart snapshot"
            );

            return Ok(false);
        }

        self.replace_cart(cart)?;

        Ok(true)
    }

    /// Refetch the cart, then re-quote delivery if a destination is resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if either lookup fails.
    #[tracing::instrument(
        name = "session.refresh_cart",
        skip(self, store, quotes),
        fields(cart_id = %self.cart.id())
    )]
    pub async fn refresh_cart(
        &mut self,
        store: &dyn CartStore,
        quotes: &dyn DeliveryQuoteProvider,
    ) -> Result<bool, SessionError> {
        let refresh = self.begin_cart_refresh();
        let cart = store.fetch_cart(refresh.cart).await?;

        if !self.complete_cart_refresh(refresh, cart)? {
            return Ok(false);
        }

        self.refresh_delivery_quote(quotes).await?;

        Ok(true)
    }

    /// Add a product to the cart and refetch it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the item or a lookup fails.
    #[tracing::instrument(
        name = "session.add_item",
        skip(self, store, quotes),
        fields(cart_id = %self.cart.id())
    )]
    pub async fn add_item(
        &mut self,
        store: &dyn CartStore,
        quotes: &dyn DeliveryQuoteProvider,
        product: ProductId,
        quantity: u32,
    ) -> Result<bool, SessionError> {
        store.add_item(self.cart.id(), product, quantity).await?;

        self.refresh_cart(store, quotes).await
    }

    /// Look up the delivery quote for the current destination. Returns whether a quote was
    /// applied; `false` when there is no destination yet or the lookup was superseded.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DeliveryQuote`] if the provider fails.
    #[tracing::instrument(
        name = "session.refresh_delivery_quote",
        skip(self, quotes),
        fields(cart_id = %self.cart.id())
    )]
    pub async fn refresh_delivery_quote(
        &mut self,
        quotes: &dyn DeliveryQuoteProvider,
    ) -> Result<bool, SessionError> {
        let Some(lookup) = self.begin_delivery_lookup() else {
            return Ok(false);
        };

        let quote = quotes
            .quote(lookup.cart, lookup.destination.clone())
            .await?;

        Ok(self.complete_delivery_lookup(&lookup, quote))
    }

    /// Price breakdown for the current state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Totals`] if the totals cannot be computed.
    pub fn breakdown(&self) -> Result<PriceBreakdown<'static>, SessionError> {
        Ok(PriceBreakdown::compute(
            &self.cart,
            self.shipping_enabled,
            &self.delivery,
            &self.voucher,
        )?)
    }

    /// Validate the current state and build the submission payload.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] when the cart has no lines.
    /// - [`SessionError::Totals`] when the voucher discount is stale.
    /// - Any [`CheckoutError`] from [`build_checkout_payload`].
    pub fn payload(&self) -> Result<CheckoutPayload, SessionError> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart.into());
        }

        self.breakdown()?;

        Ok(build_checkout_payload(
            &self.recipient,
            self.shipping_enabled,
            Some(&self.address),
            &self.voucher,
        )?)
    }

    /// Validate and submit the order, reporting the outcome to the cashier.
    ///
    /// Validation problems are reported before anything is sent. A rejection from the order
    /// service shows its message; other failures show [`RETRY_LATER_MESSAGE`]. Nothing is
    /// retried.
    ///
    /// # Errors
    ///
    /// Returns the validation or submission error that was reported.
    #[tracing::instrument(
        name = "session.submit",
        skip(self, submitter, notifier),
        fields(cart_id = %self.cart.id(), shipping = self.shipping_enabled)
    )]
    pub async fn submit(
        &self,
        submitter: &dyn OrderSubmitter,
        notifier: &dyn NotificationSink,
    ) -> Result<OrderId, SessionError> {
        let payload = match self.payload() {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, "checkout blocked");
                notifier.notify(Notification::warning(error.user_message()));

                return Err(error);
            }
        };

        match submitter.submit(self.cart.id(), payload).await {
            Ok(order) => {
                info!(order_id = %order, "order submitted");
                notifier.notify(Notification::success(format!("Order {order} created.")));

                Ok(order)
            }
            Err(error) => {
                let error = SessionError::from(error);

                warn!(%error, "order submission failed");
                notifier.notify(Notification::error(error.user_message()));

                Err(error)
            }
        }
    }
}
