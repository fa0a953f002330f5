//! Collaborators
//!
//! Contracts for the backend services and presentation hooks the checkout relies on. The
//! transport behind them (REST calls, snackbars) belongs to the embedding application.

pub mod carts;
pub mod delivery;
pub mod notifications;
pub mod orders;
pub mod vouchers;

pub use carts::{CartStore, CartStoreError, MockCartStore};
pub use delivery::{DeliveryQuoteError, DeliveryQuoteProvider, MockDeliveryQuoteProvider};
pub use notifications::{
    MockNotificationSink, Notification, NotificationLog, NotificationSink, Severity,
    TracingNotifier,
};
pub use orders::{MockOrderSubmitter, OrderSubmitError, OrderSubmitter};
pub use vouchers::{MockVoucherCatalog, VoucherCatalog, VoucherCatalogError};
