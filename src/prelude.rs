//! Till prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    carts::{CartError, CartLine, CartSnapshot},
    checkout::{
        AccountRef, CheckoutError, CheckoutPayload, CustomerInfoPayload, SaleMethod,
        build_checkout_payload,
    },
    delivery::{DeliveryError, DeliveryQuote, Destination},
    discounts::DiscountError,
    fixtures::{Fixture, FixtureError, backend::FixtureBackend},
    ids::{AccountId, CartId, CustomerInfoId, OrderId, ProductId, VoucherId},
    pricing::{TotalPriceError, line_subtotal, total_price},
    receipt::{Receipt, ReceiptError, write_voucher_table},
    recipients::{
        Account, AddressField, AddressInput, CustomerInfo, District, Province, RecipientError,
        RecipientSelection, Ward,
    },
    services::{
        CartStore, CartStoreError, DeliveryQuoteError, DeliveryQuoteProvider, Notification,
        NotificationLog, NotificationSink, OrderSubmitError, OrderSubmitter, Severity,
        TracingNotifier, VoucherCatalog, VoucherCatalogError,
    },
    session::{CartRefresh, CheckoutSession, DeliveryLookup, RETRY_LATER_MESSAGE, SessionError},
    totals::{PriceBreakdown, TotalsError, grand_total},
    vouchers::{
        VoucherApplication, VoucherError, VoucherKind, VoucherOffer, VoucherRef, VoucherStatus,
        apply_voucher,
        catalog::{Eligibility, eligible_offers, find_by_code},
    },
};
