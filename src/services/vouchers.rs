//! Voucher catalog.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::vouchers::VoucherOffer;

/// Errors returned by the voucher catalog.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VoucherCatalogError {
    /// The backend could not be reached.
    #[error("voucher catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only voucher listing backing the voucher selector.
#[automock]
#[async_trait]
pub trait VoucherCatalog: Send + Sync {
    /// List the vouchers offered to the cashier.
    async fn list_vouchers(&self) -> Result<Vec<VoucherOffer<'static>>, VoucherCatalogError>;
}
