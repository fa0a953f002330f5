//! Checkout
//!
//! Assembly of the order submission payload from the recipient, shipping and voucher choices.

use serde::Serialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    ids::{AccountId, CustomerInfoId},
    recipients::{Account, AddressField, AddressInput, CustomerInfo, RecipientSelection},
    vouchers::{VoucherApplication, VoucherRef},
};

/// Caller-correctable problems that block submission.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cart has no items")]
    EmptyCart,

    /// Delivery needs an address, but the form is not finished.
    #[error("delivery address is incomplete, missing: {}", join_fields(.missing))]
    IncompleteAddress {
        /// Unset fields, in form order
        missing: SmallVec<[AddressField; 4]>,
    },

    /// Anonymous deliveries need a contact email.
    #[error("an email address is required for deliveries without an account")]
    MissingEmail,
}

fn join_fields(fields: &[AddressField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// How the order is fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleMethod {
    /// Handed over in store
    Retail,

    /// Shipped to an address
    Delivery,
}

/// Reference to the ordering account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountRef {
    /// Account id
    pub id: AccountId,
}

/// Recipient block of the payload. Which fields are present depends on the sale method and
/// on whether a saved address was used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfoPayload {
    /// Saved profile id, when a saved address was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CustomerInfoId>,

    /// Recipient name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,

    /// Recipient phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Street address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Carrier province id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_id: Option<u32>,

    /// Province display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_name: Option<String>,

    /// Carrier district id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district_id: Option<u32>,

    /// District display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district_name: Option<String>,

    /// Carrier ward code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward_code: Option<String>,

    /// Ward display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward_name: Option<String>,

    /// Ordering account, `null` for anonymous sales
    pub account: Option<AccountRef>,
}

impl CustomerInfoPayload {
    fn from_saved(info: &CustomerInfo, account: &Account) -> Self {
        Self {
            id: Some(info.id),
            fullname: Some(info.fullname.clone()),
            phone: Some(info.phone.clone()),
            address: Some(info.address.clone()),
            province_id: Some(info.province_id),
            province_name: Some(info.province_name.clone()),
            district_id: Some(info.district_id),
            district_name: Some(info.district_name.clone()),
            ward_code: Some(info.ward_code.clone()),
            ward_name: Some(info.ward_name.clone()),
            account: Some(AccountRef { id: account.id }),
        }
    }
}

/// The body sent to the order submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    /// Recipient details
    pub customer_info: CustomerInfoPayload,

    /// Contact email
    pub email: Option<String>,

    /// Fulfilment method
    pub sale_method: SaleMethod,

    /// Chosen voucher, by id only
    pub voucher: Option<VoucherRef>,
}

/// Build the submission payload for the current checkout choices.
///
/// | shipping | recipient | saleMethod | customerInfo |
/// |---|---|---|---|
/// | yes | saved address | `DELIVERY` | the saved profile + account |
/// | yes | account / anonymous | `DELIVERY` | the address form + optional account |
/// | no | account / saved address | `RETAIL` | account id + name |
/// | no | anonymous | `RETAIL` | no account, no email |
///
/// # Errors
///
/// - [`CheckoutError::IncompleteAddress`]: delivering to a hand-entered address with any of
///   province, district, ward or street address unset.
/// - [`CheckoutError::MissingEmail`]: delivering to a hand-entered address with no account and
///   no email.
pub fn build_checkout_payload(
    recipient: &RecipientSelection,
    shipping_enabled: bool,
    address_input: Option<&AddressInput>,
    voucher: &VoucherApplication<'_>,
) -> Result<CheckoutPayload, CheckoutError> {
    let voucher = voucher.voucher_ref();

    if !shipping_enabled {
        let payload = match recipient.account() {
            Some(account) => CheckoutPayload {
                customer_info: CustomerInfoPayload {
                    fullname: Some(account.fullname.clone()),
                    account: Some(AccountRef { id: account.id }),
                    ..CustomerInfoPayload::default()
                },
                email: account.email.clone(),
                sale_method: SaleMethod::Retail,
                voucher,
            },
            None => CheckoutPayload {
                customer_info: CustomerInfoPayload::default(),
                email: None,
                sale_method: SaleMethod::Retail,
                voucher,
            },
        };

        return Ok(payload);
    }

    if let RecipientSelection::SavedAddress {
        account,
        customer_info,
    } = recipient
    {
        return Ok(CheckoutPayload {
            customer_info: CustomerInfoPayload::from_saved(customer_info, account),
            email: account.email.clone(),
            sale_method: SaleMethod::Delivery,
            voucher,
        });
    }

    let Some(input) = address_input else {
        return Err(CheckoutError::IncompleteAddress {
            missing: AddressInput::default().missing_fields(),
        });
    };

    let (Some(province), Some(district), Some(ward)) =
        (&input.province, &input.district, &input.ward)
    else {
        return Err(CheckoutError::IncompleteAddress {
            missing: input.missing_fields(),
        });
    };

    if input.address.trim().is_empty() {
        return Err(CheckoutError::IncompleteAddress {
            missing: input.missing_fields(),
        });
    }

    let account = recipient.account();

    let email = match account {
        Some(account) => account.email.clone(),
        None => Some(input.email().ok_or(CheckoutError::MissingEmail)?.to_string()),
    };

    Ok(CheckoutPayload {
        customer_info: CustomerInfoPayload {
            id: None,
            fullname: Some(input.fullname.clone()),
            phone: Some(input.phone.clone()),
            address: Some(input.address.clone()),
            province_id: Some(province.id),
            province_name: Some(province.name.clone()),
            district_id: Some(district.id),
            district_name: Some(district.name.clone()),
            ward_code: Some(ward.code.clone()),
            ward_name: Some(ward.name.clone()),
            account: account.map(|account| AccountRef { id: account.id }),
        },
        email,
        sale_method: SaleMethod::Delivery,
        voucher,
    })
}
