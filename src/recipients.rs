//! Recipients
//!
//! Who an order is for: nobody in particular, a customer account, or a customer account with
//! one of its saved addresses. Also the manual address form used when shipping to an address
//! that is not saved.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    delivery::Destination,
    ids::{AccountId, CustomerInfoId},
};

/// Errors selecting a recipient.
#[derive(Debug, Error, PartialEq)]
pub enum RecipientError {
    /// The account has no saved address with this id.
    #[error("account {0} has no saved address {1}")]
    UnknownCustomerInfo(AccountId, CustomerInfoId),
}

/// Province reference from the carrier's address directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    /// Carrier province id
    pub id: u32,

    /// Display name
    pub name: String,
}

/// District reference from the carrier's address directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    /// Carrier district id
    pub id: u32,

    /// Display name
    pub name: String,
}

/// Ward reference from the carrier's address directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ward {
    /// Carrier ward code
    pub code: String,

    /// Display name
    pub name: String,
}

/// A recipient profile saved against an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    /// Saved profile id
    pub id: CustomerInfoId,

    /// Recipient name
    pub fullname: String,

    /// Recipient phone number
    pub phone: String,

    /// Street address
    pub address: String,

    /// Carrier province id
    pub province_id: u32,

    /// Province display name
    pub province_name: String,

    /// Carrier district id
    pub district_id: u32,

    /// District display name
    pub district_name: String,

    /// Carrier ward code
    pub ward_code: String,

    /// Ward display name
    pub ward_name: String,
}

impl CustomerInfo {
    /// Where a delivery to this profile goes.
    pub fn destination(&self) -> Destination {
        Destination {
            district_id: self.district_id,
            ward_code: self.ward_code.clone(),
        }
    }
}

/// A customer account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account id
    pub id: AccountId,

    /// Account holder name
    pub fullname: String,

    /// Account email, if known
    #[serde(default)]
    pub email: Option<String>,

    /// Saved recipient profiles
    #[serde(default)]
    pub customer_infos: Vec<CustomerInfo>,
}

impl Account {
    /// Find a saved recipient profile.
    pub fn customer_info(&self, id: CustomerInfoId) -> Option<&CustomerInfo> {
        self.customer_infos.iter().find(|info| info.id == id)
    }
}

/// Who the order is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientSelection {
    /// Walk-in sale with no account.
    Anonymous,

    /// A known account; a delivery address must be entered by hand.
    Account(Account),

    /// A known account shipping to one of its saved addresses.
    SavedAddress {
        /// Account placing the order
        account: Account,

        /// Selected saved address
        customer_info: CustomerInfo,
    },
}

impl RecipientSelection {
    /// Select one of the account's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns [`RecipientError::UnknownCustomerInfo`] if the account has no such address.
    pub fn saved_address(account: Account, id: CustomerInfoId) -> Result<Self, RecipientError> {
        let customer_info = account
            .customer_info(id)
            .cloned()
            .ok_or(RecipientError::UnknownCustomerInfo(account.id, id))?;

        Ok(Self::SavedAddress {
            account,
            customer_info,
        })
    }

    /// The selected account, if any.
    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::Anonymous => None,
            Self::Account(account) | Self::SavedAddress { account, .. } => Some(account),
        }
    }

    /// Whether a delivery needs a hand-entered address.
    pub fn requires_manual_address(&self) -> bool {
        !matches!(self, Self::SavedAddress { .. })
    }
}

/// Address form field required for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    /// Province select
    Province,

    /// District select
    District,

    /// Ward select
    Ward,

    /// Street address
    Address,
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Province => "province",
            Self::District => "district",
            Self::Ward => "ward",
            Self::Address => "address",
        })
    }
}

/// Hand-entered delivery details. Blank strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AddressInput {
    /// Selected province
    pub province: Option<Province>,

    /// Selected district
    pub district: Option<District>,

    /// Selected ward
    pub ward: Option<Ward>,

    /// Recipient name
    pub fullname: String,

    /// Recipient phone number
    pub phone: String,

    /// Street address
    pub address: String,

    /// Contact email
    pub email: Option<String>,
}

impl AddressInput {
    /// Required fields that are still unset, in form order.
    pub fn missing_fields(&self) -> SmallVec<[AddressField; 4]> {
        let mut missing = SmallVec::new();

        if self.province.is_none() {
            missing.push(AddressField::Province);
        }

        if self.district.is_none() {
            missing.push(AddressField::District);
        }

        if self.ward.is_none() {
            missing.push(AddressField::Ward);
        }

        if self.address.trim().is_empty() {
            missing.push(AddressField::Address);
        }

        missing
    }

    /// Contact email, if one was entered.
    pub fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }

    /// Delivery destination, once both district and ward are chosen.
    pub fn destination(&self) -> Option<Destination> {
        match (&self.district, &self.ward) {
            (Some(district), Some(ward)) => Some(Destination {
                district_id: district.id,
                ward_code: ward.code.clone(),
            }),
            _ => None,
        }
    }
}
