//! Identifiers
//!
//! Opaque numeric identifiers issued by the order management backend.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

backend_id!(
    /// Cart identifier
    CartId
);

backend_id!(
    /// Product (variant) identifier
    ProductId
);

backend_id!(
    /// Customer account identifier
    AccountId
);

backend_id!(
    /// Saved customer info (recipient profile) identifier
    CustomerInfoId
);

backend_id!(
    /// Voucher identifier
    VoucherId
);

backend_id!(
    /// Order identifier returned by a successful submission
    OrderId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_their_raw_value() {
        assert_eq!(CartId(42).to_string(), "42");
        assert_eq!(OrderId::from(7).to_string(), "7");
    }
}
