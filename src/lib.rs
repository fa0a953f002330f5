//! Till
//!
//! Till is the cart pricing and checkout assembly engine behind the back-office order console.
//! It prices carts, applies vouchers, adds shipping and assembles the order submission
//! payload, and ships a small session layer that keeps that state consistent while
//! asynchronous lookups come and go.

pub mod carts;
pub mod checkout;
pub mod delivery;
pub mod discounts;
pub mod fixtures;
pub mod ids;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod recipients;
pub mod services;
pub mod session;
pub mod totals;
pub mod utils;
pub mod vouchers;
