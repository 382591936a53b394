//! San Isidro
//!
//! Cart, promotion and checkout domain for the San Isidro restaurant ordering client: product
//! catalogue types, a persisted cart, promotion eligibility and discount maths, order and invoice
//! assembly, and the validation of every customer-facing form.

pub mod cart;
pub mod dates;
pub mod discounts;
pub mod orders;
pub mod payments;
pub mod pricing;
pub mod products;
pub mod promotions;
pub mod receipt;
pub mod reservations;
pub mod storage;
pub mod users;
pub mod validation;
pub mod wire;
