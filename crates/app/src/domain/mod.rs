//! Remote API services, one per resource.

pub mod identity;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod reservations;
pub mod users;
