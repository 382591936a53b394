//! Reservations

pub mod cancel;
pub mod service;

pub use cancel::{CancelError, cancel_reservation};
pub use service::*;
