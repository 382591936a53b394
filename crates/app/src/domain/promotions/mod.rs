//! Promotions

pub mod service;

pub use service::*;
