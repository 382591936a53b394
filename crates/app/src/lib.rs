//! San Isidro client application: API services, local storage, checkout and configuration.

pub mod admin;
pub mod api;
pub mod checkout;
pub mod config;
pub mod context;
pub mod domain;
pub mod observability;
pub mod session;
pub mod storage;
