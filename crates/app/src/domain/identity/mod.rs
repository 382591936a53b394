//! National ID lookup

pub mod service;

pub use service::*;
