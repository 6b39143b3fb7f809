//! Boxcraft Core - Shared types library.
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. The storefront crate builds its view models and handlers on top
//! of these.
//!
//! # Modules
//!
//! - [`types`] - Prices and currencies, exchange rate tables, invoice totals,
//!   loyalty tiers, shipment statuses and validated emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
