//! Services layered over the Shopify clients and third-party APIs.
//!
//! - `currency` - exchange rates from currencyapi.com, cached hourly
//! - `gift_builder` - gift box wizard state and cart composition
//! - `search` - product and collection search with per-visitor supersession
//! - `tracking` - shipment tracking through ship24

pub mod currency;
pub mod gift_builder;
pub mod search;
pub mod tracking;
