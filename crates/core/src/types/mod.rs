//! Core types for Boxcraft.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod invoice;
pub mod loyalty;
pub mod price;
pub mod rates;
pub mod status;

pub use email::{Email, EmailError};
pub use invoice::{
    Invoice, InvoiceCustomer, InvoiceError, InvoiceLine, InvoiceTotals, calculate_totals,
};
pub use loyalty::{LoyaltyStatus, LoyaltyTier, points_for_purchase};
pub use price::{CurrencyCode, Price, PriceError, format_amount};
pub use rates::{RateSource, RateTable};
pub use status::{FulfillmentStatus, ShipmentStatus};
