//! Invoice line items and totals.
//!
//! Totals are computed in decimal arithmetic: the subtotal and tax are each
//! rounded to the currency's minor units, and the total is their sum, so
//! `total == subtotal + tax` always holds exactly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::price::{CurrencyCode, Price};

/// Errors raised when validating an invoice.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvoiceError {
    #[error("customer name is required")]
    MissingCustomerName,
    #[error("invoice must have at least one line")]
    NoLines,
    #[error("line {0}: description is required")]
    MissingDescription(usize),
    #[error("line {0}: quantity must be greater than zero")]
    InvalidQuantity(usize),
    #[error("line {0}: unit price cannot be negative")]
    NegativePrice(usize),
    #[error("tax rate must be between 0 and 1")]
    InvalidTaxRate,
    #[error("invoice amount is too large")]
    AmountTooLarge,
}

/// A single invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl InvoiceLine {
    /// Quantity times unit price, unrounded. `None` on overflow.
    #[must_use]
    pub fn amount(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Invoice recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceCustomer {
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub address: Option<String>,
}

/// Computed invoice totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Price,
    pub tax: Price,
    pub total: Price,
}

/// An invoice ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: String,
    pub customer: InvoiceCustomer,
    pub currency_code: CurrencyCode,
    pub lines: Vec<InvoiceLine>,
    /// Fraction between 0 and 1 (e.g. 0.18 for 18%).
    pub tax_rate: Decimal,
}

impl Invoice {
    /// Check required fields and line values.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), InvoiceError> {
        if self.customer.name.trim().is_empty() {
            return Err(InvoiceError::MissingCustomerName);
        }
        if self.lines.is_empty() {
            return Err(InvoiceError::NoLines);
        }
        if self.tax_rate.is_sign_negative() || self.tax_rate > Decimal::ONE {
            return Err(InvoiceError::InvalidTaxRate);
        }
        for (i, line) in self.lines.iter().enumerate() {
            let n = i + 1;
            if line.description.trim().is_empty() {
                return Err(InvoiceError::MissingDescription(n));
            }
            if line.quantity == 0 {
                return Err(InvoiceError::InvalidQuantity(n));
            }
            if line.unit_price.is_sign_negative() && !line.unit_price.is_zero() {
                return Err(InvoiceError::NegativePrice(n));
            }
        }
        self.totals().map(|_| ())
    }

    /// Subtotal, tax and total in the invoice currency.
    ///
    /// # Errors
    ///
    /// Returns `AmountTooLarge` if any amount overflows.
    pub fn totals(&self) -> Result<InvoiceTotals, InvoiceError> {
        calculate_totals(&self.lines, self.tax_rate, self.currency_code)
    }
}

/// Compute totals for a set of lines at a fixed tax rate.
///
/// An empty set of lines yields all-zero totals.
///
/// # Errors
///
/// Returns `AmountTooLarge` when a line amount, the subtotal, the tax or the
/// total does not fit in a `Decimal`.
pub fn calculate_totals(
    lines: &[InvoiceLine],
    tax_rate: Decimal,
    currency: CurrencyCode,
) -> Result<InvoiceTotals, InvoiceError> {
    let subtotal = lines.iter().try_fold(Decimal::ZERO, |sum, line| {
        line.amount().and_then(|amount| sum.checked_add(amount))
    });
    let subtotal = subtotal.ok_or(InvoiceError::AmountTooLarge)?;
    let subtotal = currency.round(subtotal);
    let tax = subtotal
        .checked_mul(tax_rate)
        .map(|tax| currency.round(tax))
        .ok_or(InvoiceError::AmountTooLarge)?;
    let total = subtotal
        .checked_add(tax)
        .ok_or(InvoiceError::AmountTooLarge)?;

    Ok(InvoiceTotals {
        subtotal: Price::new(subtotal, currency),
        tax: Price::new(tax, currency),
        total: Price::new(total, currency),
    })
}
