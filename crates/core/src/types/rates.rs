//! Exchange rate table used for display-currency conversion.
//!
//! Rates are quoted as units of the target currency per one unit of the
//! base currency (the store's currency, USD). A static fallback table is used
//! whenever the live rate provider is unavailable.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price::{CurrencyCode, Price, format_amount};

/// Where a rate table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Fetched from the rate provider.
    Live,
    /// Built-in static table.
    Fallback,
}

/// A set of exchange rates relative to a base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    /// Currency the rates are quoted against.
    pub base: CurrencyCode,
    /// Units of each currency per one unit of `base`.
    pub rates: HashMap<CurrencyCode, Decimal>,
    /// Where these rates came from.
    pub source: RateSource,
    /// When the provider last updated the rates (live tables only).
    pub updated_at: Option<DateTime<Utc>>,
}

impl RateTable {
    /// Build a live table from provider data.
    ///
    /// Non-positive rates are dropped; the base currency always maps to one.
    #[must_use]
    pub fn live(
        base: CurrencyCode,
        rates: impl IntoIterator<Item = (CurrencyCode, Decimal)>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut rates: HashMap<_, _> = rates
            .into_iter()
            .filter(|(_, rate)| rate.is_sign_positive() && !rate.is_zero())
            .collect();
        rates.insert(base, Decimal::ONE);

        Self {
            base,
            rates,
            source: RateSource::Live,
            updated_at,
        }
    }

    /// Static USD-based table used when live rates cannot be fetched.
    #[must_use]
    pub fn fallback() -> Self {
        let rates = HashMap::from([
            (CurrencyCode::USD, Decimal::ONE),
            (CurrencyCode::EUR, Decimal::new(92, 2)),
            (CurrencyCode::GBP, Decimal::new(79, 2)),
            (CurrencyCode::CAD, Decimal::new(136, 2)),
            (CurrencyCode::AUD, Decimal::new(152, 2)),
            (CurrencyCode::INR, Decimal::new(8320, 2)),
            (CurrencyCode::JPY, Decimal::new(14950, 2)),
            (CurrencyCode::AED, Decimal::new(36725, 4)),
            (CurrencyCode::SGD, Decimal::new(134, 2)),
            (CurrencyCode::CHF, Decimal::new(88, 2)),
        ]);

        Self {
            base: CurrencyCode::USD,
            rates,
            source: RateSource::Fallback,
            updated_at: None,
        }
    }

    /// Rate for a currency relative to the base.
    #[must_use]
    pub fn rate(&self, currency: CurrencyCode) -> Option<Decimal> {
        if currency == self.base {
            return Some(Decimal::ONE);
        }
        self.rates.get(&currency).copied()
    }

    /// Convert an amount between two currencies.
    ///
    /// Converting to the same currency returns the amount unchanged. Returns
    /// `None` if either rate is missing.
    #[must_use]
    pub fn convert(&self, amount: Decimal, from: CurrencyCode, to: CurrencyCode) -> Option<Decimal> {
        if from == to {
            return Some(amount);
        }
        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;
        amount.checked_div(from_rate)?.checked_mul(to_rate)
    }

    /// Convert a price into another currency, rounded to its minor units.
    #[must_use]
    pub fn convert_price(&self, price: &Price, to: CurrencyCode) -> Option<Price> {
        let amount = self.convert(price.amount, price.currency_code, to)?;
        Some(Price::new(to.round(amount), to))
    }

    /// Format a price in the target currency.
    ///
    /// Falls back to the price's own currency if no rate is known, so the
    /// storefront always has something to show.
    #[must_use]
    pub fn format_in(&self, price: &Price, to: CurrencyCode) -> String {
        self.convert_price(price, to).map_or_else(
            || price.display(),
            |converted| format_amount(converted.amount, converted.currency_code),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_same_currency_is_identity() {
        let table = RateTable::fallback();
        let amount = Decimal::new(12345, 2);
        assert_eq!(
            table.convert(amount, CurrencyCode::EUR, CurrencyCode::EUR),
            Some(amount)
        );
    }

    #[test]
    fn test_convert_from_base() {
        let table = RateTable::fallback();
        let eur = table
            .convert(Decimal::new(100, 0), CurrencyCode::USD, CurrencyCode::EUR)
            .unwrap();
        assert_eq!(eur, Decimal::new(92, 0));
    }

    #[test]
    fn test_convert_cross_rate() {
        let table = RateTable::live(
            CurrencyCode::USD,
            [
                (CurrencyCode::EUR, Decimal::new(5, 1)),
                (CurrencyCode::GBP, Decimal::new(25, 2)),
            ],
            None,
        );
        let gbp = table
            .convert(Decimal::new(10, 0), CurrencyCode::EUR, CurrencyCode::GBP)
            .unwrap();
        assert_eq!(gbp, Decimal::new(5, 0));
    }

    #[test]
    fn test_missing_rate_returns_none() {
        let table = RateTable::live(CurrencyCode::USD, [], None);
        assert!(
            table
                .convert(Decimal::ONE, CurrencyCode::USD, CurrencyCode::JPY)
                .is_none()
        );
    }

    #[test]
    fn test_live_drops_non_positive_rates() {
        let table = RateTable::live(
            CurrencyCode::USD,
            [
                (CurrencyCode::EUR, Decimal::ZERO),
                (CurrencyCode::GBP, Decimal::new(-1, 0)),
            ],
            None,
        );
        assert!(table.rate(CurrencyCode::EUR).is_none());
        assert!(table.rate(CurrencyCode::GBP).is_none());
        assert_eq!(table.rate(CurrencyCode::USD), Some(Decimal::ONE));
    }

    #[test]
    fn test_format_in_is_deterministic() {
        let table = RateTable::fallback();
        let price = Price::new(Decimal::new(2500, 2), CurrencyCode::USD);
        let first = table.format_in(&price, CurrencyCode::GBP);
        let second = table.format_in(&price, CurrencyCode::GBP);
        assert_eq!(first, second);
        assert_eq!(first, "£19.75");
    }

    #[test]
    fn test_format_in_without_rate_uses_source_currency() {
        let table = RateTable::live(CurrencyCode::USD, [], None);
        let price = Price::new(Decimal::new(2500, 2), CurrencyCode::USD);
        assert_eq!(table.format_in(&price, CurrencyCode::INR), "$25.00");
    }

    #[test]
    fn test_convert_price_rounds_to_minor_units() {
        let table = RateTable::fallback();
        let price = Price::new(Decimal::new(1999, 2), CurrencyCode::USD);
        let yen = table.convert_price(&price, CurrencyCode::JPY).unwrap();
        assert_eq!(yen.amount, Decimal::new(2989, 0));
        assert_eq!(yen.currency_code, CurrencyCode::JPY);
    }
}
