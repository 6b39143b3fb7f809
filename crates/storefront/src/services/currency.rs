//! Exchange rates from currencyapi.com.
//!
//! Rates are fetched against the store currency and cached for an hour.
//! Without an API key, or when the provider fails, the static fallback table
//! is served instead and cached for a minute before the provider is tried
//! again. Concurrent misses share a single fetch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use boxcraft_core::{CurrencyCode, RateSource, RateTable};
use chrono::{DateTime, Utc};
use moka::Expiry;
use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::CurrencyConfig;

const CACHE_KEY: &str = "latest";

/// How long the fallback table is served before the provider is retried.
const FALLBACK_TTL: Duration = Duration::from_secs(60);

/// Live tables live for the configured TTL, fallback tables briefly.
struct RatesExpiry {
    live: Duration,
}

impl Expiry<&'static str, RateTable> for RatesExpiry {
    fn expire_after_create(
        &self,
        _key: &&'static str,
        table: &RateTable,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(match table.source {
            RateSource::Live => self.live,
            RateSource::Fallback => FALLBACK_TTL.min(self.live),
        })
    }
}

/// Errors that can occur when fetching exchange rates.
#[derive(Debug, Error)]
pub enum CurrencyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No API key configured.
    #[error("currency API key not configured")]
    NotConfigured,

    /// Currency the store does not sell in.
    #[error("Unsupported currency: {0}")]
    Unsupported(String),
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    meta: Option<LatestMeta>,
    data: HashMap<String, RateNode>,
}

#[derive(Debug, Deserialize)]
struct LatestMeta {
    #[serde(default)]
    last_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RateNode {
    value: f64,
}

/// Exchange rate service with an hourly cache.
#[derive(Clone)]
pub struct CurrencyService {
    inner: Arc<CurrencyServiceInner>,
}

struct CurrencyServiceInner {
    client: reqwest::Client,
    api_url: String,
    base: CurrencyCode,
    configured: bool,
    cache: Cache<&'static str, RateTable>,
}

impl CurrencyService {
    /// Create a new currency service.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &CurrencyConfig) -> Result<Self, CurrencyError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(
                "apikey",
                HeaderValue::from_str(key.expose_secret())
                    .map_err(|e| CurrencyError::Parse(format!("Invalid API key format: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1)
            .expire_after(RatesExpiry {
                live: config.cache_ttl,
            })
            .build();

        Ok(Self {
            inner: Arc::new(CurrencyServiceInner {
                client,
                api_url: config.api_url.clone(),
                base: config.base_currency,
                configured: config.api_key.is_some(),
                cache,
            }),
        })
    }

    /// Current rate table. Never fails: falls back to static rates.
    #[instrument(skip(self))]
    pub async fn rates(&self) -> RateTable {
        self.inner
            .cache
            .get_with(CACHE_KEY, self.load())
            .await
    }

    async fn load(&self) -> RateTable {
        match self.fetch_live().await {
            Ok(table) => table,
            Err(CurrencyError::NotConfigured) => {
                debug!("No currency API key, serving fallback rates");
                RateTable::fallback()
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch exchange rates, serving fallback rates");
                RateTable::fallback()
            }
        }
    }

    /// Fetch the latest rates from the provider.
    ///
    /// # Errors
    ///
    /// Returns error if no key is configured, the request fails, or the
    /// response cannot be parsed.
    pub async fn fetch_live(&self) -> Result<RateTable, CurrencyError> {
        if !self.inner.configured {
            return Err(CurrencyError::NotConfigured);
        }

        let mut url = url::Url::parse(&self.inner.api_url)
            .map_err(|e| CurrencyError::Parse(format!("Invalid currency API URL: {e}")))?;
        let currencies = CurrencyCode::ALL
            .iter()
            .filter(|c| **c != self.inner.base)
            .map(|c| c.code())
            .collect::<Vec<_>>()
            .join(",");
        url.query_pairs_mut()
            .append_pair("base_currency", self.inner.base.code())
            .append_pair("currencies", &currencies);

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CurrencyError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let body: LatestResponse = response
            .json()
            .await
            .map_err(|e| CurrencyError::Parse(e.to_string()))?;

        let rates = body.data.into_iter().filter_map(|(code, node)| {
            let currency = code.parse::<CurrencyCode>().ok()?;
            let rate = Decimal::from_f64(node.value)?.round_dp(6);
            Some((currency, rate))
        });

        let table = RateTable::live(
            self.inner.base,
            rates,
            body.meta.and_then(|m| m.last_updated_at),
        );

        debug!(count = table.rates.len(), "Fetched exchange rates");
        Ok(table)
    }

    /// Convert an amount between two currencies using the current table.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` when either currency has no rate.
    pub async fn convert(
        &self,
        amount: Decimal,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> Result<Decimal, CurrencyError> {
        let table = self.rates().await;
        table
            .convert(amount, from, to)
            .map(|converted| to.round(converted))
            .ok_or_else(|| CurrencyError::Unsupported(format!("{from} to {to}")))
    }
}
