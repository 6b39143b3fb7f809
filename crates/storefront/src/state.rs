//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::currency::{CurrencyError, CurrencyService};
use crate::services::gift_builder::GiftBuilderService;
use crate::services::search::SearchService;
use crate::services::tracking::{TrackingError, TrackingService};
use crate::shopify::{AdminClient, StorefrontClient};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("currency client: {0}")]
    Currency(#[from] CurrencyError),
    #[error("tracking client: {0}")]
    Tracking(#[from] TrackingError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; every client inside is itself shareable.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    shopify: StorefrontClient,
    admin: Option<AdminClient>,
    currency: CurrencyService,
    tracking: TrackingService,
    search: SearchService,
    gift_builder: GiftBuilderService,
}

impl AppState {
    /// Build every client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an API key cannot be used as a header value or an
    /// HTTP client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let shopify = StorefrontClient::new(&config.shopify);
        let admin = AdminClient::new(&config.shopify);
        let currency = CurrencyService::new(&config.currency)?;
        let tracking = TrackingService::new(&config.tracking)?;
        let search = SearchService::new(shopify.clone());
        let gift_builder = GiftBuilderService::new(shopify.clone(), config.gift_builder.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                shopify,
                admin,
                currency,
                tracking,
                search,
                gift_builder,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Shopify Storefront API client.
    #[must_use]
    pub fn shopify(&self) -> &StorefrontClient {
        &self.inner.shopify
    }

    /// Shopify Admin API client, when an admin token is configured.
    #[must_use]
    pub fn admin(&self) -> Option<&AdminClient> {
        self.inner.admin.as_ref()
    }

    #[must_use]
    pub fn currency(&self) -> &CurrencyService {
        &self.inner.currency
    }

    #[must_use]
    pub fn tracking(&self) -> &TrackingService {
        &self.inner.tracking
    }

    #[must_use]
    pub fn search(&self) -> &SearchService {
        &self.inner.search
    }

    #[must_use]
    pub fn gift_builder(&self) -> &GiftBuilderService {
        &self.inner.gift_builder
    }
}
