//! Product and collection search with per-visitor supersession.
//!
//! Each visitor has a slot holding a generation counter and the abort handle
//! of its in-flight search. Starting a new search bumps the generation and
//! aborts the previous task, so an older query can never answer after a
//! newer one has been issued: the older request gets `Superseded` instead.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, instrument};

use crate::shopify::{Image, Money, ShopifyError, StorefrontClient};

const PRODUCT_LIMIT: i64 = 10;
const COLLECTION_LIMIT: i64 = 5;

/// Errors that can occur while searching.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A newer search from the same visitor replaced this one.
    #[error("Search superseded by a newer query")]
    Superseded,

    /// Shopify request failed.
    #[error(transparent)]
    Shopify(#[from] ShopifyError),

    /// The search task failed unexpectedly.
    #[error("Search task failed: {0}")]
    Internal(String),
}

/// Product hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchProduct {
    pub handle: String,
    pub title: String,
    pub vendor: String,
    pub price: Money,
    pub image: Option<Image>,
    pub available: bool,
}

/// Collection hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchCollection {
    pub handle: String,
    pub title: String,
    pub image: Option<Image>,
}

/// Merged search results.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub products: Vec<SearchProduct>,
    pub collections: Vec<SearchCollection>,
}

#[derive(Default)]
struct Slot {
    state: Mutex<SlotState>,
}

#[derive(Default)]
struct SlotState {
    generation: u64,
    current: Option<AbortHandle>,
}

/// Runs at most one task per key; a newer task aborts and supersedes the
/// older one.
#[derive(Clone)]
pub struct LatestOnly {
    slots: Cache<String, Arc<Slot>>,
}

impl LatestOnly {
    /// Create a coordinator. Idle visitor slots expire after `idle`.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            slots: Cache::builder()
                .max_capacity(100_000)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Run `task` as the latest task for `key`.
    ///
    /// # Errors
    ///
    /// Returns `Superseded` if another task for the same key started before
    /// this one finished, otherwise whatever the task returns.
    pub async fn run<T, F>(&self, key: &str, task: F) -> Result<T, SearchError>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, SearchError>> + Send + 'static,
    {
        let slot = self
            .slots
            .get_with(key.to_string(), async { Arc::new(Slot::default()) })
            .await;

        let (generation, handle) = {
            let mut state = slot.state.lock().await;
            state.generation += 1;
            let handle = tokio::spawn(task);
            if let Some(previous) = state.current.replace(handle.abort_handle()) {
                previous.abort();
            }
            (state.generation, handle)
        };

        let outcome = handle.await;

        let mut state = slot.state.lock().await;
        if state.generation != generation {
            debug!(generation, latest = state.generation, "Discarding superseded result");
            return Err(SearchError::Superseded);
        }
        state.current = None;
        drop(state);

        match outcome {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(SearchError::Superseded),
            Err(e) => Err(SearchError::Internal(e.to_string())),
        }
    }
}

/// Storefront search service.
#[derive(Clone)]
pub struct SearchService {
    shopify: StorefrontClient,
    latest: LatestOnly,
}

impl SearchService {
    #[must_use]
    pub fn new(shopify: StorefrontClient) -> Self {
        Self {
            shopify,
            latest: LatestOnly::new(Duration::from_secs(30 * 60)),
        }
    }

    /// Search products and collections for a visitor.
    ///
    /// An empty query returns empty results without calling Shopify, but
    /// still supersedes the visitor's in-flight search.
    ///
    /// # Errors
    ///
    /// Returns `Superseded` when a newer search from the same visitor started,
    /// or the Shopify error if either lookup fails.
    #[instrument(skip(self))]
    pub async fn search(&self, visitor: &str, query: &str) -> Result<SearchResults, SearchError> {
        let query = query.trim().to_string();
        let shopify = self.shopify.clone();

        self.latest
            .run(visitor, async move {
                if query.is_empty() {
                    return Ok(SearchResults::default());
                }
                fetch(&shopify, query).await
            })
            .await
    }
}

async fn fetch(shopify: &StorefrontClient, query: String) -> Result<SearchResults, SearchError> {
    let (products, collections) = tokio::join!(
        shopify.search_products(&query, PRODUCT_LIMIT),
        shopify.search_collections(&query, COLLECTION_LIMIT),
    );

    let products = products?
        .products
        .into_iter()
        .map(|p| SearchProduct {
            price: p.price_range.min_variant_price,
            image: p.featured_image,
            available: p.available_for_sale,
            handle: p.handle,
            title: p.title,
            vendor: p.vendor,
        })
        .collect();

    let collections = collections?
        .collections
        .into_iter()
        .map(|c| SearchCollection {
            handle: c.handle,
            title: c.title,
            image: c.image,
        })
        .collect();

    Ok(SearchResults {
        query,
        products,
        collections,
    })
}
