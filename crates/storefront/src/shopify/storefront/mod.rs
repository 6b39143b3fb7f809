//! Shopify Storefront API client implementation.
//!
//! Queries go through `graphql_client::GraphQLQuery` with `reqwest` 0.13 for
//! HTTP. Catalog reads (products, collections, menus, articles) are cached
//! using `moka` (5-minute TTL); carts and customers never are.

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::GraphQLQuery;
use moka::future::Cache;
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use crate::config::ShopifyConfig;
use crate::shopify::types::{
    Article, ArticleConnection, Cart, CartLineInput, CartLineUpdateInput, Collection,
    CollectionConnection, Customer, CustomerAccessToken, CustomerCreateInput, Menu, Product,
    ProductConnection, ProductSortKey,
};
use crate::shopify::{GraphQLError, ShopifyError, send_graphql, user_errors};

use cache::CacheValue;
use conversions::{
    convert_access_token, convert_article, convert_article_connection, convert_cart,
    convert_collection, convert_collection_connection, convert_customer, convert_menu,
    convert_product, convert_product_connection,
};
use queries::{
    AccessTokenCreateVariables, AccessTokenVariables, AddToCart, AddToCartVariables,
    ArticleVariables, ArticlesVariables, CartIdVariables, CartInput, CartPayload,
    CollectionByHandleVariables, CollectionsVariables, CreateCart, CreateCartVariables,
    CustomerAccessTokenCreate, CustomerAccessTokenCreateInput, CustomerAccessTokenDelete,
    CustomerCreate, CustomerCreateVariables, CustomerVariables, DiscountCodesVariables, GetArticle,
    GetArticles, GetCart, GetCollectionByHandle, GetCollections, GetCustomer, GetMenu,
    GetProductByHandle, GetProducts, GetShop, HandleVariables, NoVariables, ProductsVariables,
    RemoveFromCart, RemoveFromCartVariables, UpdateCartDiscountCodes, UpdateCartLines,
    UpdateCartLinesVariables,
};

/// Products fetched per page when the caller does not say otherwise.
pub const DEFAULT_PAGE_SIZE: i64 = 24;

/// Orders included with the customer profile.
const RECENT_ORDER_COUNT: i64 = 10;

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Provides type-safe access to catalog, cart and customer operations.
/// Catalog reads are cached for 5 minutes.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    cache: Cache<String, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let endpoint = format!("{}/api/{}/graphql.json", config.api_base, config.api_version);

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint,
                access_token: config.storefront_token.expose_secret().to_string(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            // See: https://shopify.dev/docs/storefronts/headless/building-with-the-storefront-api/getting-started
            .header("Shopify-Storefront-Private-Token", &self.inner.access_token);

        send_graphql::<Q>(request, variables).await
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        let cache_key = format!("product:{handle}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let data = self
            .execute::<GetProductByHandle>(HandleVariables {
                handle: handle.to_string(),
            })
            .await?;

        let product = data
            .product
            .map(convert_product)
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get a paginated list of products, optionally filtered by a Shopify
    /// search query.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        first: Option<i64>,
        after: Option<String>,
        query: Option<String>,
        sort_key: Option<ProductSortKey>,
        reverse: Option<bool>,
    ) -> Result<ProductConnection, ShopifyError> {
        let first = first.unwrap_or(DEFAULT_PAGE_SIZE);
        let cache_key = format!(
            "products:{first}:{}:{sort_key:?}:{reverse:?}",
            after.as_deref().unwrap_or("")
        );

        // Only cache default listings, never search queries
        if query.is_none()
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let is_search = query.is_some();
        let data = self
            .execute::<GetProducts>(ProductsVariables {
                first,
                after,
                query,
                sort_key,
                reverse,
            })
            .await?;

        let connection = convert_product_connection(data.products);

        if !is_search {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(connection.clone()))
                .await;
        }

        Ok(connection)
    }

    /// Search products by free text.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        query: &str,
        first: i64,
    ) -> Result<ProductConnection, ShopifyError> {
        self.get_products(
            Some(first),
            None,
            Some(query.to_string()),
            Some(ProductSortKey::Relevance),
            None,
        )
        .await
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    /// Get a collection by its handle, with one page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is not found or the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection_by_handle(
        &self,
        handle: &str,
        product_count: Option<i64>,
        after: Option<String>,
    ) -> Result<Collection, ShopifyError> {
        let product_count = product_count.unwrap_or(DEFAULT_PAGE_SIZE);
        let cache_key = format!(
            "collection:{handle}:{product_count}:{}",
            after.as_deref().unwrap_or("")
        );

        if let Some(CacheValue::Collection(collection)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for collection");
            return Ok(*collection);
        }

        let data = self
            .execute::<GetCollectionByHandle>(CollectionByHandleVariables {
                handle: handle.to_string(),
                product_count,
                after,
            })
            .await?;

        let collection = data
            .collection
            .map(convert_collection)
            .ok_or_else(|| ShopifyError::NotFound(format!("Collection not found: {handle}")))?;

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::Collection(Box::new(collection.clone())),
            )
            .await;

        Ok(collection)
    }

    /// Get a paginated list of collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_collections(
        &self,
        first: Option<i64>,
        after: Option<String>,
        query: Option<String>,
    ) -> Result<CollectionConnection, ShopifyError> {
        let first = first.unwrap_or(DEFAULT_PAGE_SIZE);
        let cache_key = format!("collections:{first}:{}", after.as_deref().unwrap_or(""));

        if query.is_none()
            && let Some(CacheValue::Collections(collections)) =
                self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for collections");
            return Ok(collections);
        }

        let is_search = query.is_some();
        let data = self
            .execute::<GetCollections>(CollectionsVariables {
                first,
                after,
                query,
            })
            .await?;

        let connection = convert_collection_connection(data.collections);

        if !is_search {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Collections(connection.clone()))
                .await;
        }

        Ok(connection)
    }

    /// Search collections by title.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_collections(
        &self,
        query: &str,
        first: i64,
    ) -> Result<CollectionConnection, ShopifyError> {
        let Some(filter) = title_filter(query) else {
            return Ok(CollectionConnection::default());
        };
        self.get_collections(Some(first), None, Some(filter)).await
    }

    // =========================================================================
    // Navigation and Content Methods
    // =========================================================================

    /// Get a navigation menu by handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the menu does not exist or the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_menu(&self, handle: &str) -> Result<Menu, ShopifyError> {
        let cache_key = format!("menu:{handle}");

        if let Some(CacheValue::Menu(menu)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for menu");
            return Ok(*menu);
        }

        let data = self
            .execute::<GetMenu>(HandleVariables {
                handle: handle.to_string(),
            })
            .await?;

        let menu = data
            .menu
            .map(convert_menu)
            .ok_or_else(|| ShopifyError::NotFound(format!("Menu not found: {handle}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Menu(Box::new(menu.clone())))
            .await;

        Ok(menu)
    }

    /// Get the newest blog articles across all blogs.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_articles(
        &self,
        first: Option<i64>,
        after: Option<String>,
    ) -> Result<ArticleConnection, ShopifyError> {
        let first = first.unwrap_or(DEFAULT_PAGE_SIZE);
        let cache_key = format!("articles:{first}:{}", after.as_deref().unwrap_or(""));

        if let Some(CacheValue::Articles(articles)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for articles");
            return Ok(articles);
        }

        let data = self
            .execute::<GetArticles>(ArticlesVariables { first, after })
            .await?;

        let connection = convert_article_connection(data.articles);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Articles(connection.clone()))
            .await;

        Ok(connection)
    }

    /// Get a single article from a blog.
    ///
    /// # Errors
    ///
    /// Returns an error if the blog or article does not exist or the API
    /// request fails.
    #[instrument(skip(self), fields(blog = %blog, handle = %handle))]
    pub async fn get_article(&self, blog: &str, handle: &str) -> Result<Article, ShopifyError> {
        let cache_key = format!("article:{blog}:{handle}");

        if let Some(CacheValue::Article(article)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for article");
            return Ok(*article);
        }

        let data = self
            .execute::<GetArticle>(ArticleVariables {
                blog: blog.to_string(),
                handle: handle.to_string(),
            })
            .await?;

        let mut article = data
            .blog
            .and_then(|b| b.article_by_handle)
            .map(convert_article)
            .ok_or_else(|| ShopifyError::NotFound(format!("Article not found: {blog}/{handle}")))?;

        if article.blog_handle.is_empty() {
            article.blog_handle = blog.to_string();
        }

        self.inner
            .cache
            .insert(cache_key, CacheValue::Article(Box::new(article.clone())))
            .await;

        Ok(article)
    }

    /// Shop name, used as a readiness probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn shop_name(&self) -> Result<String, ShopifyError> {
        let data = self.execute::<GetShop>(NoVariables {}).await?;
        Ok(data.shop.name)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Create a new cart, optionally with initial lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<CreateCart>(CreateCartVariables {
                input: CartInput { lines },
            })
            .await?;

        unwrap_cart_payload(data.cart_create, "Failed to create cart")
    }

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is not found or the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &str) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<GetCart>(CartIdVariables {
                cart_id: cart_id.to_string(),
            })
            .await?;

        data.cart
            .map(convert_cart)
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn add_to_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<AddToCart>(AddToCartVariables {
                cart_id: cart_id.to_string(),
                lines,
            })
            .await?;

        unwrap_cart_payload(data.cart_lines_add, "Failed to add to cart")
    }

    /// Update cart line quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn update_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<UpdateCartLines>(UpdateCartLinesVariables {
                cart_id: cart_id.to_string(),
                lines,
            })
            .await?;

        unwrap_cart_payload(data.cart_lines_update, "Failed to update cart")
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id))]
    pub async fn remove_from_cart(
        &self,
        cart_id: &str,
        line_ids: Vec<String>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<RemoveFromCart>(RemoveFromCartVariables {
                cart_id: cart_id.to_string(),
                line_ids,
            })
            .await?;

        unwrap_cart_payload(data.cart_lines_remove, "Failed to remove from cart")
    }

    /// Replace the discount codes on a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, discount_codes), fields(cart_id = %cart_id))]
    pub async fn update_discount_codes(
        &self,
        cart_id: &str,
        discount_codes: Vec<String>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<UpdateCartDiscountCodes>(DiscountCodesVariables {
                cart_id: cart_id.to_string(),
                discount_codes,
            })
            .await?;

        unwrap_cart_payload(
            data.cart_discount_codes_update,
            "Failed to update discount codes",
        )
    }

    // =========================================================================
    // Customer Methods (not cached)
    // =========================================================================

    /// Exchange email and password for a customer access token.
    ///
    /// # Errors
    ///
    /// Returns `UserError` for bad credentials, or an error if the request fails.
    #[instrument(skip(self, email, password))]
    pub async fn customer_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CustomerAccessToken, ShopifyError> {
        let data = self
            .execute::<CustomerAccessTokenCreate>(AccessTokenCreateVariables {
                input: CustomerAccessTokenCreateInput {
                    email: email.to_string(),
                    password: password.to_string(),
                },
            })
            .await?;

        let payload = data.customer_access_token_create.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError::message("Failed to log in")])
        })?;

        if let Some(err) = user_errors(payload.customer_user_errors.into_iter().map(|e| e.message))
        {
            return Err(err);
        }

        payload
            .customer_access_token
            .map(convert_access_token)
            .ok_or_else(|| ShopifyError::UserError("Invalid email or password".to_string()))
    }

    /// Revoke a customer access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or user errors are returned.
    #[instrument(skip(self, access_token))]
    pub async fn customer_logout(&self, access_token: &str) -> Result<(), ShopifyError> {
        let data = self
            .execute::<CustomerAccessTokenDelete>(AccessTokenVariables {
                customer_access_token: access_token.to_string(),
            })
            .await?;

        if let Some(payload) = data.customer_access_token_delete
            && let Some(err) = user_errors(payload.user_errors.into_iter().map(|e| e.message))
        {
            return Err(err);
        }

        Ok(())
    }

    /// Register a new customer. Returns the new customer ID.
    ///
    /// # Errors
    ///
    /// Returns `UserError` when Shopify rejects the input (e.g. email taken).
    #[instrument(skip(self, input))]
    pub async fn customer_register(
        &self,
        input: CustomerCreateInput,
    ) -> Result<String, ShopifyError> {
        let data = self
            .execute::<CustomerCreate>(CustomerCreateVariables { input })
            .await?;

        let payload = data.customer_create.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError::message("Failed to create customer")])
        })?;

        if let Some(err) = user_errors(payload.customer_user_errors.into_iter().map(|e| e.message))
        {
            return Err(err);
        }

        payload.customer.map(|c| c.id).ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError::message("Failed to create customer")])
        })
    }

    /// Fetch the customer behind an access token, with loyalty metafields and
    /// recent orders.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the token is invalid or expired.
    #[instrument(skip(self, access_token))]
    pub async fn get_customer(&self, access_token: &str) -> Result<Customer, ShopifyError> {
        let data = self
            .execute::<GetCustomer>(CustomerVariables {
                customer_access_token: access_token.to_string(),
                order_count: RECENT_ORDER_COUNT,
            })
            .await?;

        data.customer
            .map(convert_customer)
            .ok_or_else(|| ShopifyError::NotFound("Customer session expired".to_string()))
    }
}

/// Shopify search filter matching titles that contain every word of `query`.
///
/// Characters with a meaning in the search syntax are dropped; `None` when
/// nothing searchable is left.
fn title_filter(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .map(|word| format!("title:*{word}*"))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" AND "))
    }
}

/// Turn a cart mutation payload into a cart, surfacing user errors.
fn unwrap_cart_payload(payload: Option<CartPayload>, failure: &str) -> Result<Cart, ShopifyError> {
    if let Some(result) = payload {
        if let Some(err) = user_errors(result.user_errors.into_iter().map(|e| e.message)) {
            return Err(err);
        }

        if let Some(cart) = result.cart {
            return Ok(convert_cart(cart));
        }
    }

    Err(ShopifyError::GraphQL(vec![GraphQLError::message(failure)]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Json, Router, http::HeaderMap, routing::post};
    use serde_json::{Value, json};

    use super::*;
    use crate::test_support;

    async fn graphql_mock(headers: HeaderMap, Json(body): Json<Value>) -> axum::response::Response {
        use axum::response::IntoResponse;

        if headers
            .get("Shopify-Storefront-Private-Token")
            .and_then(|v| v.to_str().ok())
            != Some(test_support::STOREFRONT_TOKEN)
        {
            return (axum::http::StatusCode::UNAUTHORIZED, "bad token").into_response();
        }

        let response = match body["operationName"].as_str().unwrap_or_default() {
            "GetProductByHandle" if body["variables"]["handle"] == "missing" => {
                json!({"data": {"product": null}})
            }
            "GetProductByHandle" => json!({"data": {"product": {
                "id": "gid://shopify/Product/1",
                "handle": body["variables"]["handle"],
                "title": "Lavender Candle"
            }}}),
            "AddToCart" => json!({"data": {"cartLinesAdd": {
                "cart": null,
                "userErrors": [
                    {"field": ["lines"], "message": "Variant is sold out"},
                    {"field": null, "message": "Limit reached"}
                ]
            }}}),
            "GetShop" => json!({"errors": [{"message": "Throttled"}]}),
            "GetMenu" => {
                return (
                    axum::http::StatusCode::TOO_MANY_REQUESTS,
                    [("Retry-After", "7")],
                    "slow down",
                )
                    .into_response();
            }
            _ => json!({"data": null}),
        };
        Json(response).into_response()
    }

    async fn client() -> StorefrontClient {
        let base = test_support::spawn_mock(Router::new().route(
            "/api/2026-01/graphql.json",
            post(graphql_mock),
        ))
        .await;
        StorefrontClient::new(&test_support::config(&base).shopify)
    }

    #[test]
    fn test_title_filter() {
        assert_eq!(title_filter("candles").as_deref(), Some("title:*candles*"));
        assert_eq!(
            title_filter("  gift   boxes ").as_deref(),
            Some("title:*gift* AND title:*boxes*")
        );
        assert_eq!(
            title_filter("mother's day (new)").as_deref(),
            Some("title:*mothers* AND title:*day* AND title:*new*")
        );
        assert_eq!(title_filter(" * : ( ) "), None);
        assert_eq!(title_filter(""), None);
    }

    #[tokio::test]
    async fn test_get_product_by_handle() {
        let client = client().await;
        let product = client.get_product_by_handle("lavender-candle").await.unwrap();
        assert_eq!(product.title, "Lavender Candle");

        // Second read comes from the cache
        let cached = client.get_product_by_handle("lavender-candle").await.unwrap();
        assert_eq!(cached.id, product.id);
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let err = client().await.get_product_by_handle("missing").await.unwrap_err();
        assert!(matches!(err, ShopifyError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cart_user_errors_are_joined() {
        let err = client()
            .await
            .add_to_cart("gid://shopify/Cart/1", vec![])
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "User error: Variant is sold out; Limit reached"
        );
    }

    #[tokio::test]
    async fn test_graphql_errors_surface() {
        let err = client().await.shop_name().await.unwrap_err();
        assert_eq!(err.to_string(), "GraphQL errors: Throttled");
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let err = client().await.get_menu("main-menu").await.unwrap_err();
        assert!(matches!(err, ShopifyError::RateLimited(7)));
    }

    #[tokio::test]
    async fn test_missing_data_is_error() {
        let err = client().await.get_cart("gid://shopify/Cart/1").await.unwrap_err();
        assert!(matches!(err, ShopifyError::GraphQL(_)));
    }
}
