//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness
//! GET  /health/ready                - Readiness (probes Shopify)
//! GET  /robots.txt                  - Robots file
//! GET  /sitemap.xml                 - Sitemap
//! GET  /checkout                    - Redirect to Shopify checkout
//! POST /invoice                     - Printable HTML invoice
//!
//! # Catalog
//! GET  /api/products                - Product listing (?after=&q=&sort=&reverse=)
//! GET  /api/products/{handle}       - Product detail
//! GET  /api/collections             - Collection listing (?after=)
//! GET  /api/collections/{handle}    - Collection with products (?after=)
//! GET  /api/menus/{handle}          - Navigation menu
//! GET  /api/blog                    - Articles (?after=)
//! GET  /api/blog/{blog}/{article}   - Article
//! GET  /api/search                  - Product and collection search (?q=)
//!
//! # Cart
//! GET  /api/cart                    - Cart
//! GET  /api/cart/count              - Item count
//! POST /api/cart/add                - Add lines
//! POST /api/cart/update             - Set line quantity (0 removes)
//! POST /api/cart/remove             - Remove a line
//! POST /api/cart/discount-codes     - Replace discount codes
//!
//! # Currency
//! GET  /api/currency-rates          - Rate table (CDN cacheable)
//! POST /api/currency                - Set display currency
//! GET  /api/currency/convert        - Convert an amount (?amount=&from=&to=)
//!
//! # Gift builder
//! GET  /api/gift-builder            - Wizard state and total
//! GET  /api/gift-builder/boxes      - Available boxes
//! GET  /api/gift-builder/products   - Products that fit in a box
//! POST /api/gift-builder/box        - Choose a box
//! POST /api/gift-builder/products   - Add a product
//! DELETE /api/gift-builder/products/{handle} - Remove a product
//! POST /api/gift-builder/message    - Set the gift message
//! POST /api/gift-builder/next       - Next step
//! POST /api/gift-builder/back       - Previous step
//! POST /api/gift-builder/reset      - Start over
//! POST /api/gift-builder/add-to-cart - Put the finished box in the cart
//!
//! # Tracking, invoice, account
//! POST /api/tracking                - Track a shipment
//! POST /api/invoice                 - Validate and total an invoice
//! GET  /api/invoice/cart            - Invoice totals for the cart
//! POST /api/account/login           - Log in (rate limited)
//! POST /api/account/register        - Register (rate limited)
//! POST /api/account/logout          - Log out
//! GET  /api/account                 - Customer and recent orders
//! DELETE /api/account               - Delete the account
//! GET  /api/account/loyalty         - Loyalty points and tier
//! ```

pub mod account;
pub mod cart;
pub mod collections;
pub mod content;
pub mod currency;
pub mod gift_builder;
pub mod health;
pub mod invoice;
pub mod products;
pub mod search;
pub mod seo;
pub mod tracking;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Catalog and content routes.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{handle}", get(products::show))
        .route("/collections", get(collections::index))
        .route("/collections/{handle}", get(collections::show))
        .route("/menus/{handle}", get(content::menu))
        .route("/blog", get(content::articles))
        .route("/blog/{blog}/{article}", get(content::article))
        .route("/search", get(search::search))
}

/// Cart routes.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/discount-codes", post(cart::discount_codes))
}

/// Currency routes.
pub fn currency_routes() -> Router<AppState> {
    Router::new()
        .route("/currency-rates", get(currency::rates))
        .route("/currency", post(currency::set_currency))
        .route("/currency/convert", get(currency::convert))
}

/// Gift builder routes.
pub fn gift_builder_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(gift_builder::show))
        .route("/boxes", get(gift_builder::boxes))
        .route(
            "/products",
            get(gift_builder::products).post(gift_builder::add_product),
        )
        .route("/products/{handle}", delete(gift_builder::remove_product))
        .route("/box", post(gift_builder::select_box))
        .route("/message", post(gift_builder::set_message))
        .route("/next", post(gift_builder::next))
        .route("/back", post(gift_builder::back))
        .route("/reset", post(gift_builder::reset))
        .route("/add-to-cart", post(gift_builder::add_to_cart))
}

/// Account routes. Login and registration get their own stricter limiter.
pub fn account_routes(rate_limit: bool) -> Router<AppState> {
    let mut credentials = Router::new()
        .route("/login", post(account::login))
        .route("/register", post(account::register));
    if rate_limit {
        credentials = credentials.layer(auth_rate_limiter());
    }

    Router::new()
        .route("/", get(account::show).delete(account::delete))
        .route("/logout", post(account::logout))
        .route("/loyalty", get(account::loyalty))
        .merge(credentials)
}

/// Everything under `/api`.
pub fn api_routes(rate_limit: bool) -> Router<AppState> {
    let api = Router::new()
        .merge(catalog_routes())
        .merge(currency_routes())
        .nest("/cart", cart_routes())
        .nest("/gift-builder", gift_builder_routes())
        .nest("/account", account_routes(rate_limit))
        .route("/tracking", post(tracking::track))
        .route("/invoice", post(invoice::totals))
        .route("/invoice/cart", get(invoice::cart_totals));

    if rate_limit {
        api.layer(api_rate_limiter())
    } else {
        api
    }
}

/// Create all routes for the storefront.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/robots.txt", get(seo::robots))
        .route("/sitemap.xml", get(seo::sitemap))
        .route("/checkout", get(cart::checkout))
        .route("/invoice", post(invoice::render))
        .nest("/api", api_routes(rate_limit))
}
