//! Shared test fixtures: upstream mocks on ephemeral ports, a config that
//! points every client at them, and helpers to drive the router.

#![allow(clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::Path,
    http::{HeaderMap, Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing,
};
use boxcraft_core::CurrencyCode;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::Session;

use crate::config::{
    CurrencyConfig, GiftBuilderConfig, InvoiceConfig, ShopifyConfig, StorefrontConfig,
    TrackingConfig,
};
use crate::middleware::session::session_store;
use crate::state::AppState;

pub const STOREFRONT_TOKEN: &str = "shpat_sf_7Qm2vX9kLp4Rt8Wz1Hn6Jc3Bd5Gy0Fe";
pub const ADMIN_TOKEN: &str = "shpat_ad_K4nV8sQ2wE6rT1yU9iO3pA7lZ5xC0mB";
pub const CURRENCY_KEY: &str = "cur_live_Tg5Hj8Kl2Qw9Er4Ty7Ui1Op6As3Df0Zx";
pub const SHIP24_KEY: &str = "apik_Nb3Vc6Xz9Lk2Jh5Gf8Ds1Aq4Wr7Ey0Tu";

/// Password the mock accepts for any email.
pub const CUSTOMER_PASSWORD: &str = "correct-horse-battery";
/// Access token the mock issues on login.
pub const CUSTOMER_TOKEN: &str = "customer-token-1";

/// Serve `router` on an ephemeral local port; returns its base URL.
pub async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Config with every upstream at `base`.
pub fn config(base: &str) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        rate_limit: false,
        shopify: ShopifyConfig {
            store: "test.myshopify.com".to_string(),
            api_base: base.to_string(),
            api_version: "2026-01".to_string(),
            storefront_token: SecretString::from(STOREFRONT_TOKEN),
            admin_token: Some(SecretString::from(ADMIN_TOKEN)),
        },
        currency: CurrencyConfig {
            api_key: Some(SecretString::from(CURRENCY_KEY)),
            api_url: format!("{base}/v3/latest"),
            base_currency: CurrencyCode::USD,
            cache_ttl: Duration::from_secs(3600),
        },
        tracking: TrackingConfig {
            api_key: Some(SecretString::from(SHIP24_KEY)),
            api_url: base.to_string(),
            poll_delay: Duration::ZERO,
        },
        invoice: InvoiceConfig {
            tax_rate: Decimal::new(18, 2),
            seller_name: "Boxcraft".to_string(),
            seller_address: Some("1 Market St, Springfield".to_string()),
        },
        gift_builder: GiftBuilderConfig {
            box_collection: "gift-boxes".to_string(),
            products_collection: "gift-products".to_string(),
            bundle_discount: Decimal::ZERO,
            default_capacity: 6,
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

// =============================================================================
// Router driving
// =============================================================================

/// Application router backed by a fresh upstream mock.
pub async fn app() -> Router {
    let base = spawn_upstream().await;
    app_with(config(&base))
}

pub fn app_with(config: StorefrontConfig) -> Router {
    crate::app(AppState::new(config).unwrap())
}

/// State backed by a fresh upstream mock, for calling helpers directly.
pub async fn state() -> AppState {
    let base = spawn_upstream().await;
    AppState::new(config(&base)).unwrap()
}

/// A standalone in-memory session.
pub fn session() -> Session {
    Session::new(None, Arc::new(session_store()), None)
}

/// Status, headers and body (JSON, or `Value::String` for anything else).
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Session cookie to send on the next request.
    pub fn cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(String::from)
    }

    pub fn text(&self) -> &str {
        self.body.as_str().unwrap_or_default()
    }
}

/// Send one request through `app`, optionally with a JSON body and a
/// session cookie.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    json: Option<Value>,
    cookie: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match json {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), 4 * 1024 * 1024)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> TestResponse {
    send(app, Method::GET, uri, None, cookie).await
}

pub async fn post(app: &Router, uri: &str, json: Value, cookie: Option<&str>) -> TestResponse {
    send(app, Method::POST, uri, Some(json), cookie).await
}

pub async fn delete(app: &Router, uri: &str, cookie: Option<&str>) -> TestResponse {
    send(app, Method::DELETE, uri, None, cookie).await
}

// =============================================================================
// Upstream mock
// =============================================================================

/// Serve a mock of every upstream (Shopify Storefront and Admin,
/// currencyapi, ship24); returns its base URL.
pub async fn spawn_upstream() -> String {
    spawn_mock(
        Router::new()
            .route("/api/2026-01/graphql.json", routing::post(storefront_graphql))
            .route("/admin/api/2026-01/graphql.json", routing::post(admin_graphql))
            .route("/v3/latest", routing::get(currency_latest))
            .route("/public/v1/trackers", routing::post(create_tracker))
            .route("/public/v1/trackers/{id}/results", routing::get(tracker_results)),
    )
    .await
}

fn money(amount: &str) -> Value {
    json!({"amount": amount, "currencyCode": "USD"})
}

/// A product node with a single variant `gid://shopify/ProductVariant/{handle}`.
pub fn product_node(handle: &str, title: &str, price: &str, tags: &[&str], available: bool) -> Value {
    json!({
        "id": format!("gid://shopify/Product/{handle}"),
        "handle": handle,
        "title": title,
        "description": format!("{title} description"),
        "descriptionHtml": format!("<p>{title} description</p>"),
        "availableForSale": available,
        "productType": "Gift",
        "vendor": "Boxcraft",
        "tags": tags,
        "updatedAt": "2026-01-10T00:00:00Z",
        "seo": {"title": null, "description": null},
        "priceRange": {"minVariantPrice": money(price), "maxVariantPrice": money(price)},
        "featuredImage": {"url": format!("https://cdn.shopify.com/{handle}.jpg"), "altText": title},
        "images": {"nodes": []},
        "variants": {"nodes": [{
            "id": format!("gid://shopify/ProductVariant/{handle}"),
            "title": "Default Title",
            "availableForSale": available,
            "price": money(price),
            "selectedOptions": []
        }]}
    })
}

fn collection_node(handle: &str, title: &str, products: Vec<Value>) -> Value {
    json!({
        "id": format!("gid://shopify/Collection/{handle}"),
        "handle": handle,
        "title": title,
        "description": "",
        "updatedAt": "2026-01-05T00:00:00Z",
        "products": {"nodes": products, "pageInfo": {"hasNextPage": false}}
    })
}

fn cart_line(id: &str, variant: &str, quantity: i64, price: &str, attributes: &Value) -> Value {
    let each: Decimal = price.parse().unwrap();
    let total = (each * Decimal::from(quantity)).to_string();
    json!({
        "id": id,
        "quantity": quantity,
        "attributes": attributes,
        "cost": {
            "amountPerQuantity": money(price),
            "subtotalAmount": money(&total),
            "totalAmount": money(&total)
        },
        "merchandise": {
            "id": variant,
            "title": "Default Title",
            "price": money(price),
            "product": {"id": "gid://shopify/Product/rose-candle", "handle": "rose-candle", "title": "Rose Candle", "vendor": "Boxcraft"}
        }
    })
}

fn cart_node(id: &str, lines: Vec<Value>, codes: &[(&str, bool)]) -> Value {
    let mut subtotal = Decimal::ZERO;
    let mut quantity = 0;
    for line in &lines {
        subtotal += line["cost"]["totalAmount"]["amount"]
            .as_str()
            .unwrap()
            .parse::<Decimal>()
            .unwrap();
        quantity += line["quantity"].as_i64().unwrap();
    }
    json!({
        "id": id,
        "checkoutUrl": "https://test.myshopify.com/cart/c/abc",
        "totalQuantity": quantity,
        "cost": {
            "subtotalAmount": money(&subtotal.to_string()),
            "totalAmount": money(&subtotal.to_string()),
            "totalTaxAmount": null
        },
        "discountCodes": codes.iter().map(|(code, ok)| json!({"code": code, "applicable": ok})).collect::<Vec<_>>(),
        "lines": {"nodes": lines}
    })
}

/// The cart every existing cart id resolves to: two rose candles.
fn existing_cart(id: &str) -> Value {
    cart_node(
        id,
        vec![cart_line(
            "gid://shopify/CartLine/1",
            "gid://shopify/ProductVariant/rose-candle",
            2,
            "22.00",
            &json!([]),
        )],
        &[],
    )
}

fn lines_from_input(lines: &Value) -> Vec<Value> {
    lines
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, line)| {
            cart_line(
                &format!("gid://shopify/CartLine/new-{i}"),
                line["merchandiseId"].as_str().unwrap_or_default(),
                line["quantity"].as_i64().unwrap_or(1),
                "10.00",
                &line.get("attributes").cloned().unwrap_or_else(|| json!([])),
            )
        })
        .collect()
}

/// Mutation response for a cart id Shopify does not know.
fn missing_cart(field: &str) -> Response {
    Json(json!({"data": {field: {
        "cart": null,
        "userErrors": [{"message": "The specified cart does not exist."}]
    }}}))
    .into_response()
}

fn cart_payload(field: &str, cart: Value) -> Value {
    json!({"data": {field: {"cart": cart, "userErrors": []}}})
}

#[allow(clippy::too_many_lines)]
async fn storefront_graphql(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers
        .get("Shopify-Storefront-Private-Token")
        .and_then(|v| v.to_str().ok())
        != Some(STOREFRONT_TOKEN)
    {
        return (StatusCode::UNAUTHORIZED, "bad token").into_response();
    }

    let vars = &body["variables"];
    let operation = body["operationName"].as_str().unwrap_or_default();

    let response = match operation {
        "GetProducts" => {
            let nodes = if vars["query"].is_string() {
                vec![product_node("rose-candle", "Rose Candle", "22.00", &[], true)]
            } else if vars["after"].is_string() {
                vec![]
            } else {
                vec![
                    product_node("rose-candle", "Rose Candle", "22.00", &[], true),
                    product_node("tea-tin", "Tea Tin", "9.50", &[], true),
                ]
            };
            json!({"data": {"products": {
                "nodes": nodes,
                "pageInfo": {"hasNextPage": vars["after"].is_null(), "endCursor": "cursor-2"}
            }}})
        }
        "GetProductByHandle" => match vars["handle"].as_str().unwrap_or_default() {
            "missing" => json!({"data": {"product": null}}),
            handle => json!({"data": {"product": product_node(handle, "Rose Candle", "22.00", &[], true)}}),
        },
        "GetCollections" => {
            let mut nodes = vec![collection_node("candles", "Candles", vec![])];
            if vars["query"].is_null() {
                nodes.push(collection_node("gift-boxes", "Gift Boxes", vec![]));
            }
            json!({"data": {"collections": {"nodes": nodes, "pageInfo": {"hasNextPage": false}}}})
        }
        "GetCollectionByHandle" => match vars["handle"].as_str().unwrap_or_default() {
            "gift-boxes" => json!({"data": {"collection": collection_node("gift-boxes", "Gift Boxes", vec![
                product_node("kraft-box", "Kraft Box", "10.00", &["capacity:2"], true),
                product_node("tin-box", "Tin Box", "15.00", &[], false),
            ])}}),
            "gift-products" => json!({"data": {"collection": collection_node("gift-products", "Gift Products", vec![
                product_node("rose-candle", "Rose Candle", "22.00", &[], true),
                product_node("tea-tin", "Tea Tin", "9.50", &[], true),
                product_node("soap-bar", "Soap Bar", "6.00", &[], true),
            ])}}),
            "missing" => json!({"data": {"collection": null}}),
            handle => json!({"data": {"collection": collection_node(handle, "Candles", vec![
                product_node("rose-candle", "Rose Candle", "22.00", &[], true),
            ])}}),
        },
        "GetMenu" => match vars["handle"].as_str().unwrap_or_default() {
            "main-menu" => json!({"data": {"menu": {
                "handle": "main-menu",
                "title": "Main menu",
                "items": [
                    {"title": "Shop", "url": "https://test.myshopify.com/collections/all", "type": "COLLECTION", "items": []},
                    {"title": "Journal", "url": "https://test.myshopify.com/blogs/journal", "type": "BLOG", "items": []}
                ]
            }}}),
            _ => json!({"data": {"menu": null}}),
        },
        "GetArticles" => json!({"data": {"articles": {
            "nodes": [{
                "id": "gid://shopify/Article/1",
                "handle": "gift-guide",
                "title": "Gift Guide",
                "excerpt": "Ideas for every occasion",
                "contentHtml": "<p>Ideas</p>",
                "publishedAt": "2026-01-02T00:00:00Z",
                "tags": ["guides"],
                "authorV2": {"name": "Mara"},
                "blog": {"handle": "journal"}
            }],
            "pageInfo": {"hasNextPage": false}
        }}}),
        "GetArticle" => {
            if vars["blog"] == "journal" && vars["handle"] == "gift-guide" {
                json!({"data": {"blog": {"articleByHandle": {
                    "id": "gid://shopify/Article/1",
                    "handle": "gift-guide",
                    "title": "Gift Guide",
                    "contentHtml": "<p>Ideas</p>",
                    "blog": {"handle": "journal"}
                }}}})
            } else {
                json!({"data": {"blog": null}})
            }
        }
        "GetShop" => json!({"data": {"shop": {"name": "Boxcraft"}}}),
        "CreateCart" => cart_payload(
            "cartCreate",
            cart_node("gid://shopify/Cart/new", lines_from_input(&vars["input"]["lines"]), &[]),
        ),
        "GetCart" => {
            let id = vars["cartId"].as_str().unwrap_or_default();
            if id.ends_with("expired") {
                json!({"data": {"cart": null}})
            } else {
                json!({"data": {"cart": existing_cart(id)}})
            }
        }
        "AddToCart" => {
            let id = vars["cartId"].as_str().unwrap_or_default();
            if id.ends_with("expired") {
                return missing_cart("cartLinesAdd");
            }
            let mut cart = existing_cart(id);
            let mut lines = cart["lines"]["nodes"].as_array().cloned().unwrap_or_default();
            lines.extend(lines_from_input(&vars["lines"]));
            cart = cart_node(id, lines, &[]);
            cart_payload("cartLinesAdd", cart)
        }
        "UpdateCartLines" => {
            let id = vars["cartId"].as_str().unwrap_or_default();
            if id.ends_with("expired") {
                return missing_cart("cartLinesUpdate");
            }
            let quantity = vars["lines"][0]["quantity"].as_i64().unwrap_or(1);
            let lines = if quantity == 0 {
                vec![]
            } else {
                vec![cart_line(
                    "gid://shopify/CartLine/1",
                    "gid://shopify/ProductVariant/rose-candle",
                    quantity,
                    "22.00",
                    &json!([]),
                )]
            };
            cart_payload("cartLinesUpdate", cart_node(id, lines, &[]))
        }
        "RemoveFromCart" => {
            let id = vars["cartId"].as_str().unwrap_or_default();
            if id.ends_with("expired") {
                return missing_cart("cartLinesRemove");
            }
            cart_payload("cartLinesRemove", cart_node(id, vec![], &[]))
        }
        "UpdateCartDiscountCodes" => {
            let id = vars["cartId"].as_str().unwrap_or_default();
            if id.ends_with("expired") {
                return missing_cart("cartDiscountCodesUpdate");
            }
            let codes: Vec<(&str, bool)> = vars["discountCodes"]
                .as_array()
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .filter_map(Value::as_str)
                .map(|code| (code, code != "BOGUS"))
                .collect();
            let cart = existing_cart(id);
            let lines = cart["lines"]["nodes"].as_array().cloned().unwrap_or_default();
            cart_payload("cartDiscountCodesUpdate", cart_node(id, lines, &codes))
        }
        "CustomerAccessTokenCreate" => {
            if vars["input"]["password"] == CUSTOMER_PASSWORD {
                json!({"data": {"customerAccessTokenCreate": {
                    "customerAccessToken": {"accessToken": CUSTOMER_TOKEN, "expiresAt": "2099-01-01T00:00:00Z"},
                    "customerUserErrors": []
                }}})
            } else {
                json!({"data": {"customerAccessTokenCreate": {
                    "customerAccessToken": null,
                    "customerUserErrors": [{"field": ["input"], "message": "Unidentified customer", "code": "UNIDENTIFIED_CUSTOMER"}]
                }}})
            }
        }
        "CustomerAccessTokenDelete" => json!({"data": {"customerAccessTokenDelete": {
            "deletedAccessToken": vars["customerAccessToken"],
            "userErrors": []
        }}}),
        "CustomerCreate" => {
            if vars["input"]["email"] == "taken@example.com" {
                json!({"data": {"customerCreate": {
                    "customer": null,
                    "customerUserErrors": [{"field": ["input", "email"], "message": "Email has already been taken", "code": "TAKEN"}]
                }}})
            } else {
                json!({"data": {"customerCreate": {
                    "customer": {"id": "gid://shopify/Customer/7", "email": vars["input"]["email"]},
                    "customerUserErrors": []
                }}})
            }
        }
        "GetCustomer" => {
            if vars["customerAccessToken"] == CUSTOMER_TOKEN {
                json!({"data": {"customer": {
                    "id": "gid://shopify/Customer/7",
                    "email": "ada@example.com",
                    "firstName": "Ada",
                    "lastName": "Buyer",
                    "acceptsMarketing": true,
                    "points": {"value": "750"},
                    "tier": null,
                    "orders": {"nodes": [{
                        "id": "gid://shopify/Order/1",
                        "name": "#1001",
                        "orderNumber": 1001,
                        "processedAt": "2026-01-03T10:00:00Z",
                        "financialStatus": "PAID",
                        "fulfillmentStatus": "FULFILLED",
                        "totalPrice": money("44.00"),
                        "successfulFulfillments": [{
                            "trackingCompany": "UPS",
                            "trackingInfo": [{"number": "1Z999AA10123456784", "url": "https://ups.example/track"}]
                        }]
                    }]}
                }}})
            } else {
                json!({"data": {"customer": null}})
            }
        }
        other => json!({"errors": [{"message": format!("unexpected operation {other}")}]}),
    };

    Json(response).into_response()
}

async fn admin_graphql(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers
        .get("X-Shopify-Access-Token")
        .and_then(|v| v.to_str().ok())
        != Some(ADMIN_TOKEN)
    {
        return (StatusCode::UNAUTHORIZED, "bad token").into_response();
    }
    Json(json!({"data": {"customerDelete": {
        "deletedCustomerId": body["variables"]["id"],
        "userErrors": []
    }}}))
    .into_response()
}

async fn currency_latest(headers: HeaderMap) -> Response {
    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(CURRENCY_KEY) {
        return (StatusCode::UNAUTHORIZED, "invalid key").into_response();
    }
    Json(json!({
        "meta": {"last_updated_at": "2026-01-01T00:00:00Z"},
        "data": {
            "EUR": {"code": "EUR", "value": 0.9},
            "GBP": {"code": "GBP", "value": 0.8},
            "JPY": {"code": "JPY", "value": 150.0}
        }
    }))
    .into_response()
}

async fn create_tracker(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let expected = format!("Bearer {SHIP24_KEY}");
    if headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        != Some(expected.as_str())
    {
        return (StatusCode::UNAUTHORIZED, "bad key").into_response();
    }
    let number = body["trackingNumber"].as_str().unwrap_or_default();
    Json(json!({"data": {"tracker": {"trackerId": format!("trk-{number}")}}})).into_response()
}

async fn tracker_results(Path(id): Path<String>) -> Json<Value> {
    if id == "trk-NOTHING123" {
        return Json(json!({"data": {"trackings": []}}));
    }
    Json(json!({"data": {"trackings": [{
        "shipment": {
            "statusMilestone": "out_for_delivery",
            "originCountryCode": "US",
            "destinationCountryCode": "US"
        },
        "events": [
            {"status": "Out for delivery", "statusMilestone": "out_for_delivery",
             "occurrenceDatetime": "2026-01-23T07:00:00", "courierCode": "ups"}
        ]
    }]}}))
}
