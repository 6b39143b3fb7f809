//! Integration tests for the storefront API.
//!
//! These tests require:
//! - The storefront running (cargo run -p boxcraft-storefront)
//! - A Shopify store with `gift-boxes` and `gift-products` collections
//!
//! Run with: cargo test -p boxcraft-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use boxcraft_integration_tests::{session_client, storefront_base_url};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn get_json(client: &reqwest::Client, path: &str) -> (StatusCode, Value) {
    let resp = client
        .get(format!("{}{path}", storefront_base_url()))
        .send()
        .await
        .expect("Request failed");
    let status = resp.status();
    (status, resp.json().await.unwrap_or(Value::Null))
}

async fn post_json(client: &reqwest::Client, path: &str, body: &Value) -> (StatusCode, Value) {
    let resp = client
        .post(format!("{}{path}", storefront_base_url()))
        .json(body)
        .send()
        .await
        .expect("Request failed");
    let status = resp.status();
    (status, resp.json().await.unwrap_or(Value::Null))
}

// ============================================================================
// Health & SEO
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_health() {
    let client = session_client();
    let resp = client
        .get(format!("{}/health", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let ready = client
        .get(format!("{}/health/ready", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_robots_and_sitemap() {
    let client = session_client();

    let robots = client
        .get(format!("{}/robots.txt", storefront_base_url()))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(robots.contains("Disallow: /api/"));
    assert!(robots.contains("/sitemap.xml"));

    let sitemap = client
        .get(format!("{}/sitemap.xml", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(sitemap.status(), StatusCode::OK);
    assert!(sitemap.text().await.unwrap().contains("<urlset"));
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and Shopify credentials"]
async fn test_products_and_collections() {
    let client = session_client();

    let (status, products) = get_json(&client, "/api/products").await;
    assert_eq!(status, StatusCode::OK);
    let first = products["products"][0]["handle"]
        .as_str()
        .expect("store has at least one product")
        .to_string();

    let (status, product) = get_json(&client, &format!("/api/products/{first}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(product["display_price"].is_string());

    let (status, _) = get_json(&client, "/api/products/this-product-does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, collections) = get_json(&client, "/api/collections").await;
    assert_eq!(status, StatusCode::OK);
    assert!(collections["collections"].is_array());
}

#[tokio::test]
#[ignore = "Requires running storefront and Shopify credentials"]
async fn test_search() {
    let client = session_client();
    let (status, results) = get_json(&client, "/api/search?q=gift").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["query"], "gift");
    assert!(results["products"].is_array());
}

// ============================================================================
// Currency
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_currency_rates_and_selection() {
    let client = session_client();

    let resp = client
        .get(format!("{}/api/currency-rates", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("cache-control").unwrap(),
        "public, s-maxage=3600"
    );

    let (status, body) = post_json(&client, "/api/currency", &json!({"currency": "EUR"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currency"], "EUR");

    let (_, cart) = get_json(&client, "/api/cart").await;
    assert!(cart["display_total"].as_str().unwrap().starts_with('€'));
}

// ============================================================================
// Cart & Gift builder
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and Shopify credentials"]
async fn test_gift_box_to_checkout() {
    let client = session_client();

    let (_, boxes) = get_json(&client, "/api/gift-builder/boxes").await;
    let gift_box = boxes
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["available"] == true)
        .expect("store has an available gift box");
    let (status, _) = post_json(
        &client,
        "/api/gift-builder/box",
        &json!({"handle": gift_box["handle"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, products) = get_json(&client, "/api/gift-builder/products").await;
    let product = products
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["available"] == true)
        .expect("store has an available gift product");
    let (status, view) = post_json(
        &client,
        "/api/gift-builder/products",
        &json!({"handle": product["handle"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["step_complete"], false);

    let (status, cart) = post_json(&client, "/api/gift-builder/add-to-cart", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cart["item_count"].as_i64().unwrap() >= 2);

    let checkout = client
        .get(format!("{}/checkout", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(checkout.status(), StatusCode::SEE_OTHER);
    assert!(
        checkout.headers()["location"]
            .to_str()
            .unwrap()
            .starts_with("https://")
    );
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_empty_checkout_redirects_home() {
    let client = session_client();
    let resp = client
        .get(format!("{}/checkout", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/");
}

// ============================================================================
// Invoice & Tracking
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_invoice_totals() {
    let client = session_client();
    let (status, body) = post_json(
        &client,
        "/api/invoice",
        &json!({
            "customer": {"name": "Ada Buyer", "email": "ada@example.com"},
            "lines": [{"description": "Kraft box", "quantity": 1, "unit_price": "10.00"}]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let amount = |key: &str| -> boxcraft_core::Price {
        boxcraft_core::Price::from_shopify(body[key].as_str().unwrap(), "USD").unwrap()
    };
    assert_eq!(amount("total").amount, amount("subtotal").amount + amount("tax").amount);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_tracking_rejects_bad_numbers() {
    let client = session_client();
    let (status, body) =
        post_json(&client, "/api/tracking", &json!({"trackingNumber": "no"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid tracking number");
}

// ============================================================================
// Account
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_account_requires_login() {
    let client = session_client();
    let (status, _) = get_json(&client, "/api/account").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_json(&client, "/api/account/loyalty").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
