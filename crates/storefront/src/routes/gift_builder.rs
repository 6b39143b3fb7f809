//! Gift builder wizard routes.
//!
//! Every mutation loads the wizard from the session, applies one transition
//! and writes it back, then answers with the full wizard view.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument};
use uuid::Uuid;

use super::cart::{self, CartView};
use super::currency::DisplayCurrency;
use crate::error::{Result, add_breadcrumb};
use crate::models::session;
use crate::services::gift_builder::{GiftBox, GiftBuilderState, GiftProduct};
use crate::state::AppState;

/// Wizard state plus derived values for rendering.
#[derive(Debug, Serialize)]
pub struct GiftBuilderView {
    #[serde(flatten)]
    pub state: GiftBuilderState,
    pub step_complete: bool,
    /// Free slots left in the chosen box.
    pub remaining: Option<u32>,
    pub display_total: Option<String>,
}

/// Body naming a box or product.
#[derive(Debug, Deserialize)]
pub struct HandleRequest {
    pub handle: String,
}

/// Body of `POST /api/gift-builder/message`.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub message: String,
}

async fn respond(
    state: &AppState,
    session: &Session,
    wizard: GiftBuilderState,
) -> Result<Json<GiftBuilderView>> {
    let display = DisplayCurrency::load(state, session).await?;
    let remaining = wizard.selected_box.as_ref().map(|b| {
        b.capacity
            .saturating_sub(u32::try_from(wizard.products.len()).unwrap_or(u32::MAX))
    });
    let display_total = wizard
        .total_price(state.gift_builder().bundle_discount())
        .map(|total| display.price(&total));

    Ok(Json(GiftBuilderView {
        step_complete: wizard.step_complete(),
        remaining,
        display_total,
        state: wizard,
    }))
}

/// Apply `change` to the session's wizard, persist it and respond.
async fn update<F>(state: &AppState, session: &Session, change: F) -> Result<Json<GiftBuilderView>>
where
    F: FnOnce(&mut GiftBuilderState) -> Result<()>,
{
    let mut wizard = session::gift_builder(session).await?;
    change(&mut wizard)?;
    session::set_gift_builder(session, &wizard).await?;
    respond(state, session, wizard).await
}

/// GET /api/gift-builder
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<GiftBuilderView>> {
    let wizard = session::gift_builder(&session).await?;
    respond(&state, &session, wizard).await
}

/// GET /api/gift-builder/boxes
#[instrument(skip(state))]
pub async fn boxes(State(state): State<AppState>) -> Result<Json<Vec<GiftBox>>> {
    Ok(Json(state.gift_builder().boxes().await?))
}

/// GET /api/gift-builder/products
#[instrument(skip(state))]
pub async fn products(State(state): State<AppState>) -> Result<Json<Vec<GiftProduct>>> {
    Ok(Json(state.gift_builder().products().await?))
}

/// POST /api/gift-builder/box
#[instrument(skip(state, session))]
pub async fn select_box(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<HandleRequest>,
) -> Result<Json<GiftBuilderView>> {
    let gift_box = state.gift_builder().find_box(&body.handle).await?;
    add_breadcrumb("gift_builder", "Selected box", Some(&[("handle", body.handle.as_str())]));
    update(&state, &session, |wizard| Ok(wizard.select_box(gift_box)?)).await
}

/// POST /api/gift-builder/products
#[instrument(skip(state, session))]
pub async fn add_product(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<HandleRequest>,
) -> Result<Json<GiftBuilderView>> {
    let product = state.gift_builder().find_product(&body.handle).await?;
    update(&state, &session, |wizard| Ok(wizard.add_product(product)?)).await
}

/// DELETE /api/gift-builder/products/{handle}
#[instrument(skip(state, session))]
pub async fn remove_product(
    State(state): State<AppState>,
    session: Session,
    Path(handle): Path<String>,
) -> Result<Json<GiftBuilderView>> {
    update(&state, &session, |wizard| Ok(wizard.remove_product(&handle)?)).await
}

/// POST /api/gift-builder/message
#[instrument(skip(state, session, body))]
pub async fn set_message(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<MessageRequest>,
) -> Result<Json<GiftBuilderView>> {
    update(&state, &session, |wizard| Ok(wizard.set_message(&body.message)?)).await
}

/// POST /api/gift-builder/next
#[instrument(skip(state, session))]
pub async fn next(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<GiftBuilderView>> {
    update(&state, &session, |wizard| {
        wizard.next()?;
        Ok(())
    })
    .await
}

/// POST /api/gift-builder/back
#[instrument(skip(state, session))]
pub async fn back(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<GiftBuilderView>> {
    update(&state, &session, |wizard| {
        wizard.back();
        Ok(())
    })
    .await
}

/// POST /api/gift-builder/reset
#[instrument(skip(state, session))]
pub async fn reset(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<GiftBuilderView>> {
    session::clear_gift_builder(&session).await?;
    respond(&state, &session, GiftBuilderState::default()).await
}

/// POST /api/gift-builder/add-to-cart
///
/// Adds the finished box to the visitor's cart as one bundle and clears the
/// wizard.
#[instrument(skip(state, session))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CartView>> {
    let wizard = session::gift_builder(&session).await?;
    let bundle_id = Uuid::new_v4().to_string();
    let lines = wizard.cart_lines(&bundle_id)?;

    let cart = cart::add_lines(&state, &session, lines).await?;
    session::clear_gift_builder(&session).await?;
    info!(bundle_id = %bundle_id, items = wizard.products.len(), "Gift box added to cart");

    cart::view(&state, &session, Some(cart)).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::test_support::{self, TestResponse};

    async fn post(app: &axum::Router, uri: &str, body: Value, cookie: &str) -> TestResponse {
        test_support::post(app, uri, body, Some(cookie)).await
    }

    /// Start a wizard session with the two-slot kraft box chosen.
    async fn with_kraft_box(app: &axum::Router) -> String {
        let response = test_support::post(
            app,
            "/api/gift-builder/box",
            json!({"handle": "kraft-box"}),
            None,
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);
        response.cookie().unwrap()
    }

    #[tokio::test]
    async fn test_lists_boxes_and_products() {
        let app = test_support::app().await;

        let boxes = test_support::get(&app, "/api/gift-builder/boxes", None).await;
        assert_eq!(boxes.status, StatusCode::OK);
        assert_eq!(boxes.body[0]["handle"], "kraft-box");
        assert_eq!(boxes.body[0]["capacity"], 2);
        assert_eq!(boxes.body[1]["capacity"], 6);
        assert_eq!(boxes.body[1]["available"], false);

        let products = test_support::get(&app, "/api/gift-builder/products", None).await;
        assert_eq!(products.body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_fresh_wizard() {
        let app = test_support::app().await;

        let view = test_support::get(&app, "/api/gift-builder", None).await;
        assert_eq!(view.status, StatusCode::OK);
        assert_eq!(view.body["step"], "choose_box");
        assert_eq!(view.body["step_complete"], false);
        assert!(view.body["display_total"].is_null());
    }

    #[tokio::test]
    async fn test_box_selection_errors() {
        let app = test_support::app().await;

        let unknown = test_support::post(
            &app,
            "/api/gift-builder/box",
            json!({"handle": "crate"}),
            None,
        )
        .await;
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);

        let sold_out = test_support::post(
            &app,
            "/api/gift-builder/box",
            json!({"handle": "tin-box"}),
            None,
        )
        .await;
        assert_eq!(sold_out.status, StatusCode::UNPROCESSABLE_ENTITY);

        let no_box = test_support::post(
            &app,
            "/api/gift-builder/products",
            json!({"handle": "tea-tin"}),
            None,
        )
        .await;
        assert_eq!(no_box.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(no_box.body["error"], "Choose a box first");
    }

    #[tokio::test]
    async fn test_capacity_is_enforced() {
        let app = test_support::app().await;
        let cookie = with_kraft_box(&app).await;

        for handle in ["rose-candle", "tea-tin"] {
            let response =
                post(&app, "/api/gift-builder/products", json!({"handle": handle}), &cookie).await;
            assert_eq!(response.status, StatusCode::OK);
        }

        let full =
            post(&app, "/api/gift-builder/products", json!({"handle": "soap-bar"}), &cookie).await;
        assert_eq!(full.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(full.body["error"], "This box holds at most 2 items");

        let removed = test_support::delete(
            &app,
            "/api/gift-builder/products/tea-tin",
            Some(&cookie),
        )
        .await;
        assert_eq!(removed.body["remaining"], 1);
        assert_eq!(removed.body["display_total"], "$32.00");
    }

    #[tokio::test]
    async fn test_steps_and_add_to_cart() {
        let app = test_support::app().await;
        let cookie = with_kraft_box(&app).await;

        let next = post(&app, "/api/gift-builder/next", json!({}), &cookie).await;
        assert_eq!(next.body["step"], "choose_products");

        let blocked = post(&app, "/api/gift-builder/next", json!({}), &cookie).await;
        assert_eq!(blocked.status, StatusCode::UNPROCESSABLE_ENTITY);

        for handle in ["tea-tin", "tea-tin"] {
            post(&app, "/api/gift-builder/products", json!({"handle": handle}), &cookie).await;
        }
        let view = post(&app, "/api/gift-builder/next", json!({}), &cookie).await;
        assert_eq!(view.body["step"], "message");
        assert_eq!(view.body["display_total"], "$29.00");

        let message = post(
            &app,
            "/api/gift-builder/message",
            json!({"message": "  Happy birthday!  "}),
            &cookie,
        )
        .await;
        assert_eq!(message.body["message"], "Happy birthday!");

        let back = post(&app, "/api/gift-builder/back", json!({}), &cookie).await;
        assert_eq!(back.body["step"], "choose_products");

        let cart = post(&app, "/api/gift-builder/add-to-cart", json!({}), &cookie).await;
        assert_eq!(cart.status, StatusCode::OK);
        let lines = cart.body["lines"].as_array().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["merchandise"]["id"], "gid://shopify/ProductVariant/kraft-box");
        assert_eq!(lines[1]["quantity"], 2);

        let box_attrs = &lines[0]["attributes"];
        assert!(box_attrs.as_array().unwrap().contains(&json!({"key": "_bundle_role", "value": "box"})));
        assert!(box_attrs
            .as_array()
            .unwrap()
            .contains(&json!({"key": "Gift message", "value": "Happy birthday!"})));
        assert_eq!(
            lines[0]["attributes"][0]["value"],
            lines[1]["attributes"][0]["value"]
        );

        let cleared = test_support::get(&app, "/api/gift-builder", Some(&cookie)).await;
        assert_eq!(cleared.body["step"], "choose_box");
        assert!(cleared.body["selected_box"].is_null());
    }

    #[tokio::test]
    async fn test_add_to_cart_requires_products() {
        let app = test_support::app().await;
        let cookie = with_kraft_box(&app).await;

        let response = post(&app, "/api/gift-builder/add-to-cart", json!({}), &cookie).await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_reset() {
        let app = test_support::app().await;
        let cookie = with_kraft_box(&app).await;

        let reset = post(&app, "/api/gift-builder/reset", json!({}), &cookie).await;
        assert!(reset.body["selected_box"].is_null());
    }
}
