//! Cart route handlers.
//!
//! Cart IDs are stored in the session and mapped to Shopify carts. A cart
//! Shopify no longer knows about (expired or completed) is forgotten and the
//! visitor sees an empty cart.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use boxcraft_core::points_for_purchase;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{instrument, warn};

use super::currency::DisplayCurrency;
use crate::error::{AppError, Result};
use crate::models::session;
use crate::shopify::{
    Cart, CartDiscountCode, CartLine, CartLineInput, CartLineUpdateInput, Money, ShopifyError,
};
use crate::state::AppState;

/// Most of one variant a single add may request.
const MAX_LINE_QUANTITY: u32 = 99;

/// Cart as returned to the browser.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub id: Option<String>,
    pub checkout_url: Option<String>,
    pub item_count: i64,
    pub subtotal: Money,
    pub total: Money,
    pub total_tax: Option<Money>,
    /// `total` in the visitor's display currency.
    pub display_total: String,
    /// Loyalty points this cart would earn at checkout.
    pub points_earned: u64,
    pub discount_codes: Vec<CartDiscountCode>,
    pub lines: Vec<CartLine>,
}

impl CartView {
    fn new(cart: Option<Cart>, state: &AppState, display: &DisplayCurrency) -> Self {
        let Some(cart) = cart else {
            let zero = Money {
                amount: "0.00".to_string(),
                currency_code: state.config().currency.base_currency.code().to_string(),
            };
            return Self {
                id: None,
                checkout_url: None,
                item_count: 0,
                display_total: display.money(&zero),
                points_earned: 0,
                subtotal: zero.clone(),
                total: zero,
                total_tax: None,
                discount_codes: Vec::new(),
                lines: Vec::new(),
            };
        };

        Self {
            display_total: display.money(&cart.cost.total),
            points_earned: cart
                .cost
                .total
                .to_price()
                .map_or(0, |price| points_for_purchase(price.amount)),
            id: Some(cart.id),
            checkout_url: Some(cart.checkout_url),
            item_count: cart.total_quantity,
            subtotal: cart.cost.subtotal,
            total: cart.cost.total,
            total_tax: cart.cost.total_tax,
            discount_codes: cart.discount_codes,
            lines: cart.lines,
        }
    }
}

/// Cart item count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: i64,
}

/// Body of `POST /api/cart/add`.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub variant_id: String,
    pub quantity: Option<u32>,
}

/// Body of `POST /api/cart/update`.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub line_id: String,
    pub quantity: u32,
}

/// Body of `POST /api/cart/remove`.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub line_id: String,
}

/// Body of `POST /api/cart/discount-codes`.
#[derive(Debug, Deserialize)]
pub struct DiscountCodesRequest {
    #[serde(default)]
    pub codes: Vec<String>,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The visitor's cart, or `None` if they have none or it has expired.
pub(crate) async fn load_cart(state: &AppState, session: &Session) -> Result<Option<Cart>> {
    let Some(cart_id) = session::cart_id(session).await? else {
        return Ok(None);
    };

    match state.shopify().get_cart(&cart_id).await {
        Ok(cart) => Ok(Some(cart)),
        Err(ShopifyError::NotFound(_)) => {
            warn!(cart_id = %cart_id, "Cart no longer exists, starting fresh");
            session::clear_cart_id(session).await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Outcome of a mutation on the stored cart.
///
/// A failed mutation against a cart Shopify no longer has is not an error:
/// the cart id is forgotten and `None` comes back. Any other failure is
/// returned as is.
async fn settle(
    state: &AppState,
    session: &Session,
    outcome: std::result::Result<Cart, ShopifyError>,
) -> Result<Option<Cart>> {
    match outcome {
        Ok(cart) => Ok(Some(cart)),
        Err(e) => match load_cart(state, session).await? {
            Some(_) => Err(e.into()),
            None => Ok(None),
        },
    }
}

/// Add lines to the visitor's cart, creating one when needed.
///
/// If the stored cart has expired the lines go into a new cart.
pub(crate) async fn add_lines(
    state: &AppState,
    session: &Session,
    lines: Vec<CartLineInput>,
) -> Result<Cart> {
    if let Some(cart_id) = session::cart_id(session).await? {
        let outcome = state.shopify().add_to_cart(&cart_id, lines.clone()).await;
        if let Some(cart) = settle(state, session, outcome).await? {
            return Ok(cart);
        }
    }

    let cart = state.shopify().create_cart(lines).await?;
    session::set_cart_id(session, &cart.id).await?;
    Ok(cart)
}

pub(crate) async fn view(
    state: &AppState,
    session: &Session,
    cart: Option<Cart>,
) -> Result<Json<CartView>> {
    let display = DisplayCurrency::load(state, session).await?;
    Ok(Json(CartView::new(cart, state, &display)))
}

fn normalize_codes(codes: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(codes.len());
    for code in codes {
        let code = code.trim().to_uppercase();
        if !code.is_empty() && !normalized.contains(&code) {
            normalized.push(code);
        }
    }
    normalized
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/cart
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&state, &session).await?;
    view(&state, &session, cart).await
}

/// GET /api/cart/count
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<Json<CartCount>> {
    let count = load_cart(&state, &session)
        .await?
        .map_or(0, |cart| cart.total_quantity);
    Ok(Json(CartCount { count }))
}

/// POST /api/cart/add
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let quantity = body.quantity.unwrap_or(1);
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(AppError::BadRequest(format!(
            "Quantity must be between 1 and {MAX_LINE_QUANTITY}"
        )));
    }
    if body.variant_id.trim().is_empty() {
        return Err(AppError::BadRequest("Missing variant".to_string()));
    }

    let line = CartLineInput {
        merchandise_id: body.variant_id,
        quantity: i64::from(quantity),
        attributes: Vec::new(),
    };
    let cart = add_lines(&state, &session, vec![line]).await?;
    view(&state, &session, Some(cart)).await
}

/// POST /api/cart/update
///
/// A quantity of zero removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let Some(cart_id) = session::cart_id(&session).await? else {
        return view(&state, &session, None).await;
    };

    let outcome = if body.quantity == 0 {
        state
            .shopify()
            .remove_from_cart(&cart_id, vec![body.line_id])
            .await
    } else {
        let update = CartLineUpdateInput {
            id: body.line_id,
            quantity: i64::from(body.quantity.min(MAX_LINE_QUANTITY)),
        };
        state.shopify().update_cart(&cart_id, vec![update]).await
    };

    let cart = settle(&state, &session, outcome).await?;
    view(&state, &session, cart).await
}

/// POST /api/cart/remove
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let Some(cart_id) = session::cart_id(&session).await? else {
        return view(&state, &session, None).await;
    };

    let outcome = state
        .shopify()
        .remove_from_cart(&cart_id, vec![body.line_id])
        .await;
    let cart = settle(&state, &session, outcome).await?;
    view(&state, &session, cart).await
}

/// POST /api/cart/discount-codes
///
/// Replaces the cart's codes; an empty list clears them. Codes Shopify
/// rejects come back with `applicable: false`.
#[instrument(skip(state, session))]
pub async fn discount_codes(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<DiscountCodesRequest>,
) -> Result<Json<CartView>> {
    let empty = || AppError::BadRequest("Cart is empty".to_string());
    let cart_id = session::cart_id(&session).await?.ok_or_else(empty)?;

    let outcome = state
        .shopify()
        .update_discount_codes(&cart_id, normalize_codes(body.codes))
        .await;
    let cart = settle(&state, &session, outcome).await?.ok_or_else(empty)?;
    view(&state, &session, Some(cart)).await
}

/// GET /checkout
///
/// Redirects to Shopify's hosted checkout, or home when there is nothing to
/// buy.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<Response> {
    let cart = load_cart(&state, &session).await?;
    Ok(match cart {
        Some(cart) if cart.total_quantity > 0 => Redirect::to(&cart.checkout_url).into_response(),
        _ => Redirect::to("/").into_response(),
    })
}
