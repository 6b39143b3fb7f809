//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use super::currency::DisplayCurrency;
use crate::error::{AppError, Result};
use crate::shopify::{Product, ProductConnection, ProductSortKey};
use crate::state::AppState;

/// Longest free-text filter passed on to Shopify.
const MAX_QUERY_LEN: usize = 200;

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub after: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub reverse: Option<bool>,
}

/// Product detail with its price in the visitor's display currency.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product: Product,
    pub display_price: String,
}

/// Normalize an optional free-text filter: trimmed, non-empty, bounded.
pub(crate) fn normalize_query(q: Option<&str>) -> Result<Option<String>> {
    let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) else {
        return Ok(None);
    };
    if q.chars().count() > MAX_QUERY_LEN {
        return Err(AppError::BadRequest(format!(
            "Query is limited to {MAX_QUERY_LEN} characters"
        )));
    }
    Ok(Some(q.to_string()))
}

/// Treat an empty cursor as absent.
pub(crate) fn cursor(after: Option<String>) -> Option<String> {
    after.filter(|a| !a.trim().is_empty())
}

/// GET /api/products
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<ProductConnection>> {
    let sort_key = query
        .sort
        .as_deref()
        .map(|s| {
            ProductSortKey::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown sort: {s}")))
        })
        .transpose()?;
    let q = normalize_query(query.q.as_deref())?;

    let products = state
        .shopify()
        .get_products(None, cursor(query.after), q, sort_key, query.reverse)
        .await?;

    Ok(Json(products))
}

/// GET /api/products/{handle}
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(handle): Path<String>,
) -> Result<Json<ProductResponse>> {
    let product = state.shopify().get_product_by_handle(&handle).await?;

    let display = DisplayCurrency::load(&state, &session).await?;
    let price = product
        .default_variant()
        .map_or(&product.price_range.min_variant_price, |v| &v.price);
    let display_price = display.money(price);

    Ok(Json(ProductResponse {
        product,
        display_price,
    }))
}
