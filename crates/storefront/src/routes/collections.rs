//! Collection route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use super::products::{cursor, normalize_query};
use crate::error::Result;
use crate::shopify::{Collection, CollectionConnection};
use crate::state::AppState;

/// Collection listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CollectionsQuery {
    pub after: Option<String>,
    pub q: Option<String>,
}

/// Collection page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CollectionQuery {
    pub after: Option<String>,
}

/// GET /api/collections
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CollectionsQuery>,
) -> Result<Json<CollectionConnection>> {
    let q = normalize_query(query.q.as_deref())?;
    let collections = state
        .shopify()
        .get_collections(None, cursor(query.after), q)
        .await?;
    Ok(Json(collections))
}

/// GET /api/collections/{handle}
///
/// Returns the collection with one page of its products; `after` continues
/// from `products_page_info.end_cursor`.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(query): Query<CollectionQuery>,
) -> Result<Json<Collection>> {
    let collection = state
        .shopify()
        .get_collection_by_handle(&handle, None, cursor(query.after))
        .await?;
    Ok(Json(collection))
}
