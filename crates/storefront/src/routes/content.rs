//! Menus and blog articles.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use super::products::cursor;
use crate::error::Result;
use crate::shopify::{Article, ArticleConnection, Menu};
use crate::state::AppState;

/// Article listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ArticlesQuery {
    pub after: Option<String>,
}

/// GET /api/menus/{handle}
#[instrument(skip(state))]
pub async fn menu(State(state): State<AppState>, Path(handle): Path<String>) -> Result<Json<Menu>> {
    Ok(Json(state.shopify().get_menu(&handle).await?))
}

/// GET /api/blog
#[instrument(skip(state))]
pub async fn articles(
    State(state): State<AppState>,
    Query(query): Query<ArticlesQuery>,
) -> Result<Json<ArticleConnection>> {
    let articles = state
        .shopify()
        .get_articles(None, cursor(query.after))
        .await?;
    Ok(Json(articles))
}

/// GET /api/blog/{blog}/{article}
#[instrument(skip(state))]
pub async fn article(
    State(state): State<AppState>,
    Path((blog, handle)): Path<(String, String)>,
) -> Result<Json<Article>> {
    Ok(Json(state.shopify().get_article(&blog, &handle).await?))
}
