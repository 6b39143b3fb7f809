//! Search route handler.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::products::normalize_query;
use crate::error::Result;
use crate::models::session;
use crate::services::search::SearchResults;
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/search?q=
///
/// Searches are keyed by visitor: a request still in flight when the same
/// visitor searches again answers 409 instead of returning stale results.
#[instrument(skip(state, session))]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>> {
    let q = normalize_query(query.q.as_deref())?.unwrap_or_default();
    let visitor = session::visitor_id(&session).await?;
    Ok(Json(state.search().search(&visitor, &q).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support;

    #[tokio::test]
    async fn test_search_returns_hits() {
        let app = test_support::app().await;

        let response = test_support::get(&app, "/api/search?q=rose", None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["query"], "rose");
        assert_eq!(response.body["products"][0]["handle"], "rose-candle");
        assert!(response.cookie().is_some());
    }

    #[tokio::test]
    async fn test_blank_search_is_empty() {
        let app = test_support::app().await;

        let response = test_support::get(&app, "/api/search?q=", None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body["products"].as_array().unwrap().is_empty());
    }
}
