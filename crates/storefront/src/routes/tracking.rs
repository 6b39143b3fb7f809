//! Shipment tracking route.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::services::tracking::TrackingResponse;
use crate::state::AppState;

/// Body of `POST /api/tracking`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRequest {
    pub tracking_number: String,
}

/// POST /api/tracking
#[instrument(skip(state))]
pub async fn track(
    State(state): State<AppState>,
    Json(body): Json<TrackingRequest>,
) -> Result<Json<TrackingResponse>> {
    Ok(Json(state.tracking().track(&body.tracking_number).await?))
}
