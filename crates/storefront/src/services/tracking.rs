//! Shipment tracking via ship24.
//!
//! A lookup creates a tracker for the number, waits once for the carrier
//! data to arrive, then reads the tracker results. There is no retry: a
//! tracker with no results yet is reported as not found.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use boxcraft_core::ShipmentStatus;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::TrackingConfig;

static TRACKING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Pattern is a compile-time constant
    Regex::new(r"^[A-Za-z0-9-]{5,40}$").expect("valid tracking number pattern")
});

/// Errors that can occur when tracking a shipment.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// Tracking number failed validation.
    #[error("Invalid tracking number")]
    InvalidTrackingNumber,

    /// No API key configured.
    #[error("Shipment tracking is not available")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The carrier has no data for this number yet.
    #[error("No tracking information found")]
    NotFound,

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A single tracking event, as shown to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingEvent {
    pub status: String,
    pub milestone: ShipmentStatus,
    pub occurred_at: Option<String>,
    pub location: Option<String>,
}

/// Reshaped tracking result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingResponse {
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub status_label: &'static str,
    pub courier: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub estimated_delivery: Option<String>,
    /// Newest first.
    pub events: Vec<TrackingEvent>,
}

// ship24 response shapes

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct CreateTrackerData {
    tracker: TrackerNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackerNode {
    tracker_id: String,
}

#[derive(Debug, Deserialize)]
struct ResultsData {
    #[serde(default)]
    trackings: Vec<TrackingNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackingNode {
    #[serde(default)]
    shipment: ShipmentNode,
    #[serde(default)]
    events: Vec<EventNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShipmentNode {
    #[serde(default)]
    status_milestone: Option<String>,
    #[serde(default)]
    origin_country_code: Option<String>,
    #[serde(default)]
    destination_country_code: Option<String>,
    #[serde(default)]
    delivery: Option<DeliveryNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeliveryNode {
    #[serde(default)]
    estimated_delivery_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventNode {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    status_milestone: Option<String>,
    #[serde(default)]
    occurrence_datetime: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    courier_code: Option<String>,
}

/// Check a tracking number before sending it upstream.
///
/// # Errors
///
/// Returns `InvalidTrackingNumber` unless the trimmed value is 5-40
/// letters, digits or dashes.
pub fn validate_tracking_number(raw: &str) -> Result<String, TrackingError> {
    let trimmed = raw.trim();
    if TRACKING_NUMBER.is_match(trimmed) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(TrackingError::InvalidTrackingNumber)
    }
}

/// ship24 API client.
#[derive(Clone)]
pub struct TrackingService {
    inner: Option<Arc<TrackingServiceInner>>,
}

struct TrackingServiceInner {
    client: reqwest::Client,
    api_url: String,
    poll_delay: Duration,
}

impl TrackingService {
    /// Create a tracking client. Without an API key every lookup fails with
    /// `NotConfigured`.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &TrackingConfig) -> Result<Self, TrackingError> {
        let Some(key) = &config.api_key else {
            return Ok(Self { inner: None });
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
                .map_err(|e| TrackingError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Some(Arc::new(TrackingServiceInner {
                client,
                api_url: config.api_url.clone(),
                poll_delay: config.poll_delay,
            })),
        })
    }

    /// Whether an API key is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.inner.is_some()
    }

    /// Look up a shipment.
    ///
    /// # Errors
    ///
    /// Returns error if the number is invalid, tracking is not configured, the
    /// provider fails, or it has no results for the number.
    #[instrument(skip(self))]
    pub async fn track(&self, tracking_number: &str) -> Result<TrackingResponse, TrackingError> {
        let tracking_number = validate_tracking_number(tracking_number)?;
        let inner = self.inner.as_ref().ok_or(TrackingError::NotConfigured)?;

        let created: Envelope<CreateTrackerData> = inner
            .send(
                inner
                    .client
                    .post(format!("{}/public/v1/trackers", inner.api_url))
                    .json(&serde_json::json!({ "trackingNumber": tracking_number })),
            )
            .await?;
        let tracker_id = created.data.tracker.tracker_id;
        debug!(tracker_id = %tracker_id, "Created tracker");

        tokio::time::sleep(inner.poll_delay).await;

        let results: Envelope<ResultsData> = inner
            .send(inner.client.get(format!(
                "{}/public/v1/trackers/{}/results",
                inner.api_url,
                urlencoding::encode(&tracker_id)
            )))
            .await?;

        let tracking = results
            .data
            .trackings
            .into_iter()
            .next()
            .ok_or(TrackingError::NotFound)?;

        Ok(reshape(tracking_number, tracking))
    }
}

impl TrackingServiceInner {
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TrackingError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TrackingError::NotFound);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TrackingError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| TrackingError::Parse(e.to_string()))
    }
}

fn reshape(tracking_number: String, tracking: TrackingNode) -> TrackingResponse {
    let shipment = tracking.shipment;
    let status = shipment
        .status_milestone
        .as_deref()
        .map(ShipmentStatus::from_milestone)
        .unwrap_or_default();

    let courier = tracking
        .events
        .iter()
        .find_map(|e| e.courier_code.clone())
        .filter(|c| !c.is_empty());

    let mut events: Vec<TrackingEvent> = tracking
        .events
        .into_iter()
        .map(|e| TrackingEvent {
            status: e.status.unwrap_or_default(),
            milestone: e
                .status_milestone
                .as_deref()
                .map(ShipmentStatus::from_milestone)
                .unwrap_or_default(),
            occurred_at: e.occurrence_datetime,
            location: e.location.filter(|l| !l.is_empty()),
        })
        .collect();
    // ISO-8601 strings sort chronologically; undated events go last
    events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

    TrackingResponse {
        tracking_number,
        status,
        status_label: status.label(),
        courier,
        origin: shipment.origin_country_code,
        destination: shipment.destination_country_code,
        estimated_delivery: shipment.delivery.and_then(|d| d.estimated_delivery_date),
        events,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Json, Router,
        extract::Path,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
    };
    use serde_json::{Value, json};

    use super::*;
    use crate::test_support;

    async fn create_tracker(headers: HeaderMap, Json(body): Json<Value>) -> axum::response::Response {
        let expected = format!("Bearer {}", test_support::SHIP24_KEY);
        if headers.get("Authorization").and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
            return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
        }
        let number = body["trackingNumber"].as_str().unwrap_or_default();
        (
            StatusCode::CREATED,
            Json(json!({"data": {"tracker": {"trackerId": format!("trk-{number}")}}})),
        )
            .into_response()
    }

    async fn results(Path(id): Path<String>) -> Json<Value> {
        if id == "trk-EMPTY12345" {
            return Json(json!({"data": {"trackings": []}}));
        }
        Json(json!({"data": {"trackings": [{
            "shipment": {
                "statusMilestone": "in_transit",
                "originCountryCode": "US",
                "destinationCountryCode": "GB",
                "delivery": {"estimatedDeliveryDate": "2026-02-01"}
            },
            "events": [
                {"status": "Label created", "statusMilestone": "info_received",
                 "occurrenceDatetime": "2026-01-20T08:00:00", "courierCode": "usps"},
                {"status": "Departed facility", "statusMilestone": "in_transit",
                 "occurrenceDatetime": "2026-01-22T12:00:00", "location": "New York"},
                {"status": "Mystery"}
            ]
        }]}}))
    }

    async fn service() -> TrackingService {
        let base = test_support::spawn_mock(
            Router::new()
                .route("/public/v1/trackers", post(create_tracker))
                .route("/public/v1/trackers/{id}/results", get(results)),
        )
        .await;
        TrackingService::new(&test_support::config(&base).tracking).unwrap()
    }

    #[test]
    fn test_validate_tracking_number() {
        assert_eq!(
            validate_tracking_number(" 1z999aa10123456784 ").unwrap(),
            "1Z999AA10123456784"
        );
        assert!(validate_tracking_number("abc").is_err());
        assert!(validate_tracking_number("abc def 123").is_err());
        assert!(validate_tracking_number(&"9".repeat(41)).is_err());
        assert!(validate_tracking_number("../../admin").is_err());
    }

    #[tokio::test]
    async fn test_track_reshapes_newest_first() {
        let response = service().await.track("9400111899223456").await.unwrap();

        assert_eq!(response.tracking_number, "9400111899223456");
        assert_eq!(response.status, ShipmentStatus::InTransit);
        assert_eq!(response.status_label, "In transit");
        assert_eq!(response.courier.as_deref(), Some("usps"));
        assert_eq!(response.destination.as_deref(), Some("GB"));
        assert_eq!(response.estimated_delivery.as_deref(), Some("2026-02-01"));
        assert_eq!(response.events.len(), 3);
        assert_eq!(response.events[0].status, "Departed facility");
        assert_eq!(response.events[1].milestone, ShipmentStatus::InfoReceived);
        assert_eq!(response.events[2].milestone, ShipmentStatus::Pending);
    }

    #[tokio::test]
    async fn test_track_without_results() {
        let err = service().await.track("EMPTY12345").await.unwrap_err();
        assert!(matches!(err, TrackingError::NotFound));
    }

    #[tokio::test]
    async fn test_not_configured() {
        let mut config = test_support::config("http://127.0.0.1:9").tracking;
        config.api_key = None;
        let service = TrackingService::new(&config).unwrap();

        assert!(!service.is_configured());
        let err = service.track("9400111899223456").await.unwrap_err();
        assert!(matches!(err, TrackingError::NotConfigured));
    }

    #[tokio::test]
    async fn test_invalid_number_checked_first() {
        let err = service().await.track("no").await.unwrap_err();
        assert!(matches!(err, TrackingError::InvalidTrackingNumber));
    }
}
