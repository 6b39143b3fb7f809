//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode};
use tracing::warn;

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the Storefront API answers with the configured token. Returns
/// 503 Service Unavailable when it does not.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.shopify().shop_name().await {
        Ok(_) => (StatusCode::OK, "ready"),
        Err(e) => {
            warn!(error = %e, "Readiness probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "shopify unavailable")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support;

    #[tokio::test]
    async fn test_health() {
        let app = test_support::app_with(test_support::config("http://127.0.0.1:9"));
        let response = test_support::get(&app, "/health", None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.text(), "ok");
    }

    #[tokio::test]
    async fn test_ready_when_shopify_answers() {
        let app = test_support::app().await;
        let response = test_support::get(&app, "/health/ready", None).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_not_ready_when_shopify_unreachable() {
        let app = test_support::app_with(test_support::config("http://127.0.0.1:9"));
        let response = test_support::get(&app, "/health/ready", None).await;
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
