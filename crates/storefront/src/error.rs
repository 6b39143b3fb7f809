//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Responses carry a JSON body of the form `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::currency::CurrencyError;
use crate::services::gift_builder::GiftBuilderError;
use crate::services::search::SearchError;
use crate::services::tracking::TrackingError;
use crate::shopify::ShopifyError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Currency lookup failed.
    #[error("Currency error: {0}")]
    Currency(#[from] CurrencyError),

    /// Shipment tracking failed.
    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    /// Gift builder rejected a transition.
    #[error("Gift builder error: {0}")]
    GiftBuilder(#[from] GiftBuilderError),

    /// Search failed or was superseded.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A feature needs configuration that is missing.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Shopify(err) => match err {
                ShopifyError::NotFound(_) => StatusCode::NOT_FOUND,
                ShopifyError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                ShopifyError::UserError(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Currency(err) => match err {
                CurrencyError::Unsupported(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Tracking(err) => match err {
                TrackingError::InvalidTrackingNumber => StatusCode::BAD_REQUEST,
                TrackingError::NotFound => StatusCode::NOT_FOUND,
                TrackingError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::GiftBuilder(err) => match err {
                GiftBuilderError::UnknownBox(_) | GiftBuilderError::UnknownProduct(_) => {
                    StatusCode::NOT_FOUND
                }
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Self::Search(err) => match err {
                SearchError::Superseded => StatusCode::CONFLICT,
                SearchError::Shopify(_) => StatusCode::BAD_GATEWAY,
                SearchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Shopify(err) => match err {
                ShopifyError::NotFound(what) => format!("Not found: {what}"),
                ShopifyError::RateLimited(_) => "Too many requests, try again shortly".to_string(),
                ShopifyError::UserError(msg) => msg.clone(),
                _ => "External service error".to_string(),
            },
            Self::Currency(err) => match err {
                CurrencyError::Unsupported(_) => err.to_string(),
                _ => "External service error".to_string(),
            },
            Self::Tracking(err) => match err {
                TrackingError::InvalidTrackingNumber
                | TrackingError::NotFound
                | TrackingError::NotConfigured => err.to_string(),
                _ => "Tracking service error".to_string(),
            },
            Self::GiftBuilder(err) => err.to_string(),
            Self::Search(err) => match err {
                SearchError::Superseded => err.to_string(),
                _ => "Search failed".to_string(),
            },
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Client error");
        }

        // Don't expose internal error details to clients
        let body = serde_json::json!({ "error": self.client_message() });
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a Shopify customer.
///
/// Call this after a successful login so errors are associated with the customer.
pub fn set_sentry_user(customer_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the customer.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("gift_builder", "Selected box", Some(&[("handle", "large-box")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unavailable("test".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_shopify_error_status_codes() {
        assert_eq!(
            get_status(ShopifyError::NotFound("x".to_string()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ShopifyError::RateLimited(2).into()),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(ShopifyError::UserError("bad".to_string()).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(ShopifyError::GraphQL(vec![]).into()),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_gift_builder_status_codes() {
        assert_eq!(
            get_status(GiftBuilderError::BoxFull { capacity: 4 }.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(GiftBuilderError::UnknownBox("nope".to_string()).into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_superseded_search_is_conflict() {
        assert_eq!(
            get_status(SearchError::Superseded.into()),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn test_error_body_is_json_without_internals() {
        let response = AppError::Internal("db password leaked".to_string()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Internal server error");
    }
}
