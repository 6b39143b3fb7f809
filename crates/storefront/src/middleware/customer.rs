//! Shopify customer extractors.
//!
//! The customer access token from `customerAccessTokenCreate` is kept in the
//! session. Expired tokens are treated as logged out and dropped.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session::{self, keys};
use crate::shopify::CustomerAccessToken;

/// Whether a token's `expires_at` is in the past. Unparseable timestamps are
/// treated as still valid and left for Shopify to reject.
#[must_use]
pub fn is_expired(token: &CustomerAccessToken, now: DateTime<Utc>) -> bool {
    DateTime::parse_from_rfc3339(&token.expires_at).is_ok_and(|expires| expires.with_timezone(&Utc) <= now)
}

async fn current_token(parts: &Parts) -> Result<Option<CustomerAccessToken>, AppError> {
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };

    let Some(token) = session
        .get::<CustomerAccessToken>(keys::CUSTOMER_TOKEN)
        .await?
    else {
        return Ok(None);
    };

    if is_expired(&token, Utc::now()) {
        tracing::debug!("Customer access token expired, clearing session");
        session::clear_customer_token(session).await?;
        return Ok(None);
    }

    Ok(Some(token))
}

/// Extractor that requires a logged-in customer; rejects with 401.
///
/// ```rust,ignore
/// async fn handler(RequireCustomer(token): RequireCustomer) -> impl IntoResponse {
///     state.shopify().get_customer(&token.access_token).await
/// }
/// ```
pub struct RequireCustomer(pub CustomerAccessToken);

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_token(parts)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Log in to continue".to_string()))
    }
}

/// Extractor that optionally gets the customer token.
pub struct OptionalCustomer(pub Option<CustomerAccessToken>);

impl<S> FromRequestParts<S> for OptionalCustomer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_token(parts).await?))
    }
}
