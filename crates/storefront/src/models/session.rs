//! Session-stored visitor state.
//!
//! Everything a visitor accumulates between requests lives here: the Shopify
//! cart id, the customer access token, the display currency, the gift builder
//! wizard, and a stable visitor id used to key in-flight searches.

use boxcraft_core::CurrencyCode;
use tower_sessions::Session;
use uuid::Uuid;

use crate::services::gift_builder::GiftBuilderState;
use crate::shopify::CustomerAccessToken;

/// Session keys.
pub mod keys {
    /// Shopify cart ID.
    pub const CART_ID: &str = "cart_id";

    /// Shopify customer access token.
    pub const CUSTOMER_TOKEN: &str = "customer_token";

    /// Display currency chosen by the visitor.
    pub const CURRENCY: &str = "currency";

    /// Gift builder wizard state.
    pub const GIFT_BUILDER: &str = "gift_builder";

    /// Stable per-visitor id.
    pub const VISITOR_ID: &str = "visitor_id";
}

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Visitor id for this session, created on first use.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn visitor_id(session: &Session) -> SessionResult<String> {
    if let Some(id) = session.get::<String>(keys::VISITOR_ID).await? {
        return Ok(id);
    }
    let id = Uuid::new_v4().to_string();
    session.insert(keys::VISITOR_ID, &id).await?;
    Ok(id)
}

/// Current cart id, if the visitor has a cart.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn cart_id(session: &Session) -> SessionResult<Option<String>> {
    session.get(keys::CART_ID).await
}

/// Remember the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn set_cart_id(session: &Session, cart_id: &str) -> SessionResult<()> {
    session.insert(keys::CART_ID, cart_id).await
}

/// Forget the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_cart_id(session: &Session) -> SessionResult<()> {
    session.remove::<String>(keys::CART_ID).await?;
    Ok(())
}

/// Store the customer access token after login.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn set_customer_token(
    session: &Session,
    token: &CustomerAccessToken,
) -> SessionResult<()> {
    session.insert(keys::CUSTOMER_TOKEN, token).await
}

/// Remove the customer access token.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_customer_token(session: &Session) -> SessionResult<()> {
    session
        .remove::<CustomerAccessToken>(keys::CUSTOMER_TOKEN)
        .await?;
    Ok(())
}

/// Display currency, defaulting to `fallback` when unset.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn display_currency(
    session: &Session,
    fallback: CurrencyCode,
) -> SessionResult<CurrencyCode> {
    Ok(session
        .get::<CurrencyCode>(keys::CURRENCY)
        .await?
        .unwrap_or(fallback))
}

/// Set the display currency.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn set_display_currency(session: &Session, currency: CurrencyCode) -> SessionResult<()> {
    session.insert(keys::CURRENCY, currency).await
}

/// Gift builder state, starting fresh when none is stored.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn gift_builder(session: &Session) -> SessionResult<GiftBuilderState> {
    Ok(session
        .get::<GiftBuilderState>(keys::GIFT_BUILDER)
        .await?
        .unwrap_or_default())
}

/// Save the gift builder state.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn set_gift_builder(session: &Session, state: &GiftBuilderState) -> SessionResult<()> {
    session.insert(keys::GIFT_BUILDER, state).await
}

/// Drop the gift builder state.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_gift_builder(session: &Session) -> SessionResult<()> {
    session
        .remove::<GiftBuilderState>(keys::GIFT_BUILDER)
        .await?;
    Ok(())
}
