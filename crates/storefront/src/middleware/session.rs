//! Session middleware configuration.
//!
//! Sessions are held in memory. They carry only per-visitor pointers into
//! Shopify (cart id, customer token) and the gift builder wizard, all of
//! which can be rebuilt after a restart. The store drops each record at its
//! expiry date and holds at most `MAX_SESSIONS`, evicting the least used.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "boxcraft_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Live sessions kept before the least recently used are evicted.
const MAX_SESSIONS: u64 = 200_000;

/// In-memory session store with per-record expiry.
#[must_use]
pub fn session_store() -> MokaStore {
    MokaStore::new(Some(MAX_SESSIONS))
}

/// Create the session layer backed by an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaStore> {
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(session_store())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
