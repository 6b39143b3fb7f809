//! Customer account routes.
//!
//! Login exchanges email and password for a Shopify customer access token,
//! which then lives in the session. Everything else needs that token.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use boxcraft_core::{Email, LoyaltyStatus};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalCustomer, RequireCustomer};
use crate::models::session;
use crate::shopify::{Customer, CustomerCreateInput, ShopifyError};
use crate::state::AppState;

/// Shopify's minimum customer password length.
const MIN_PASSWORD_LEN: usize = 5;

/// Body of `POST /api/account/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/account/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub accepts_marketing: bool,
}

/// The logged-in customer with recent orders.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub display_name: String,
    #[serde(flatten)]
    pub customer: Customer,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct Status {
    pub ok: bool,
}

impl Status {
    const OK: Self = Self { ok: true };
}

/// Fetch the customer for a token, logging the visitor out if Shopify no
/// longer accepts it.
async fn customer(state: &AppState, session: &Session, access_token: &str) -> Result<Customer> {
    match state.shopify().get_customer(access_token).await {
        Ok(customer) => Ok(customer),
        Err(ShopifyError::NotFound(_)) => {
            warn!("Customer token rejected by Shopify, clearing session");
            session::clear_customer_token(session).await?;
            Err(AppError::Unauthorized("Log in to continue".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn parse_email(raw: &str) -> Result<Email> {
    Email::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid email: {e}")))
}

/// Log in and remember the token.
async fn log_in(state: &AppState, session: &Session, email: &Email, password: &str) -> Result<Customer> {
    let token = match state.shopify().customer_login(email.as_str(), password).await {
        Ok(token) => token,
        Err(ShopifyError::UserError(message)) => return Err(AppError::Unauthorized(message)),
        Err(e) => return Err(e.into()),
    };

    // New login, new session id
    session.cycle_id().await?;
    session::set_customer_token(session, &token).await?;

    let customer = customer(state, session, &token.access_token).await?;
    set_sentry_user(&customer.id, customer.email.as_deref());
    add_breadcrumb("auth", "Customer logged in", None);
    Ok(customer)
}

/// POST /api/account/login
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AccountResponse>> {
    let email = parse_email(&body.email)?;
    let customer = log_in(&state, &session, &email, &body.password).await?;
    Ok(Json(AccountResponse {
        display_name: customer.display_name(),
        customer,
    }))
}

/// POST /api/account/register
///
/// Creates the customer, then logs them in.
#[instrument(skip(state, session, body))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let email = parse_email(&body.email)?;
    if body.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let trimmed = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let customer_id = state
        .shopify()
        .customer_register(CustomerCreateInput {
            email: email.to_string(),
            password: body.password.clone(),
            first_name: trimmed(body.first_name),
            last_name: trimmed(body.last_name),
            accepts_marketing: body.accepts_marketing,
        })
        .await?;
    info!(customer_id = %customer_id, "Customer registered");

    let customer = log_in(&state, &session, &email, &body.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            display_name: customer.display_name(),
            customer,
        }),
    ))
}

/// POST /api/account/logout
///
/// Succeeds whether or not anyone was logged in.
#[instrument(skip(state, session, token))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalCustomer(token): OptionalCustomer,
) -> Result<Json<Status>> {
    if let Some(token) = token {
        if let Err(e) = state.shopify().customer_logout(&token.access_token).await {
            warn!(error = %e, "Failed to revoke customer token");
        }
        session::clear_customer_token(&session).await?;
    }
    clear_sentry_user();
    Ok(Json(Status::OK))
}

/// GET /api/account
#[instrument(skip(state, session, token))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireCustomer(token): RequireCustomer,
) -> Result<Json<AccountResponse>> {
    let customer = customer(&state, &session, &token.access_token).await?;
    Ok(Json(AccountResponse {
        display_name: customer.display_name(),
        customer,
    }))
}

/// GET /api/account/loyalty
#[instrument(skip(state, session, token))]
pub async fn loyalty(
    State(state): State<AppState>,
    session: Session,
    RequireCustomer(token): RequireCustomer,
) -> Result<Json<LoyaltyStatus>> {
    let customer = customer(&state, &session, &token.access_token).await?;
    Ok(Json(customer.loyalty))
}

/// DELETE /api/account
///
/// Deletes the customer through the Admin API and ends the session.
#[instrument(skip(state, session, token))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireCustomer(token): RequireCustomer,
) -> Result<Json<Status>> {
    let admin = state
        .admin()
        .ok_or_else(|| AppError::Unavailable("Account deletion is not available".to_string()))?;

    let customer = customer(&state, &session, &token.access_token).await?;
    let deleted = admin.delete_customer(&customer.id).await?;
    info!(customer_id = %deleted, "Customer account deleted");

    session.flush().await?;
    clear_sentry_user();
    Ok(Json(Status::OK))
}
