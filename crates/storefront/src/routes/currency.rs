//! Display currency routes.
//!
//! Prices stay in the store currency everywhere in Shopify; the visitor's
//! chosen currency only changes how amounts are shown.

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use boxcraft_core::{CurrencyCode, Price, RateTable, format_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::session;
use crate::services::currency::CurrencyError;
use crate::shopify::Money;
use crate::state::AppState;

/// Rates and the visitor's currency, for formatting amounts in a response.
pub(crate) struct DisplayCurrency {
    rates: RateTable,
    currency: CurrencyCode,
}

impl DisplayCurrency {
    /// Load the current rate table and the session's display currency.
    pub(crate) async fn load(state: &AppState, session: &Session) -> Result<Self> {
        let currency =
            session::display_currency(session, state.config().currency.base_currency).await?;
        Ok(Self {
            rates: state.currency().rates().await,
            currency,
        })
    }

    /// Format a store-currency price in the display currency.
    pub(crate) fn price(&self, price: &Price) -> String {
        self.rates.format_in(price, self.currency)
    }

    /// Format a Shopify amount in the display currency.
    pub(crate) fn money(&self, money: &Money) -> String {
        money
            .to_price()
            .map_or_else(|| money.display(), |price| self.price(&price))
    }
}

fn parse_currency(code: &str) -> Result<CurrencyCode> {
    code.parse()
        .map_err(|_| CurrencyError::Unsupported(code.trim().to_string()).into())
}

/// Body of `POST /api/currency`.
#[derive(Debug, Deserialize)]
pub struct SetCurrencyRequest {
    pub currency: String,
}

/// Acknowledgement for a currency change.
#[derive(Debug, Serialize)]
pub struct CurrencyResponse {
    pub currency: CurrencyCode,
}

/// Query for `GET /api/currency/convert`.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub amount: Decimal,
    pub from: Option<String>,
    pub to: String,
}

/// Converted amount.
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub formatted: String,
}

/// GET /api/currency-rates
///
/// CDN-cacheable for an hour, matching the server-side rate cache.
#[instrument(skip(state))]
pub async fn rates(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "public, s-maxage=3600")],
        Json(state.currency().rates().await),
    )
}

/// POST /api/currency
#[instrument(skip(session))]
pub async fn set_currency(
    session: Session,
    Json(body): Json<SetCurrencyRequest>,
) -> Result<Json<CurrencyResponse>> {
    let currency = parse_currency(&body.currency)?;
    session::set_display_currency(&session, currency).await?;
    Ok(Json(CurrencyResponse { currency }))
}

/// GET /api/currency/convert?amount=&from=&to=
///
/// `from` defaults to the store currency.
#[instrument(skip(state))]
pub async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<ConvertResponse>> {
    if query.amount.is_sign_negative() {
        return Err(AppError::BadRequest("Amount must not be negative".to_string()));
    }
    let from = query
        .from
        .as_deref()
        .map_or(Ok(state.config().currency.base_currency), parse_currency)?;
    let to = parse_currency(&query.to)?;

    let amount = state.currency().convert(query.amount, from, to).await?;
    Ok(Json(ConvertResponse {
        amount,
        currency: to,
        formatted: format_amount(amount, to),
    }))
}
