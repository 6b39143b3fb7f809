//! Invoices: totals as JSON, and a print-ready HTML rendering.
//!
//! The tax rate always comes from configuration; clients only supply the
//! customer and the lines.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use boxcraft_core::{
    CurrencyCode, Email, Invoice, InvoiceCustomer, InvoiceError, InvoiceLine, InvoiceTotals,
    calculate_totals, format_amount,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use super::cart::load_cart;
use crate::error::{AppError, Result};
use crate::shopify::CartLine;
use crate::state::AppState;

/// The rendered invoice carries its own stylesheet.
const INVOICE_CSP: &str =
    "default-src 'none'; style-src 'unsafe-inline'; frame-ancestors 'none'; base-uri 'none'; form-action 'none'";

/// Customer fields as submitted.
#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Body of `POST /api/invoice` and `POST /invoice`.
#[derive(Debug, Deserialize)]
pub struct InvoiceRequest {
    /// Generated when omitted.
    #[serde(default)]
    pub number: Option<String>,
    pub customer: CustomerRequest,
    /// Defaults to the store currency.
    #[serde(default)]
    pub currency: Option<String>,
    pub lines: Vec<InvoiceLine>,
}

/// Totals with display strings.
#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    pub currency: CurrencyCode,
    pub tax_rate: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub formatted: FormattedTotals,
}

#[derive(Debug, Serialize)]
pub struct FormattedTotals {
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

/// Totals for a submitted invoice.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub number: String,
    #[serde(flatten)]
    pub totals: TotalsResponse,
}

impl TotalsResponse {
    fn new(totals: InvoiceTotals, tax_rate: Decimal) -> Self {
        Self {
            currency: totals.total.currency_code,
            tax_rate,
            subtotal: totals.subtotal.amount,
            tax: totals.tax.amount,
            total: totals.total.amount,
            formatted: FormattedTotals {
                subtotal: totals.subtotal.display(),
                tax: totals.tax.display(),
                total: totals.total.display(),
            },
        }
    }
}

struct LineView {
    description: String,
    quantity: u32,
    unit_price: String,
    amount: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "invoice.html")]
struct InvoiceTemplate {
    seller_name: String,
    seller_address: Option<String>,
    number: String,
    issued: String,
    customer_name: String,
    customer_email: String,
    customer_address: Option<String>,
    lines: Vec<LineView>,
    subtotal: String,
    tax: String,
    tax_percent: String,
    total: String,
}

fn invoice_number() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!(
        "INV-{}-{}",
        Utc::now().format("%Y%m%d"),
        suffix.to_uppercase()
    )
}

/// Build and validate an invoice from a request.
fn build_invoice(state: &AppState, request: InvoiceRequest) -> Result<Invoice> {
    let email = Email::parse(&request.customer.email)
        .map_err(|e| AppError::BadRequest(format!("Invalid email: {e}")))?;
    let currency_code = match request.currency.as_deref() {
        Some(code) => code
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Unsupported currency: {code}")))?,
        None => state.config().currency.base_currency,
    };
    let number = request
        .number
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(invoice_number);

    let invoice = Invoice {
        number,
        customer: InvoiceCustomer {
            name: request.customer.name.trim().to_string(),
            email,
            address: request
                .customer
                .address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        },
        currency_code,
        lines: request.lines,
        tax_rate: state.config().invoice.tax_rate,
    };

    invoice.validate().map_err(invalid)?;
    Ok(invoice)
}

fn invalid(e: InvoiceError) -> AppError {
    AppError::BadRequest(e.to_string())
}

/// Invoice line for a cart line, priced per unit.
fn cart_invoice_line(line: &CartLine) -> Result<(InvoiceLine, CurrencyCode)> {
    let price = line.cost.amount_per_quantity.to_price().ok_or_else(|| {
        AppError::Internal(format!(
            "Unpriceable cart line: {} {}",
            line.cost.amount_per_quantity.amount, line.cost.amount_per_quantity.currency_code
        ))
    })?;
    let description = if line.merchandise.title == "Default Title" {
        line.merchandise.product.title.clone()
    } else {
        format!(
            "{} - {}",
            line.merchandise.product.title, line.merchandise.title
        )
    };

    let quantity = u32::try_from(line.quantity).map_err(|_| {
        AppError::Internal(format!(
            "Cart line {} has invalid quantity {}",
            line.id, line.quantity
        ))
    })?;

    Ok((
        InvoiceLine {
            description,
            quantity,
            unit_price: price.amount,
        },
        price.currency_code,
    ))
}

/// POST /api/invoice
#[instrument(skip(state, request))]
pub async fn totals(
    State(state): State<AppState>,
    Json(request): Json<InvoiceRequest>,
) -> Result<Json<InvoiceResponse>> {
    let invoice = build_invoice(&state, request)?;
    Ok(Json(InvoiceResponse {
        totals: TotalsResponse::new(invoice.totals().map_err(invalid)?, invoice.tax_rate),
        number: invoice.number,
    }))
}

/// GET /api/invoice/cart
///
/// Totals for the visitor's cart at the configured tax rate; an empty or
/// missing cart totals zero.
#[instrument(skip(state, session))]
pub async fn cart_totals(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<TotalsResponse>> {
    let tax_rate = state.config().invoice.tax_rate;
    let mut currency = state.config().currency.base_currency;
    let mut lines = Vec::new();

    if let Some(cart) = load_cart(&state, &session).await? {
        for line in &cart.lines {
            let (line, line_currency) = cart_invoice_line(line)?;
            currency = line_currency;
            lines.push(line);
        }
    }

    let totals = calculate_totals(&lines, tax_rate, currency)
        .map_err(|e| AppError::Internal(format!("Cart totals: {e}")))?;
    Ok(Json(TotalsResponse::new(totals, tax_rate)))
}

/// POST /invoice
///
/// Renders the invoice as a standalone HTML page for printing.
#[instrument(skip(state, request))]
pub async fn render(
    State(state): State<AppState>,
    Json(request): Json<InvoiceRequest>,
) -> Result<Response> {
    let invoice = build_invoice(&state, request)?;
    let totals = invoice.totals().map_err(invalid)?;
    let currency = invoice.currency_code;
    let config = &state.config().invoice;

    let template = InvoiceTemplate {
        seller_name: config.seller_name.clone(),
        seller_address: config.seller_address.clone(),
        issued: Utc::now().format("%B %-d, %Y").to_string(),
        customer_name: invoice.customer.name.clone(),
        customer_email: invoice.customer.email.to_string(),
        customer_address: invoice.customer.address.clone(),
        lines: invoice
            .lines
            .iter()
            .map(|line| {
                let amount = line.amount().ok_or(InvoiceError::AmountTooLarge)?;
                Ok(LineView {
                    description: line.description.clone(),
                    quantity: line.quantity,
                    unit_price: format_amount(line.unit_price, currency),
                    amount: format_amount(amount, currency),
                })
            })
            .collect::<std::result::Result<_, InvoiceError>>()
            .map_err(invalid)?,
        subtotal: totals.subtotal.display(),
        tax: totals.tax.display(),
        tax_percent: (invoice.tax_rate * Decimal::ONE_HUNDRED).normalize().to_string(),
        total: totals.total.display(),
        number: invoice.number,
    };

    Ok((
        [(header::CONTENT_SECURITY_POLICY, INVOICE_CSP)],
        template,
    )
        .into_response())
}
