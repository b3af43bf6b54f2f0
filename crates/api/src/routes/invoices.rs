//! Invoice routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use finledger_core::invoice::{InvoiceLineInput, InvoiceStatus, InvoiceType, NewInvoice};
use finledger_shared::types::{InvoiceId, PageRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::{VersionQuery, run, today};
use crate::{AppState, middleware::AuthUser};

/// Creates the invoice routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/aging", get(get_aging))
        .route("/invoices/{invoice_id}", get(get_invoice))
        .route("/invoices/{invoice_id}/lines", put(update_lines))
        .route("/invoices/{invoice_id}/send", post(send_invoice))
        .route("/invoices/{invoice_id}/settle", post(settle_invoice))
        .route("/invoices/{invoice_id}/cancel", post(cancel_invoice))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for reading invoices.
#[derive(Debug, Deserialize)]
pub struct InvoiceQuery {
    /// Day used to derive overdue status; today when absent.
    pub today: Option<NaiveDate>,
    /// Only invoices of this type.
    pub invoice_type: Option<InvoiceType>,
    /// Only invoices in this effective status.
    pub status: Option<InvoiceStatus>,
}

/// Query parameters for the aging report.
#[derive(Debug, Deserialize)]
pub struct AgingQuery {
    /// Sales for receivables, purchase for payables.
    pub invoice_type: InvoiceType,
    /// Reference date; today when absent.
    pub as_of: Option<NaiveDate>,
}

/// Request body for replacing invoice lines.
#[derive(Debug, Deserialize)]
pub struct UpdateLinesRequest {
    /// New line items.
    pub lines: Vec<InvoiceLineInput>,
    /// New header discount.
    #[serde(default)]
    pub discount_amount: Decimal,
}

/// Request body for cancelling an invoice.
#[derive(Debug, Deserialize)]
pub struct CancelInvoiceRequest {
    /// Why the invoice is cancelled.
    pub reason: String,
    /// Date of the reversing journal; today when absent.
    pub date: Option<NaiveDate>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/invoices` - Invoices with derived status, ordered by number.
async fn list_invoices(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<InvoiceQuery>,
    Query(page): Query<PageRequest>,
) -> Response {
    let day = query.today.unwrap_or_else(today);
    match run(&state, move |engine| engine.list_invoices(day)).await {
        Ok(invoices) => {
            let invoices = invoices
                .into_iter()
                .filter(|v| query.invoice_type.is_none_or(|t| v.invoice.invoice_type == t))
                .filter(|v| query.status.is_none_or(|s| v.effective_status == s))
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(page.paginate(invoices))).into_response()
        }
        Err(response) => response,
    }
}

/// POST `/invoices` - Create a draft invoice.
async fn create_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<NewInvoice>,
) -> Response {
    let user_id = auth.user_id();
    match run(&state, move |engine| engine.create_invoice(payload, Some(user_id))).await {
        Ok(invoice) => {
            info!(invoice_id = %invoice.id, number = %invoice.number, user_id = %user_id, "Invoice created");
            (StatusCode::CREATED, Json(invoice)).into_response()
        }
        Err(response) => response,
    }
}

/// GET `/invoices/{invoice_id}?today=` - One invoice with derived fields.
async fn get_invoice(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(invoice_id): Path<InvoiceId>,
    Query(query): Query<InvoiceQuery>,
) -> Response {
    let day = query.today.unwrap_or_else(today);
    match run(&state, move |engine| engine.invoice_view(invoice_id, day)).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(response) => response,
    }
}

/// PUT `/invoices/{invoice_id}/lines` - Replace lines of a draft.
async fn update_lines(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(invoice_id): Path<InvoiceId>,
    Query(version): Query<VersionQuery>,
    Json(payload): Json<UpdateLinesRequest>,
) -> Response {
    match run(&state, move |engine| {
        engine.update_invoice_lines(
            invoice_id,
            &payload.lines,
            payload.discount_amount,
            version.expected_version,
        )
    })
    .await
    {
        Ok(invoice) => (StatusCode::OK, Json(invoice)).into_response(),
        Err(response) => response,
    }
}

/// POST `/invoices/{invoice_id}/send` - Issue a draft and post it.
async fn send_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<InvoiceId>,
    Query(version): Query<VersionQuery>,
) -> Response {
    match run(&state, move |engine| engine.send_invoice(invoice_id, version.expected_version)).await {
        Ok(invoice) => {
            info!(invoice_id = %invoice_id, user_id = %auth.user_id(), "Invoice sent");
            (StatusCode::OK, Json(invoice)).into_response()
        }
        Err(response) => response,
    }
}

/// POST `/invoices/{invoice_id}/settle` - Mark a fully paid invoice as paid.
async fn settle_invoice(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(invoice_id): Path<InvoiceId>,
    Query(version): Query<VersionQuery>,
) -> Response {
    match run(&state, move |engine| engine.settle_invoice(invoice_id, version.expected_version)).await {
        Ok(invoice) => (StatusCode::OK, Json(invoice)).into_response(),
        Err(response) => response,
    }
}

/// POST `/invoices/{invoice_id}/cancel` - Cancel and reverse the issuance.
async fn cancel_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<InvoiceId>,
    Query(version): Query<VersionQuery>,
    Json(payload): Json<CancelInvoiceRequest>,
) -> Response {
    let date = payload.date.unwrap_or_else(today);
    match run(&state, move |engine| {
        engine.cancel_invoice(invoice_id, &payload.reason, date, version.expected_version)
    })
    .await
    {
        Ok(invoice) => {
            info!(invoice_id = %invoice_id, user_id = %auth.user_id(), "Invoice cancelled");
            (StatusCode::OK, Json(invoice)).into_response()
        }
        Err(response) => response,
    }
}

/// GET `/invoices/aging?invoice_type=&as_of=` - Outstanding by days past due.
async fn get_aging(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<AgingQuery>,
) -> Response {
    let as_of = query.as_of.unwrap_or_else(today);
    match run(&state, move |engine| engine.invoice_aging(query.invoice_type, as_of)).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(response) => response,
    }
}
