//! Tax routes: calculate, file and pay periodic taxes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use finledger_core::FinanceEngine;
use finledger_core::tax::{TaxCalculation, TaxFiling, TaxStatus, TaxType};
use finledger_shared::types::{AccountId, PageRequest, TaxId};
use serde::Deserialize;
use tracing::info;

use super::{VersionQuery, run, today};
use crate::{AppState, middleware::AuthUser};

/// Creates the tax routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/taxes", get(list_taxes))
        .route("/taxes/calculate", post(calculate_tax))
        .route("/taxes/{tax_id}", get(get_tax))
        .route("/taxes/{tax_id}/file", post(file_tax))
        .route("/taxes/{tax_id}/pay", post(pay_tax))
}

// ============================================================================
// Request Types
// ============================================================================

/// Filter for listing tax records.
#[derive(Debug, Deserialize)]
pub struct TaxFilter {
    /// Only this kind of tax.
    pub tax_type: Option<TaxType>,
    /// Only records in this status.
    pub status: Option<TaxStatus>,
    /// Only this period year.
    pub year: Option<i32>,
    /// Only this period month.
    pub month: Option<u32>,
}

/// Request body for paying a tax.
#[derive(Debug, Default, Deserialize)]
pub struct PayTaxRequest {
    /// Cash account credited; the configured default when absent.
    pub cash_account: Option<AccountId>,
    /// Payment date; today when absent.
    pub date: Option<NaiveDate>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/taxes` - Tax records, latest period first.
async fn list_taxes(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<TaxFilter>,
    Query(page): Query<PageRequest>,
) -> Response {
    match run(&state, FinanceEngine::list_taxes).await {
        Ok(taxes) => {
            let taxes = taxes
                .into_iter()
                .filter(|t| filter.tax_type.is_none_or(|k| t.tax_type == k))
                .filter(|t| filter.status.is_none_or(|s| t.status == s))
                .filter(|t| filter.year.is_none_or(|y| t.period_year == y))
                .filter(|t| filter.month.is_none_or(|m| t.period_month == m))
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(page.paginate(taxes))).into_response()
        }
        Err(response) => response,
    }
}

/// POST `/taxes/calculate` - Compute a tax for one month.
async fn calculate_tax(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TaxCalculation>,
) -> Response {
    let user_id = auth.user_id();
    match run(&state, move |engine| engine.calculate_tax(payload, Some(user_id))).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(response) => response,
    }
}

/// GET `/taxes/{tax_id}` - One tax record.
async fn get_tax(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(tax_id): Path<TaxId>,
) -> Response {
    match run(&state, move |engine| engine.tax(tax_id)).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(response) => response,
    }
}

/// POST `/taxes/{tax_id}/file` - calculated → filed.
async fn file_tax(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(tax_id): Path<TaxId>,
    Query(version): Query<VersionQuery>,
    Json(payload): Json<TaxFiling>,
) -> Response {
    match run(&state, move |engine| engine.file_tax(tax_id, payload, version.expected_version)).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(response) => response,
    }
}

/// POST `/taxes/{tax_id}/pay` - filed → paid, posting the remittance.
async fn pay_tax(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tax_id): Path<TaxId>,
    Query(version): Query<VersionQuery>,
    payload: Option<Json<PayTaxRequest>>,
) -> Response {
    let Json(payload) = payload.unwrap_or_default();
    let date = payload.date.unwrap_or_else(today);
    match run(&state, move |engine| {
        engine.pay_tax(tax_id, payload.cash_account, date, version.expected_version)
    })
    .await
    {
        Ok(record) => {
            info!(tax_id = %tax_id, user_id = %auth.user_id(), "Tax paid via API");
            (StatusCode::OK, Json(record)).into_response()
        }
        Err(response) => response,
    }
}
