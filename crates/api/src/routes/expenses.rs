//! Expense approval routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use finledger_core::FinanceEngine;
use finledger_core::expense::{ExpenseStatus, ExpenseUpdate, NewExpense};
use finledger_shared::types::{AccountId, ExpenseId, PageRequest};
use serde::Deserialize;
use tracing::info;

use super::{VersionQuery, run, today};
use crate::{AppState, middleware::AuthUser};

/// Creates the expense routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/{expense_id}", get(get_expense).put(update_expense))
        .route("/expenses/{expense_id}/submit", post(submit_expense))
        .route("/expenses/{expense_id}/approve", post(approve_expense))
        .route("/expenses/{expense_id}/reject", post(reject_expense))
        .route("/expenses/{expense_id}/pay", post(pay_expense))
}

// ============================================================================
// Request Types
// ============================================================================

/// Filter for listing expenses.
#[derive(Debug, Deserialize)]
pub struct ExpenseFilter {
    /// Only expenses in this status.
    pub status: Option<ExpenseStatus>,
}

/// Request body for approving an expense.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveExpenseRequest {
    /// Approver notes.
    pub notes: Option<String>,
}

/// Request body for rejecting an expense.
#[derive(Debug, Deserialize)]
pub struct RejectExpenseRequest {
    /// Required reason.
    pub reason: String,
}

/// Request body for paying an expense.
#[derive(Debug, Default, Deserialize)]
pub struct PayExpenseRequest {
    /// Cash account credited; the configured default when absent.
    pub cash_account: Option<AccountId>,
    /// Payment date; today when absent.
    pub date: Option<NaiveDate>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/expenses` - Expenses ordered by number.
async fn list_expenses(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<ExpenseFilter>,
    Query(page): Query<PageRequest>,
) -> Response {
    match run(&state, FinanceEngine::list_expenses).await {
        Ok(expenses) => {
            let expenses = expenses
                .into_iter()
                .filter(|e| filter.status.is_none_or(|s| e.status == s))
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(page.paginate(expenses))).into_response()
        }
        Err(response) => response,
    }
}

/// POST `/expenses` - Record a draft expense for the caller.
async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<NewExpense>,
) -> Response {
    let user_id = auth.user_id();
    match run(&state, move |engine| engine.create_expense(payload, Some(user_id))).await {
        Ok(expense) => (StatusCode::CREATED, Json(expense)).into_response(),
        Err(response) => response,
    }
}

/// GET `/expenses/{expense_id}` - One expense.
async fn get_expense(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    match run(&state, move |engine| engine.expense(expense_id)).await {
        Ok(expense) => (StatusCode::OK, Json(expense)).into_response(),
        Err(response) => response,
    }
}

/// PUT `/expenses/{expense_id}` - Edit a draft.
async fn update_expense(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(expense_id): Path<ExpenseId>,
    Query(version): Query<VersionQuery>,
    Json(payload): Json<ExpenseUpdate>,
) -> Response {
    match run(&state, move |engine| {
        engine.update_expense(expense_id, payload, version.expected_version)
    })
    .await
    {
        Ok(expense) => (StatusCode::OK, Json(expense)).into_response(),
        Err(response) => response,
    }
}

/// POST `/expenses/{expense_id}/submit` - draft → submitted.
async fn submit_expense(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(expense_id): Path<ExpenseId>,
    Query(version): Query<VersionQuery>,
) -> Response {
    match run(&state, move |engine| engine.submit_expense(expense_id, version.expected_version)).await {
        Ok(expense) => (StatusCode::OK, Json(expense)).into_response(),
        Err(response) => response,
    }
}

/// POST `/expenses/{expense_id}/approve` - submitted → approved, accruing it.
async fn approve_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<ExpenseId>,
    Query(version): Query<VersionQuery>,
    payload: Option<Json<ApproveExpenseRequest>>,
) -> Response {
    let approver = auth.user_id();
    let Json(payload) = payload.unwrap_or_default();
    match run(&state, move |engine| {
        engine.approve_expense(expense_id, Some(approver), payload.notes, version.expected_version)
    })
    .await
    {
        Ok(expense) => {
            info!(expense_id = %expense_id, approver = %approver, role = auth.role(), "Expense approved via API");
            (StatusCode::OK, Json(expense)).into_response()
        }
        Err(response) => response,
    }
}

/// POST `/expenses/{expense_id}/reject` - submitted → rejected.
async fn reject_expense(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(expense_id): Path<ExpenseId>,
    Query(version): Query<VersionQuery>,
    Json(payload): Json<RejectExpenseRequest>,
) -> Response {
    match run(&state, move |engine| {
        engine.reject_expense(expense_id, &payload.reason, version.expected_version)
    })
    .await
    {
        Ok(expense) => (StatusCode::OK, Json(expense)).into_response(),
        Err(response) => response,
    }
}

/// POST `/expenses/{expense_id}/pay` - approved → paid.
async fn pay_expense(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(expense_id): Path<ExpenseId>,
    Query(version): Query<VersionQuery>,
    payload: Option<Json<PayExpenseRequest>>,
) -> Response {
    let Json(payload) = payload.unwrap_or_default();
    let date = payload.date.unwrap_or_else(today);
    match run(&state, move |engine| {
        engine.pay_expense(expense_id, payload.cash_account, date, version.expected_version)
    })
    .await
    {
        Ok(expense) => (StatusCode::OK, Json(expense)).into_response(),
        Err(response) => response,
    }
}
