//! Report routes.
//!
//! Reports are computed from a ledger snapshot taken at request time, so a
//! report never mixes legs from before and after a concurrent posting.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::debug;

use super::{AsOfQuery, RangeQuery, run};
use crate::{AppState, middleware::AuthUser};

/// Creates the report routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/trial-balance", get(get_trial_balance))
        .route("/reports/balance-sheet", get(get_balance_sheet))
        .route("/reports/profit-loss", get(get_profit_loss))
        .route("/reports/cash-flow", get(get_cash_flow))
        .route("/reports/expense-by-category", get(get_expense_by_category))
        .route("/reports/revenue-expense-trend", get(get_revenue_expense_trend))
}

/// GET `/reports/trial-balance?as_of=`
async fn get_trial_balance(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<AsOfQuery>,
) -> Response {
    let as_of = query.date();
    match run(&state, move |engine| engine.trial_balance(as_of)).await {
        Ok(report) => {
            debug!(as_of = %as_of, balanced = report.trial_balance.is_balanced, "Trial balance generated");
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(response) => response,
    }
}

/// GET `/reports/balance-sheet?as_of=`
async fn get_balance_sheet(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<AsOfQuery>,
) -> Response {
    let as_of = query.date();
    match run(&state, move |engine| engine.balance_sheet(as_of)).await {
        Ok(report) => {
            debug!(as_of = %as_of, balanced = report.is_balanced, "Balance sheet generated");
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(response) => response,
    }
}

/// GET `/reports/profit-loss?start=&end=`
async fn get_profit_loss(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(range): Query<RangeQuery>,
) -> Response {
    match run(&state, move |engine| engine.profit_and_loss(range.start, range.end)).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(response) => response,
    }
}

/// GET `/reports/cash-flow?start=&end=`
async fn get_cash_flow(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(range): Query<RangeQuery>,
) -> Response {
    match run(&state, move |engine| engine.cash_flow(range.start, range.end)).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(response) => response,
    }
}

/// GET `/reports/expense-by-category?start=&end=`
async fn get_expense_by_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(range): Query<RangeQuery>,
) -> Response {
    match run(&state, move |engine| engine.expense_by_category(range.start, range.end)).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(response) => response,
    }
}

/// GET `/reports/revenue-expense-trend?start=&end=`
async fn get_revenue_expense_trend(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(range): Query<RangeQuery>,
) -> Response {
    match run(&state, move |engine| engine.revenue_expense_trend(range.start, range.end)).await {
        Ok(report) => {
            debug!(months = report.months.len(), "Revenue and expense trend generated");
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(response) => response,
    }
}
