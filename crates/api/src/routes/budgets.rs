//! Budget management routes.
//!
//! Utilization responses carry a severity band per budget and per line. The
//! thresholds are a display policy and are not part of the engine.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use finledger_core::FinanceEngine;
use finledger_core::budget::{BudgetLine, BudgetStatus, BudgetUtilization, NewBudget};
use finledger_shared::types::{AccountId, BudgetId, PageRequest};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AsOfQuery, VersionQuery, run, today};
use crate::{AppState, middleware::AuthUser};

/// Creates the budget routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route("/budgets/{budget_id}", get(get_budget))
        .route("/budgets/{budget_id}/lines", put(update_budget_lines))
        .route("/budgets/{budget_id}/approve", post(approve_budget))
        .route("/budgets/{budget_id}/activate", post(activate_budget))
        .route("/budgets/{budget_id}/close", post(close_budget))
        .route("/budgets/{budget_id}/utilization", get(get_utilization))
}

// ============================================================================
// Utilization Bands
// ============================================================================

/// Severity of a utilization percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationBand {
    /// Below 70%.
    Normal,
    /// 70% up to 90%.
    Warning,
    /// 90% up to 100%.
    Critical,
    /// 100% or more.
    OverBudget,
}

impl UtilizationBand {
    /// Band for a utilization percentage.
    #[must_use]
    pub fn for_percentage(percentage: Decimal) -> Self {
        if percentage < Decimal::from(70) {
            Self::Normal
        } else if percentage < Decimal::from(90) {
            Self::Warning
        } else if percentage < Decimal::ONE_HUNDRED {
            Self::Critical
        } else {
            Self::OverBudget
        }
    }
}

/// Band of one budget line.
#[derive(Debug, Serialize)]
pub struct LineBand {
    /// Line account.
    pub account_id: AccountId,
    /// Line severity.
    pub band: UtilizationBand,
}

/// Utilization with display bands.
#[derive(Debug, Serialize)]
pub struct UtilizationResponse {
    /// Engine figures.
    #[serde(flatten)]
    pub utilization: BudgetUtilization,
    /// Severity of the whole budget.
    pub band: UtilizationBand,
    /// Severity of each line, in line order.
    pub line_bands: Vec<LineBand>,
}

impl From<BudgetUtilization> for UtilizationResponse {
    fn from(utilization: BudgetUtilization) -> Self {
        let band = UtilizationBand::for_percentage(utilization.utilization_percentage);
        let line_bands = utilization
            .lines
            .iter()
            .map(|line| LineBand {
                account_id: line.account_id,
                band: UtilizationBand::for_percentage(line.utilization_percentage),
            })
            .collect();

        Self {
            utilization,
            band,
            line_bands,
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// Filter for listing budgets.
#[derive(Debug, Deserialize)]
pub struct BudgetFilter {
    /// Only budgets in this status.
    pub status: Option<BudgetStatus>,
    /// Only budgets of this fiscal year.
    pub fiscal_year: Option<i32>,
}

/// Request body for replacing budget lines.
#[derive(Debug, Deserialize)]
pub struct UpdateBudgetLinesRequest {
    /// New lines.
    pub lines: Vec<BudgetLine>,
}

/// Request body for closing a budget.
#[derive(Debug, Default, Deserialize)]
pub struct CloseBudgetRequest {
    /// Close date; today when absent.
    pub date: Option<NaiveDate>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/budgets` - Budgets ordered by period start.
async fn list_budgets(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<BudgetFilter>,
    Query(page): Query<PageRequest>,
) -> Response {
    match run(&state, FinanceEngine::list_budgets).await {
        Ok(budgets) => {
            let budgets = budgets
                .into_iter()
                .filter(|b| filter.status.is_none_or(|s| b.status == s))
                .filter(|b| filter.fiscal_year.is_none_or(|y| b.fiscal_year == y))
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(page.paginate(budgets))).into_response()
        }
        Err(response) => response,
    }
}

/// POST `/budgets` - Create a draft budget.
async fn create_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<NewBudget>,
) -> Response {
    let user_id = auth.user_id();
    match run(&state, move |engine| engine.create_budget(payload, Some(user_id))).await {
        Ok(budget) => {
            info!(budget_id = %budget.id, user_id = %user_id, "Budget created via API");
            (StatusCode::CREATED, Json(budget)).into_response()
        }
        Err(response) => response,
    }
}

/// GET `/budgets/{budget_id}` - One budget.
async fn get_budget(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(budget_id): Path<BudgetId>,
) -> Response {
    match run(&state, move |engine| engine.budget(budget_id)).await {
        Ok(budget) => (StatusCode::OK, Json(budget)).into_response(),
        Err(response) => response,
    }
}

/// PUT `/budgets/{budget_id}/lines` - Replace lines of a draft.
async fn update_budget_lines(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(budget_id): Path<BudgetId>,
    Query(version): Query<VersionQuery>,
    Json(payload): Json<UpdateBudgetLinesRequest>,
) -> Response {
    match run(&state, move |engine| {
        engine.update_budget_lines(budget_id, payload.lines, version.expected_version)
    })
    .await
    {
        Ok(budget) => (StatusCode::OK, Json(budget)).into_response(),
        Err(response) => response,
    }
}

/// POST `/budgets/{budget_id}/approve` - draft → approved.
async fn approve_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_id): Path<BudgetId>,
    Query(version): Query<VersionQuery>,
) -> Response {
    let approver = auth.user_id();
    match run(&state, move |engine| {
        engine.approve_budget(budget_id, Some(approver), version.expected_version)
    })
    .await
    {
        Ok(budget) => (StatusCode::OK, Json(budget)).into_response(),
        Err(response) => response,
    }
}

/// POST `/budgets/{budget_id}/activate` - approved → active.
async fn activate_budget(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(budget_id): Path<BudgetId>,
    Query(version): Query<VersionQuery>,
) -> Response {
    match run(&state, move |engine| engine.activate_budget(budget_id, version.expected_version)).await {
        Ok(budget) => (StatusCode::OK, Json(budget)).into_response(),
        Err(response) => response,
    }
}

/// POST `/budgets/{budget_id}/close` - active → closed.
async fn close_budget(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(budget_id): Path<BudgetId>,
    Query(version): Query<VersionQuery>,
    payload: Option<Json<CloseBudgetRequest>>,
) -> Response {
    let Json(payload) = payload.unwrap_or_default();
    let date = payload.date.unwrap_or_else(today);
    match run(&state, move |engine| {
        engine.close_budget(budget_id, date, version.expected_version)
    })
    .await
    {
        Ok(budget) => (StatusCode::OK, Json(budget)).into_response(),
        Err(response) => response,
    }
}

/// GET `/budgets/{budget_id}/utilization?as_of=` - Spend against allocation.
async fn get_utilization(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(budget_id): Path<BudgetId>,
    Query(query): Query<AsOfQuery>,
) -> Response {
    let as_of = query.date();
    match run(&state, move |engine| engine.budget_utilization(budget_id, as_of)).await {
        Ok(utilization) => {
            (StatusCode::OK, Json(UtilizationResponse::from(utilization))).into_response()
        }
        Err(response) => response,
    }
}
