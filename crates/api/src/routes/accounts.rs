//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use finledger_core::ledger::{AccountType, NewAccount};
use finledger_shared::types::{AccountId, PageRequest};
use serde::Deserialize;
use tracing::info;

use super::{AsOfQuery, run};
use crate::{AppState, middleware::AuthUser};

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{account_id}", get(get_account))
        .route("/accounts/{account_id}/balance", get(get_account_balance))
}

/// Filter for listing accounts.
#[derive(Debug, Deserialize)]
pub struct AccountFilter {
    /// Only accounts of this type.
    pub account_type: Option<AccountType>,
}

/// GET `/accounts` - Chart of accounts in code order.
async fn list_accounts(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<AccountFilter>,
    Query(page): Query<PageRequest>,
) -> Response {
    let accounts = state
        .engine
        .accounts()
        .into_iter()
        .filter(|a| filter.account_type.is_none_or(|t| a.account_type == t))
        .collect::<Vec<_>>();

    (StatusCode::OK, Json(page.paginate(accounts))).into_response()
}

/// POST `/accounts` - Add an account to the chart.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<NewAccount>,
) -> Response {
    match run(&state, move |engine| engine.add_account(payload)).await {
        Ok(account) => {
            info!(
                account_id = %account.id,
                code = %account.code,
                user_id = %auth.user_id(),
                "Account created"
            );
            (StatusCode::CREATED, Json(account)).into_response()
        }
        Err(response) => response,
    }
}

/// GET `/accounts/{account_id}` - One account.
async fn get_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(account_id): Path<AccountId>,
) -> Response {
    match run(&state, move |engine| engine.account(account_id)).await {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(response) => response,
    }
}

/// GET `/accounts/{account_id}/balance?as_of=` - Balance on the normal side.
///
/// Headers report the sum of their leaves. Without `as_of` every posting
/// counts.
async fn get_account_balance(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(account_id): Path<AccountId>,
    Query(query): Query<AsOfQuery>,
) -> Response {
    match run(&state, move |engine| engine.account_balance(account_id, query.as_of)).await {
        Ok(balance) => (StatusCode::OK, Json(balance)).into_response(),
        Err(response) => response,
    }
}
