//! Ledger posting and journal routes.
//!
//! Transactions are never edited or deleted: corrections go through
//! `POST /journals/{id}/reverse`, which appends offsetting legs.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use finledger_core::ledger::{JournalInput, PostingInput};
use finledger_shared::types::{AccountId, JournalId, PageRequest};
use serde::Deserialize;
use tracing::info;

use super::{run, today};
use crate::{AppState, middleware::AuthUser};

/// Creates the ledger routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(post_transaction))
        .route("/journals", post(post_journal))
        .route("/journals/{journal_id}", get(get_journal))
        .route("/journals/{journal_id}/reverse", post(reverse_journal))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    /// First day included; open when absent.
    pub start: Option<NaiveDate>,
    /// Last day included; today when absent.
    pub end: Option<NaiveDate>,
    /// Only legs on this account, or on the leaves under it.
    pub account_id: Option<AccountId>,
}

/// Request body for reversing a journal.
#[derive(Debug, Deserialize)]
pub struct ReverseJournalRequest {
    /// Accounting date of the reversal; today when absent.
    pub date: Option<NaiveDate>,
    /// Why the journal is reversed.
    pub reason: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/transactions` - Post one leg against a contra account.
async fn post_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PostingInput>,
) -> Response {
    match run(&state, move |engine| engine.post_transaction(payload)).await {
        Ok(entry) => {
            info!(journal_id = %entry.id, user_id = %auth.user_id(), "Transaction posted");
            (StatusCode::CREATED, Json(entry)).into_response()
        }
        Err(response) => response,
    }
}

/// GET `/transactions?start=&end=&account_id=` - Legs by date range.
async fn list_transactions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<TransactionsQuery>,
    Query(page): Query<PageRequest>,
) -> Response {
    let end = query.end.unwrap_or_else(today);
    match run(&state, move |engine| {
        engine.transactions(query.start, end, query.account_id)
    })
    .await
    {
        Ok(legs) => (StatusCode::OK, Json(page.paginate(legs))).into_response(),
        Err(response) => response,
    }
}

/// POST `/journals` - Post a balanced compound journal.
async fn post_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<JournalInput>,
) -> Response {
    match run(&state, move |engine| engine.post_journal(payload)).await {
        Ok(entry) => {
            info!(
                journal_id = %entry.id,
                legs = entry.transactions.len(),
                user_id = %auth.user_id(),
                "Journal posted"
            );
            (StatusCode::CREATED, Json(entry)).into_response()
        }
        Err(response) => response,
    }
}

/// GET `/journals/{journal_id}` - Legs of one journal.
async fn get_journal(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(journal_id): Path<JournalId>,
) -> Response {
    match run(&state, move |engine| engine.journal(journal_id)).await {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(response) => response,
    }
}

/// POST `/journals/{journal_id}/reverse` - Append the offsetting journal.
async fn reverse_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(journal_id): Path<JournalId>,
    Json(payload): Json<ReverseJournalRequest>,
) -> Response {
    let date = payload.date.unwrap_or_else(today);
    match run(&state, move |engine| {
        engine.reverse_journal(journal_id, date, &payload.reason)
    })
    .await
    {
        Ok(entry) => {
            info!(
                journal_id = %journal_id,
                reversal_id = %entry.id,
                user_id = %auth.user_id(),
                "Journal reversed"
            );
            (StatusCode::CREATED, Json(entry)).into_response()
        }
        Err(response) => response,
    }
}
