//! Payment and receipt routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use finledger_core::FinanceEngine;
use finledger_core::payment::{NewPayment, PaymentStatus, PaymentType};
use finledger_shared::types::{PageRequest, PaymentId};
use serde::Deserialize;
use tracing::info;

use super::{VersionQuery, run};
use crate::{AppState, middleware::AuthUser};

/// Creates the payment routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments).post(create_payment))
        .route("/payments/{payment_id}", get(get_payment))
        .route("/payments/{payment_id}/confirm", post(confirm_payment))
        .route("/payments/{payment_id}/cancel", post(cancel_payment))
}

/// Filter for listing payments.
#[derive(Debug, Deserialize)]
pub struct PaymentFilter {
    /// Receipts or payments only.
    pub payment_type: Option<PaymentType>,
    /// Only payments in this status.
    pub status: Option<PaymentStatus>,
}

/// GET `/payments` - Payments ordered by number.
async fn list_payments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<PaymentFilter>,
    Query(page): Query<PageRequest>,
) -> Response {
    match run(&state, FinanceEngine::list_payments).await {
        Ok(payments) => {
            let payments = payments
                .into_iter()
                .filter(|p| filter.payment_type.is_none_or(|t| p.payment_type == t))
                .filter(|p| filter.status.is_none_or(|s| p.status == s))
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(page.paginate(payments))).into_response()
        }
        Err(response) => response,
    }
}

/// POST `/payments` - Record a pending payment.
async fn create_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<NewPayment>,
) -> Response {
    let user_id = auth.user_id();
    match run(&state, move |engine| engine.create_payment(payload, Some(user_id))).await {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(response) => response,
    }
}

/// GET `/payments/{payment_id}` - One payment.
async fn get_payment(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(payment_id): Path<PaymentId>,
) -> Response {
    match run(&state, move |engine| engine.payment(payment_id)).await {
        Ok(payment) => (StatusCode::OK, Json(payment)).into_response(),
        Err(response) => response,
    }
}

/// POST `/payments/{payment_id}/confirm` - Confirm, apply and post.
async fn confirm_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(payment_id): Path<PaymentId>,
    Query(version): Query<VersionQuery>,
) -> Response {
    let user_id = auth.user_id();
    match run(&state, move |engine| {
        engine.confirm_payment(payment_id, Some(user_id), version.expected_version)
    })
    .await
    {
        Ok(payment) => {
            info!(payment_id = %payment_id, user_id = %user_id, "Payment confirmed via API");
            (StatusCode::OK, Json(payment)).into_response()
        }
        Err(response) => response,
    }
}

/// POST `/payments/{payment_id}/cancel` - Cancel a pending payment.
async fn cancel_payment(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(payment_id): Path<PaymentId>,
    Query(version): Query<VersionQuery>,
) -> Response {
    match run(&state, move |engine| engine.cancel_payment(payment_id, version.expected_version)).await {
        Ok(payment) => (StatusCode::OK, Json(payment)).into_response(),
        Err(response) => response,
    }
}
