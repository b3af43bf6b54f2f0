//! Liveness endpoint.

use axum::{Json, Router, extract::State, routing::get};
use finledger_shared::types::Currency;
use serde::Serialize;

use crate::AppState;

/// Liveness response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `healthy` when the process answers.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Ledger currency.
    pub currency: Currency,
    /// Legs appended so far.
    pub ledger_legs: u64,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        currency: state.engine.config().currency,
        ledger_legs: state.engine.ledger().high_water_mark(),
    })
}

/// `GET /health`, outside authentication.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
