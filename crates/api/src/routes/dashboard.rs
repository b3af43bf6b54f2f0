//! Dashboard routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use super::{AsOfQuery, run};
use crate::{AppState, middleware::AuthUser};

/// Creates the dashboard routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// GET `/dashboard?as_of=` - Receivables, payables, expenses, budgets and cash.
async fn get_dashboard(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<AsOfQuery>,
) -> Response {
    let as_of = query.date();
    match run(&state, move |engine| engine.dashboard(as_of)).await {
        Ok(metrics) => (StatusCode::OK, Json(metrics)).into_response(),
        Err(response) => response,
    }
}
