//! API route definitions.

use std::sync::Arc;

use axum::{Router, middleware, response::Response};
use chrono::{NaiveDate, Utc};
use finledger_core::{EngineError, FinanceEngine};
use serde::Deserialize;
use tracing::error;

use crate::error::{engine_error_response, internal_error};
use crate::{AppState, middleware::auth::auth_middleware};

pub mod accounts;
pub mod budgets;
pub mod dashboard;
pub mod expenses;
pub mod health;
pub mod invoices;
pub mod payments;
pub mod reports;
pub mod taxes;
pub mod transactions;

/// Creates the API router; everything but health requires a bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(invoices::routes())
        .merge(payments::routes())
        .merge(expenses::routes())
        .merge(budgets::routes())
        .merge(taxes::routes())
        .merge(reports::routes())
        .merge(dashboard::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

// ============================================================================
// Shared query parameters
// ============================================================================

/// `?as_of=` defaulting to today.
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    /// Reference date.
    pub as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    /// The requested date or today.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(today)
    }
}

/// `?start=&end=` for period reports.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// First day included.
    pub start: NaiveDate,
    /// Last day included.
    pub end: NaiveDate,
}

/// `?expected_version=` for optimistic concurrency on mutations.
#[derive(Debug, Default, Deserialize)]
pub struct VersionQuery {
    /// Version the caller last read; stale versions are rejected with 409.
    pub expected_version: Option<u64>,
}

/// Current UTC date.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Runs an engine call off the async runtime.
///
/// Engine operations wait on aggregate locks for a bounded time, so they run
/// on the blocking pool. Errors come back already rendered.
pub(crate) async fn run<T, F>(state: &AppState, f: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&FinanceEngine) -> Result<T, EngineError> + Send + 'static,
{
    let engine = Arc::clone(&state.engine);
    match tokio::task::spawn_blocking(move || f(&engine)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(engine_error_response(&e)),
        Err(e) => {
            error!(error = %e, "Engine task failed");
            Err(internal_error())
        }
    }
}
