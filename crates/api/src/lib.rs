//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST routes for balance-sheet generation
//! - JSON error responses
//! - Panic recovery

pub mod routes;

use std::any::Any;
use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bilan_core::source::LedgerSource;
use bilan_shared::DebtPolicy;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Where project ledgers are loaded from.
    pub source: Arc<dyn LedgerSource>,
    /// Payables accumulation policy.
    pub debt_policy: DebtPolicy,
}

impl AppState {
    /// Creates the state over a ledger source.
    pub fn new(source: Arc<dyn LedgerSource>, debt_policy: DebtPolicy) -> Self {
        Self {
            source,
            debt_policy,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods(AnyOrigin)
                .allow_headers(AnyOrigin),
        )
        .with_state(state)
}

#[allow(clippy::needless_pass_by_value)]
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
