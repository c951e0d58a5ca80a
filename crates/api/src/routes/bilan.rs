//! Balance-sheet routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use bilan_core::ledger::ProjectId;
use bilan_core::statement::{BilanBuilder, Statement, render_table, to_csv};
use bilan_shared::{AppError, AppResult};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::AppState;

/// Creates the balance-sheet routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/generate-bilan", get(generate_bilan))
        .route("/projects/{project_id}/bilan", get(get_bilan))
        .route("/projects/{project_id}/bilan/table", get(get_bilan_table))
        .route("/projects/{project_id}/bilan/export", get(export_bilan))
}

/// Query parameters for balance-sheet generation.
#[derive(Debug, Deserialize)]
pub struct GenerateBilanQuery {
    /// Project whose ledger is summarized.
    pub project_id: Option<String>,
}

/// GET `/generate-bilan?project_id=` - Statement as JSON.
async fn generate_bilan(
    State(state): State<AppState>,
    Query(query): Query<GenerateBilanQuery>,
) -> Response {
    let Some(raw) = query.project_id else {
        return error_response(&AppError::Validation(
            "project_id query parameter is required".to_string(),
        ));
    };

    match build_statement(&state, &raw).await {
        Ok((_, statement)) => (StatusCode::OK, Json(statement)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/projects/{project_id}/bilan` - Statement as JSON.
async fn get_bilan(State(state): State<AppState>, Path(project_id): Path<String>) -> Response {
    match build_statement(&state, &project_id).await {
        Ok((_, statement)) => (StatusCode::OK, Json(statement)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/projects/{project_id}/bilan/table` - Statement as a text grid.
async fn get_bilan_table(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Response {
    match build_statement(&state, &project_id).await {
        Ok((_, statement)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            render_table(&statement),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/projects/{project_id}/bilan/export` - Statement as a CSV download.
async fn export_bilan(State(state): State<AppState>, Path(project_id): Path<String>) -> Response {
    let (project_id, statement) = match build_statement(&state, &project_id).await {
        Ok(built) => built,
        Err(e) => return error_response(&e),
    };

    match to_csv(&statement) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"bilan_{project_id}.csv\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => error_response(&AppError::Internal(format!("CSV export failed: {e}"))),
    }
}

/// Validates the project id, loads its ledger and builds the statement.
async fn build_statement(state: &AppState, raw: &str) -> AppResult<(ProjectId, Statement)> {
    let project_id = ProjectId::parse(raw).map_err(AppError::Validation)?;
    let rows = state.source.load(&project_id).await?;

    let statement = BilanBuilder::default()
        .with_debt_policy(state.debt_policy)
        .build(&rows);
    info!(project_id = %project_id, rows = rows.len(), "Generated balance sheet");

    Ok((project_id, statement))
}

/// Maps an application error to a JSON error response.
fn error_response(err: &AppError) -> Response {
    if err.status_code() >= 500 {
        error!(error = %err, "Failed to generate balance sheet");
    }
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.public_message()
        })),
    )
        .into_response()
}
