//! Operation log routes.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::error::Result;
use crate::handlers::{
    handle_list_operations, handle_log_operation, LogOperationRequest, OperationsQuery,
    OperationsResponse,
};
use crate::identity::Identity;
use crate::AppState;
use accord_engine::EditOp;

/// Create operation log routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/operations", get(list_handler).post(log_handler))
}

/// POST /operations - append an edit operation to the log.
async fn log_handler(
    State(state): State<AppState>,
    _identity: Identity,
    Json(request): Json<LogOperationRequest>,
) -> Result<Json<EditOp>> {
    let operation = handle_log_operation(&state.pool, request).await?;
    Ok(Json(operation))
}

/// GET /operations - operation history for a document section.
async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<OperationsQuery>,
) -> Result<Json<OperationsResponse>> {
    let response = handle_list_operations(&state.pool, query).await?;
    Ok(Json(response))
}
