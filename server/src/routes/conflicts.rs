//! Conflict workflow routes.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::Result;
use crate::handlers::{
    self, handle_detect, handle_resolve, handle_suggest, DetectRequest, ResolveRequest,
    SuggestQuery, SuggestResponse,
};
use crate::identity::Identity;
use crate::AppState;
use accord_engine::Conflict;

/// Create conflict workflow routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/conflicts", get(history_handler))
        .route("/conflicts/detect", post(detect_handler))
        .route("/conflicts/resolve", post(resolve_handler))
        .route("/conflicts/suggest", get(suggest_handler))
}

/// Query parameters for conflict history.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub document_id: Option<String>,
}

/// Conflict history response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub conflicts: Vec<Conflict>,
}

/// POST /conflicts/detect - compare two users' section contents.
async fn detect_handler(
    State(state): State<AppState>,
    _identity: Identity,
    Json(request): Json<DetectRequest>,
) -> Result<Json<Option<Conflict>>> {
    let conflict = handle_detect(&state.pool, request).await?;
    Ok(Json(conflict))
}

/// GET /conflicts - conflict history for a document.
async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    let document_id =
        handlers::require_field(query.document_id.as_deref().unwrap_or(""), "documentId")?;

    let rows = db::conflicts_for_document(&state.pool, document_id).await?;
    let mut conflicts = Vec::with_capacity(rows.len());
    for row in &rows {
        match row.to_conflict() {
            Ok(conflict) => conflicts.push(conflict),
            Err(e) => {
                tracing::warn!("Failed to convert stored conflict {}: {}", row.id, e);
                // Skip invalid conflicts
            }
        }
    }

    Ok(Json(HistoryResponse { conflicts }))
}

/// POST /conflicts/resolve - apply a terminal strategy.
async fn resolve_handler(
    State(state): State<AppState>,
    _identity: Identity,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<Conflict>> {
    let resolved = handle_resolve(&state.pool, &state.resolver, request).await?;
    Ok(Json(resolved))
}

/// GET /conflicts/suggest - advisory resolution hint.
async fn suggest_handler(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>> {
    let response = handle_suggest(&state.pool, state.suggester.as_ref(), query).await?;
    Ok(Json(response))
}
