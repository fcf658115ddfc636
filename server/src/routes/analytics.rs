//! Analytics and cache-control routes.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::handlers::{
    handle_analytics, handle_document_stats, handle_invalidate, handle_timeline,
    handle_user_stats, AnalyticsQuery, DocumentStatsQuery, InvalidateRequest, InvalidateResponse,
    UserStatsQuery,
};
use crate::AppState;
use accord_engine::{ConflictAnalytics, ConflictTimeline, DocumentConflictStats, UserConflictStats};

/// Create analytics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/conflict-analytics", get(analytics_handler))
        .route("/conflict-timeline", get(timeline_handler))
        .route("/user-conflict-stats", get(user_stats_handler))
        .route("/document-conflict-stats", get(document_stats_handler))
        .route("/invalidate-cache", post(invalidate_handler))
}

/// GET /conflict-analytics - windowed counts and strategy distribution.
async fn analytics_handler(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ConflictAnalytics>> {
    let snapshot = handle_analytics(&state.pool, state.cache.as_ref(), query).await?;
    Ok(Json(snapshot))
}

/// GET /conflict-timeline - time-bucketed conflict counts.
async fn timeline_handler(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ConflictTimeline>> {
    let snapshot = handle_timeline(&state.pool, state.cache.as_ref(), query).await?;
    Ok(Json(snapshot))
}

/// GET /user-conflict-stats - involvement stats for one user.
async fn user_stats_handler(
    State(state): State<AppState>,
    Query(query): Query<UserStatsQuery>,
) -> Result<Json<UserConflictStats>> {
    let snapshot = handle_user_stats(&state.pool, state.cache.as_ref(), query).await?;
    Ok(Json(snapshot))
}

/// GET /document-conflict-stats - stats for one document.
async fn document_stats_handler(
    State(state): State<AppState>,
    Query(query): Query<DocumentStatsQuery>,
) -> Result<Json<DocumentConflictStats>> {
    let snapshot = handle_document_stats(&state.pool, state.cache.as_ref(), query).await?;
    Ok(Json(snapshot))
}

/// POST /invalidate-cache - explicit invalidation by scope.
async fn invalidate_handler(
    State(state): State<AppState>,
    Json(request): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    let response = handle_invalidate(state.cache.as_ref(), request)?;
    Ok(Json(response))
}
