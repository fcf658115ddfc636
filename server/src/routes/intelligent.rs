//! Richer conflict routes carrying span, context, and reasoning.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::handlers::{
    handle_intelligent_detect, handle_intelligent_resolve, handle_intelligent_suggest,
    handle_predict, DetectRequest, IntelligentDetectResponse, IntelligentResolveResponse,
    IntelligentSuggestResponse, PredictQuery, ResolveRequest, SuggestQuery,
};
use crate::identity::Identity;
use crate::AppState;
use accord_engine::Prediction;

/// Create intelligent conflict routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/intelligent-conflicts/detect", post(detect_handler))
        .route("/intelligent-conflicts/predict", get(predict_handler))
        .route("/intelligent-conflicts/resolve", post(resolve_handler))
        .route("/intelligent-conflicts/suggest", get(suggest_handler))
}

/// POST /intelligent-conflicts/detect - detection with severity and reasoning.
async fn detect_handler(
    State(state): State<AppState>,
    _identity: Identity,
    Json(request): Json<DetectRequest>,
) -> Result<Json<IntelligentDetectResponse>> {
    let response = handle_intelligent_detect(&state.pool, request).await?;
    Ok(Json(response))
}

/// GET /intelligent-conflicts/predict - conflict likelihood for a section.
async fn predict_handler(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
) -> Result<Json<Prediction>> {
    let prediction = handle_predict(&state.pool, query).await?;
    Ok(Json(prediction))
}

/// POST /intelligent-conflicts/resolve - resolution with reasoning.
async fn resolve_handler(
    State(state): State<AppState>,
    _identity: Identity,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<IntelligentResolveResponse>> {
    let response = handle_intelligent_resolve(&state.pool, &state.resolver, request).await?;
    Ok(Json(response))
}

/// GET /intelligent-conflicts/suggest - suggestion with reasoning.
async fn suggest_handler(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<IntelligentSuggestResponse>> {
    let response = handle_intelligent_suggest(&state.pool, state.suggester.as_ref(), query).await?;
    Ok(Json(response))
}
