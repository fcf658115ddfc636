//! Suggestion handlers - advisory resolution hints.

use crate::db;
use crate::error::{AppError, Result};
use crate::handlers::require_field;
use accord_engine::Suggester;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Query parameters for a resolution suggestion.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestQuery {
    pub conflict_id: Option<String>,
    pub user_id: Option<String>,
}

/// Response carrying a suggestion, or null when none applies.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResponse {
    pub suggestion: Option<String>,
}

/// Response for the richer suggestion variant.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelligentSuggestResponse {
    pub suggestion: Option<String>,
    pub reasoning: String,
}

/// Produce an advisory hint for a pending conflict. Never mutates state.
pub async fn handle_suggest(
    pool: &PgPool,
    suggester: &dyn Suggester,
    query: SuggestQuery,
) -> Result<SuggestResponse> {
    let conflict_id = require_field(query.conflict_id.as_deref().unwrap_or(""), "conflictId")?;

    let stored = db::get_conflict(pool, conflict_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Conflict {conflict_id} not found")))?;
    let conflict = stored.to_conflict().map_err(AppError::Internal)?;

    let user_id = query.user_id.as_deref().unwrap_or("");
    Ok(SuggestResponse {
        suggestion: suggester.suggest(&conflict, user_id),
    })
}

/// Richer suggestion variant: same hint, plus reasoning about why one was or
/// was not produced.
pub async fn handle_intelligent_suggest(
    pool: &PgPool,
    suggester: &dyn Suggester,
    query: SuggestQuery,
) -> Result<IntelligentSuggestResponse> {
    let conflict_id = query.conflict_id.clone().unwrap_or_default();
    let response = handle_suggest(pool, suggester, query).await?;

    let reasoning = match &response.suggestion {
        Some(_) => "derived from the shape of both pending contents".to_string(),
        None => format!("conflict {conflict_id} is already resolved"),
    };

    Ok(IntelligentSuggestResponse {
        suggestion: response.suggestion,
        reasoning,
    })
}
