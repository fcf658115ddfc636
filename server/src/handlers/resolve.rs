//! Resolution handlers - applying terminal strategies to conflicts.

use crate::db;
use crate::error::{AppError, Result};
use crate::handlers::{now_ms, require_field};
use accord_engine::{Conflict, ResolutionStrategy, Resolver};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Request body for conflict resolution.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub conflict_id: String,
    /// Strategy to apply
    pub resolution: ResolutionStrategy,
    /// Required when `resolution` is `custom`
    pub custom_content: Option<String>,
    pub resolved_by: String,
}

/// Response for the richer resolution variant.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelligentResolveResponse {
    pub conflict: Conflict,
    pub reasoning: String,
}

/// Apply a terminal strategy to a pending conflict.
///
/// The store's `resolved = FALSE` write guard backs up the engine check, so
/// two racing resolvers cannot both succeed; the loser gets the same
/// already-resolved error as a late caller.
pub async fn handle_resolve(
    pool: &PgPool,
    resolver: &Resolver,
    request: ResolveRequest,
) -> Result<Conflict> {
    let conflict_id = require_field(&request.conflict_id, "conflictId")?;
    let resolved_by = require_field(&request.resolved_by, "resolvedBy")?;

    let stored = db::get_conflict(pool, conflict_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Conflict {conflict_id} not found")))?;
    let conflict = stored.to_conflict().map_err(AppError::Internal)?;

    let resolved = resolver.resolve(
        conflict,
        request.resolution,
        request.custom_content.as_deref(),
        resolved_by,
        now_ms(),
    )?;

    let resolution = resolved
        .resolution
        .clone()
        .ok_or_else(|| AppError::Internal("resolver returned no resolution".to_string()))?;

    if !db::mark_resolved(pool, &resolved.id, &resolution).await? {
        // Lost the race to a concurrent resolver
        return Err(accord_engine::Error::AlreadyResolved(resolved.id.clone()).into());
    }

    tracing::info!(
        conflict_id = %resolved.id,
        document_id = %resolved.document_id,
        strategy = resolution.strategy.as_str(),
        resolved_by = %resolution.resolved_by,
        "Conflict resolved"
    );

    Ok(resolved)
}

/// Richer resolution variant: same transition, plus reasoning describing the
/// applied strategy.
pub async fn handle_intelligent_resolve(
    pool: &PgPool,
    resolver: &Resolver,
    request: ResolveRequest,
) -> Result<IntelligentResolveResponse> {
    let strategy = request.resolution;
    let conflict = handle_resolve(pool, resolver, request).await?;

    let reasoning = match strategy {
        ResolutionStrategy::UserA => {
            format!("kept {}'s version of the section", conflict.user_a.name)
        }
        ResolutionStrategy::UserB => {
            format!("kept {}'s version of the section", conflict.user_b.name)
        }
        ResolutionStrategy::Merge => format!(
            "combined {}'s and {}'s edits",
            conflict.user_a.name, conflict.user_b.name
        ),
        ResolutionStrategy::Custom => "applied caller-provided replacement content".to_string(),
    };

    Ok(IntelligentResolveResponse { conflict, reasoning })
}
