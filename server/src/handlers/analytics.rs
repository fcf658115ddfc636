//! Analytics handlers - cached aggregates over the conflict history.
//!
//! Detection and resolution fail loud; analytics fail soft. An aggregation
//! failure here returns the defined zeroed snapshot so dashboards stay
//! renderable, and degraded snapshots are never written to the cache.

use crate::cache::{self, AnalyticsCache};
use crate::db::{self, StoredConflict};
use crate::error::{AppError, Result};
use crate::handlers::{now_ms, require_field};
use accord_engine::{
    aggregate, document_stats, timeline, user_stats, Conflict, ConflictAnalytics,
    ConflictTimeline, DocumentConflictStats, TimeRange, UserConflictStats,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::PgPool;

/// Query parameters for analytics aggregates.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub time_range: Option<String>,
    pub user_id: Option<String>,
    pub document_id: Option<String>,
}

/// Query parameters for user stats.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsQuery {
    pub user_id: Option<String>,
}

/// Query parameters for document stats.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatsQuery {
    pub document_id: Option<String>,
}

/// Request body for explicit cache invalidation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateRequest {
    /// `all`, `user`, or `document`
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Option<String>,
}

/// Response for cache invalidation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateResponse {
    pub success: bool,
    pub invalidated: String,
}

/// Windowed conflict counts and strategy distribution.
pub async fn handle_analytics(
    pool: &PgPool,
    cache: &dyn AnalyticsCache,
    query: AnalyticsQuery,
) -> Result<ConflictAnalytics> {
    let time_range = parse_time_range(query.time_range.as_deref())?;
    let user_id = query.user_id.as_deref().filter(|id| !id.is_empty());
    let document_id = query.document_id.as_deref().filter(|id| !id.is_empty());

    let key = cache::analytics_key(time_range, user_id, document_id);
    if let Some(snapshot) = cached(cache, &key) {
        return Ok(snapshot);
    }

    let now = now_ms();
    let since = time_range.window_start(now) as i64;

    let snapshot = match db::conflicts_since(pool, since, user_id, document_id).await {
        Ok(rows) => aggregate(&to_conflicts(rows), time_range, now),
        Err(e) => {
            tracing::error!(error = ?e, "Conflict analytics failed; serving zeroed snapshot");
            return Ok(ConflictAnalytics::empty(time_range));
        }
    };

    store(cache, &key, &snapshot);
    Ok(snapshot)
}

/// Time-bucketed conflict counts.
pub async fn handle_timeline(
    pool: &PgPool,
    cache: &dyn AnalyticsCache,
    query: AnalyticsQuery,
) -> Result<ConflictTimeline> {
    let time_range = parse_time_range(query.time_range.as_deref())?;
    let user_id = query.user_id.as_deref().filter(|id| !id.is_empty());

    let key = cache::timeline_key(time_range, user_id);
    if let Some(snapshot) = cached(cache, &key) {
        return Ok(snapshot);
    }

    let now = now_ms();
    let since = time_range.window_start(now) as i64;

    let snapshot = match db::conflicts_since(pool, since, user_id, None).await {
        Ok(rows) => timeline(&to_conflicts(rows), time_range, now),
        Err(e) => {
            tracing::error!(error = ?e, "Conflict timeline failed; serving empty timeline");
            return Ok(ConflictTimeline::empty(time_range));
        }
    };

    store(cache, &key, &snapshot);
    Ok(snapshot)
}

/// Conflict involvement stats for one user, over their full history.
pub async fn handle_user_stats(
    pool: &PgPool,
    cache: &dyn AnalyticsCache,
    query: UserStatsQuery,
) -> Result<UserConflictStats> {
    let user_id = require_field(query.user_id.as_deref().unwrap_or(""), "userId")?;

    let key = cache::user_stats_key(user_id);
    if let Some(snapshot) = cached(cache, &key) {
        return Ok(snapshot);
    }

    let snapshot = match db::conflicts_touching_user(pool, user_id).await {
        Ok(rows) => user_stats(&to_conflicts(rows), user_id),
        Err(e) => {
            tracing::error!(error = ?e, user_id, "User stats failed; serving zeroed stats");
            return Ok(UserConflictStats::empty(user_id));
        }
    };

    store(cache, &key, &snapshot);
    Ok(snapshot)
}

/// Conflict stats for one document, over its full history.
pub async fn handle_document_stats(
    pool: &PgPool,
    cache: &dyn AnalyticsCache,
    query: DocumentStatsQuery,
) -> Result<DocumentConflictStats> {
    let document_id = require_field(query.document_id.as_deref().unwrap_or(""), "documentId")?;

    let key = cache::document_stats_key(document_id);
    if let Some(snapshot) = cached(cache, &key) {
        return Ok(snapshot);
    }

    let snapshot = match db::conflicts_for_document(pool, document_id).await {
        Ok(rows) => document_stats(&to_conflicts(rows), document_id),
        Err(e) => {
            tracing::error!(error = ?e, document_id, "Document stats failed; serving zeroed stats");
            return Ok(DocumentConflictStats::empty(document_id));
        }
    };

    store(cache, &key, &snapshot);
    Ok(snapshot)
}

/// Explicit cache invalidation: the write path never invalidates on its own,
/// so callers signal scope changes here after writes.
pub fn handle_invalidate(
    cache: &dyn AnalyticsCache,
    request: InvalidateRequest,
) -> Result<InvalidateResponse> {
    let invalidated = match request.kind.as_str() {
        "all" => {
            cache.invalidate_all();
            "all".to_string()
        }
        "user" => {
            let id = required_id(request.id.as_deref(), "user")?;
            cache.invalidate_user(id);
            format!("user:{id}")
        }
        "document" => {
            let id = required_id(request.id.as_deref(), "document")?;
            cache.invalidate_document(id);
            format!("document:{id}")
        }
        other => {
            return Err(AppError::BadRequest(format!(
                "Unknown invalidation type: {other} (expected all, user, or document)"
            )))
        }
    };

    tracing::debug!(%invalidated, "Analytics cache invalidated");

    Ok(InvalidateResponse {
        success: true,
        invalidated,
    })
}

fn parse_time_range(value: Option<&str>) -> Result<TimeRange> {
    Ok(value.unwrap_or("week").parse::<TimeRange>()?)
}

fn required_id<'a>(id: Option<&'a str>, kind: &str) -> Result<&'a str> {
    id.map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("id is required for {kind} invalidation")))
}

/// Convert stored rows, skipping ones that no longer parse.
fn to_conflicts(rows: Vec<StoredConflict>) -> Vec<Conflict> {
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
    conflicts
}

fn cached<T: DeserializeOwned>(cache: &dyn AnalyticsCache, key: &str) -> Option<T> {
    let value = cache.get(key)?;
    match serde_json::from_value(value) {
        Ok(snapshot) => {
            tracing::debug!(key, "Analytics cache hit");
            Some(snapshot)
        }
        Err(e) => {
            // A snapshot that no longer deserializes is stale by definition
            tracing::warn!(key, error = %e, "Dropping undecodable cache entry");
            cache.invalidate(key);
            None
        }
    }
}

fn store<T: Serialize>(cache: &dyn AnalyticsCache, key: &str, snapshot: &T) {
    match serde_json::to_value(snapshot) {
        Ok(value) => cache.put(key, value),
        Err(e) => tracing::warn!(key, error = %e, "Failed to serialize snapshot for cache"),
    }
}
