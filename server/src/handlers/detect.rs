//! Detection handlers - comparing concurrent section edits.

use crate::db;
use crate::error::Result;
use crate::handlers::{now_ms, require_field};
use accord_engine::{detect_conflict, Conflict, Contributor};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// One user's side of a detection request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: String,
    pub name: String,
    /// Section content this user produced; empty string is valid content
    pub content: String,
}

impl From<UserPayload> for Contributor {
    fn from(payload: UserPayload) -> Self {
        Contributor::new(payload.id, payload.name, payload.content)
    }
}

/// Request body for conflict detection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    pub document_id: String,
    pub section: String,
    pub user_a: UserPayload,
    pub user_b: UserPayload,
    /// Optional editing context from richer clients; stored only in logs
    pub context: Option<String>,
}

/// Response for the richer detection variant.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelligentDetectResponse {
    pub conflict: Option<Conflict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<&'static str>,
    pub reasoning: String,
}

/// Compare both users' contents and persist a conflict when they diverge.
///
/// Returns `None` when the users converged on the same content. Store
/// failures surface to the caller; detection affects data correctness and
/// fails loud.
pub async fn handle_detect(pool: &PgPool, request: DetectRequest) -> Result<Option<Conflict>> {
    let document_id = require_field(&request.document_id, "documentId")?;
    let section = require_field(&request.section, "section")?;
    require_field(&request.user_a.id, "userA.id")?;
    require_field(&request.user_b.id, "userB.id")?;

    let conflict = detect_conflict(
        Uuid::new_v4().to_string(),
        document_id,
        section,
        request.user_a.into(),
        request.user_b.into(),
        now_ms(),
    )?;

    if let Some(conflict) = &conflict {
        db::insert_conflict(pool, conflict).await?;
        tracing::info!(
            conflict_id = %conflict.id,
            document_id = %conflict.document_id,
            section = %conflict.section,
            context = request.context.as_deref().unwrap_or(""),
            "Conflict detected"
        );
    }

    Ok(conflict)
}

/// Richer detection variant: same persistence, plus span-derived severity
/// and reasoning for clients that render conflict details.
pub async fn handle_intelligent_detect(
    pool: &PgPool,
    request: DetectRequest,
) -> Result<IntelligentDetectResponse> {
    let conflict = handle_detect(pool, request).await?;

    let (severity, reasoning) = match &conflict {
        None => (None, "both users converged on the same content".to_string()),
        Some(conflict) => {
            let (severity, shape) = classify(conflict);
            let reasoning = format!(
                "contents diverge over {} characters starting at offset {}; {}",
                conflict.conflict_length, conflict.conflict_position, shape,
            );
            (Some(severity), reasoning)
        }
    };

    Ok(IntelligentDetectResponse {
        conflict,
        severity,
        reasoning,
    })
}

/// Severity and shape description for a detected conflict.
fn classify(conflict: &Conflict) -> (&'static str, &'static str) {
    let a = &conflict.user_a.content;
    let b = &conflict.user_b.content;

    if a.is_empty() || b.is_empty() {
        ("high", "one side removes the section content entirely")
    } else if a.contains(b.as_str()) || b.contains(a.as_str()) {
        ("low", "one edit extends the other")
    } else {
        ("medium", "the edits overlap with no containment")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict(content_a: &str, content_b: &str) -> Conflict {
        detect_conflict(
            "c-1",
            "doc-1",
            "intro",
            Contributor::new("u1", "Alice", content_a),
            Contributor::new("u2", "Bob", content_b),
            1000,
        )
        .unwrap()
        .unwrap()
    }

    #[test]
    fn severity_tracks_content_shape() {
        assert_eq!(classify(&conflict("", "Hi")).0, "high");
        assert_eq!(classify(&conflict("Hello", "Hello world")).0, "low");
        assert_eq!(classify(&conflict("left", "right")).0, "medium");
    }
}
