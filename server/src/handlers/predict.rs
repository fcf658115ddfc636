//! Prediction handlers - estimating conflict likelihood before it happens.

use crate::db;
use crate::error::Result;
use crate::handlers::{now_ms, require_field};
use accord_engine::{predict_conflicts, EditOp, Prediction, ACTIVITY_WINDOW_MS};
use serde::Deserialize;
use sqlx::PgPool;

/// Query parameters for conflict prediction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictQuery {
    pub document_id: Option<String>,
    pub user_id: Option<String>,
    pub section: Option<String>,
}

/// Estimate the conflict likelihood for a user editing a section.
///
/// Advisory only: reads recent section activity and computes fresh; nothing
/// is persisted and nothing blocks the edit.
pub async fn handle_predict(pool: &PgPool, query: PredictQuery) -> Result<Prediction> {
    let document_id = require_field(query.document_id.as_deref().unwrap_or(""), "documentId")?;
    let user_id = require_field(query.user_id.as_deref().unwrap_or(""), "userId")?;
    let section = require_field(query.section.as_deref().unwrap_or(""), "section")?;

    let now = now_ms();
    let since = now.saturating_sub(ACTIVITY_WINDOW_MS);

    let stored = db::section_ops_since(pool, document_id, section, since as i64).await?;

    let mut ops: Vec<EditOp> = Vec::with_capacity(stored.len());
    for row in &stored {
        match row.to_edit_op() {
            Ok(op) => ops.push(op),
            Err(e) => {
                tracing::warn!("Failed to convert stored operation {}: {}", row.op_id, e);
                // Skip invalid operations
            }
        }
    }

    Ok(predict_conflicts(&ops, user_id, now))
}
