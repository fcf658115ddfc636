//! Operation log handlers - recording edits and serving section history.

use crate::db;
use crate::error::Result;
use crate::handlers::{now_ms, require_field};
use accord_engine::{EditKind, EditOp};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Request body for logging an edit operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogOperationRequest {
    pub document_id: String,
    pub section: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(rename = "type")]
    pub kind: EditKind,
    pub position: Option<u64>,
    pub text: Option<String>,
    pub content: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Query parameters for listing operations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationsQuery {
    pub document_id: Option<String>,
    pub section: Option<String>,
    pub limit: Option<i64>,
}

/// Response for listing operations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationsResponse {
    pub operations: Vec<EditOp>,
}

/// Default limit for operation history.
const DEFAULT_LIMIT: i64 = 100;

/// Maximum limit for operation history.
const MAX_LIMIT: i64 = 1000;

/// Append an edit operation to the log.
pub async fn handle_log_operation(pool: &PgPool, request: LogOperationRequest) -> Result<EditOp> {
    let document_id = require_field(&request.document_id, "documentId")?;
    let section = require_field(&request.section, "section")?;
    let user_id = require_field(&request.user_id, "userId")?;

    let mut op = EditOp::new(
        Uuid::new_v4().to_string(),
        user_id,
        request.user_name.clone(),
        document_id,
        section,
        request.kind,
        now_ms(),
    );
    if let Some(position) = request.position {
        op = op.with_position(position);
    }
    if let Some(text) = request.text {
        op = op.with_text(text);
    }
    if let Some(content) = request.content {
        op = op.with_content(content);
    }
    if let Some(metadata) = request.metadata {
        op = op.with_metadata(metadata);
    }

    db::insert_operation(pool, &op).await?;

    tracing::debug!(
        op_id = %op.op_id,
        document_id = %op.document_id,
        section = %op.section,
        "Edit operation logged"
    );

    Ok(op)
}

/// Serve operation history for a document, optionally narrowed to a section.
pub async fn handle_list_operations(
    pool: &PgPool,
    query: OperationsQuery,
) -> Result<OperationsResponse> {
    let document_id = require_field(query.document_id.as_deref().unwrap_or(""), "documentId")?;
    let limit = query
        .limit
        .map(|l| l.clamp(1, MAX_LIMIT))
        .unwrap_or(DEFAULT_LIMIT);

    let stored = db::document_ops(pool, document_id, query.section.as_deref(), limit).await?;

    let mut operations = Vec::with_capacity(stored.len());
    for row in &stored {
        match row.to_edit_op() {
            Ok(op) => operations.push(op),
            Err(e) => {
                tracing::warn!("Failed to convert stored operation {}: {}", row.op_id, e);
                // Skip invalid operations
            }
        }
    }

    Ok(OperationsResponse { operations })
}
