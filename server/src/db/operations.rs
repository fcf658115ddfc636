//! Database operations for the operations table.

use accord_engine::{EditKind, EditOp};
use sqlx::{PgPool, Row};

/// A stored edit operation row from the database.
#[derive(Debug)]
pub struct StoredOperation {
    #[allow(dead_code)]
    pub id: i32,
    pub op_id: String,
    pub document_id: String,
    pub section: String,
    pub user_id: String,
    pub user_name: String,
    pub op_type: String,
    pub position: Option<i64>,
    pub text: Option<String>,
    pub content: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub timestamp: i64,
    #[allow(dead_code)]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredOperation {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoredOperation {
            id: row.try_get("id")?,
            op_id: row.try_get("op_id")?,
            document_id: row.try_get("document_id")?,
            section: row.try_get("section")?,
            user_id: row.try_get("user_id")?,
            user_name: row.try_get("user_name")?,
            op_type: row.try_get("op_type")?,
            position: row.try_get("position")?,
            text: row.try_get("text")?,
            content: row.try_get("content")?,
            metadata: row.try_get("metadata")?,
            timestamp: row.try_get("timestamp")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl StoredOperation {
    /// Convert database row to accord-engine EditOp.
    pub fn to_edit_op(&self) -> Result<EditOp, String> {
        let kind = match self.op_type.as_str() {
            "insert" => EditKind::Insert,
            "delete" => EditKind::Delete,
            "update" => EditKind::Update,
            other => return Err(format!("Unknown operation type: {}", other)),
        };

        let mut op = EditOp::new(
            &self.op_id,
            &self.user_id,
            &self.user_name,
            &self.document_id,
            &self.section,
            kind,
            self.timestamp as u64,
        );
        if let Some(position) = self.position {
            op = op.with_position(position as u64);
        }
        if let Some(text) = &self.text {
            op = op.with_text(text.clone());
        }
        if let Some(content) = &self.content {
            op = op.with_content(content.clone());
        }
        if let Some(metadata) = &self.metadata {
            op = op.with_metadata(metadata.clone());
        }

        Ok(op)
    }
}

/// Insert an edit operation into the log.
pub async fn insert_operation(pool: &PgPool, op: &EditOp) -> Result<i32, sqlx::Error> {
    let op_type = match op.kind {
        EditKind::Insert => "insert",
        EditKind::Delete => "delete",
        EditKind::Update => "update",
    };

    let result: (i32,) = sqlx::query_as(
        r#"
        INSERT INTO operations (
            op_id, document_id, section, user_id, user_name,
            op_type, position, text, content, metadata, timestamp
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id
        "#,
    )
    .bind(&op.op_id)
    .bind(&op.document_id)
    .bind(&op.section)
    .bind(&op.user_id)
    .bind(&op.user_name)
    .bind(op_type)
    .bind(op.position.map(|p| p as i64))
    .bind(&op.text)
    .bind(&op.content)
    .bind(&op.metadata)
    .bind(op.timestamp as i64)
    .fetch_one(pool)
    .await?;

    Ok(result.0)
}

/// Operations for one section at or after `since`, oldest first.
pub async fn section_ops_since(
    pool: &PgPool,
    document_id: &str,
    section: &str,
    since: i64,
) -> Result<Vec<StoredOperation>, sqlx::Error> {
    sqlx::query_as::<_, StoredOperation>(
        r#"
        SELECT id, op_id, document_id, section, user_id, user_name,
               op_type, position, text, content, metadata, timestamp, created_at
        FROM operations
        WHERE document_id = $1 AND section = $2 AND timestamp >= $3
        ORDER BY timestamp ASC, op_id ASC
        "#,
    )
    .bind(document_id)
    .bind(section)
    .bind(since)
    .fetch_all(pool)
    .await
}

/// Operation history for a document, optionally narrowed to one section.
pub async fn document_ops(
    pool: &PgPool,
    document_id: &str,
    section: Option<&str>,
    limit: i64,
) -> Result<Vec<StoredOperation>, sqlx::Error> {
    sqlx::query_as::<_, StoredOperation>(
        r#"
        SELECT id, op_id, document_id, section, user_id, user_name,
               op_type, position, text, content, metadata, timestamp, created_at
        FROM operations
        WHERE document_id = $1
          AND ($2::text IS NULL OR section = $2)
        ORDER BY timestamp ASC, op_id ASC
        LIMIT $3
        "#,
    )
    .bind(document_id)
    .bind(section)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Check if an operation with the given op_id already exists.
pub async fn operation_exists(pool: &PgPool, op_id: &str) -> Result<bool, sqlx::Error> {
    let result: (bool,) =
        sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM operations WHERE op_id = $1)"#)
            .bind(op_id)
            .fetch_one(pool)
            .await?;

    Ok(result.0)
}
