//! Database operations for the conflicts table.
//!
//! Conflict history is append-only: rows are inserted on detection and
//! updated exactly once on resolution, never deleted.

use accord_engine::{Conflict, Contributor, Resolution};
use sqlx::{PgPool, Row};

/// A stored conflict row from the database.
#[derive(Debug)]
pub struct StoredConflict {
    pub id: String,
    pub document_id: String,
    pub section: String,
    pub user_a_id: String,
    pub user_a_name: String,
    pub user_a_content: String,
    pub user_b_id: String,
    pub user_b_name: String,
    pub user_b_content: String,
    pub timestamp: i64,
    pub conflict_position: i64,
    pub conflict_length: i64,
    pub resolved: bool,
    pub resolution_strategy: Option<String>,
    pub resolution_content: Option<String>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<i64>,
    #[allow(dead_code)]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredConflict {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoredConflict {
            id: row.try_get("id")?,
            document_id: row.try_get("document_id")?,
            section: row.try_get("section")?,
            user_a_id: row.try_get("user_a_id")?,
            user_a_name: row.try_get("user_a_name")?,
            user_a_content: row.try_get("user_a_content")?,
            user_b_id: row.try_get("user_b_id")?,
            user_b_name: row.try_get("user_b_name")?,
            user_b_content: row.try_get("user_b_content")?,
            timestamp: row.try_get("timestamp")?,
            conflict_position: row.try_get("conflict_position")?,
            conflict_length: row.try_get("conflict_length")?,
            resolved: row.try_get("resolved")?,
            resolution_strategy: row.try_get("resolution_strategy")?,
            resolution_content: row.try_get("resolution_content")?,
            resolved_by: row.try_get("resolved_by")?,
            resolved_at: row.try_get("resolved_at")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl StoredConflict {
    /// Convert database row to accord-engine Conflict.
    pub fn to_conflict(&self) -> Result<Conflict, String> {
        let resolution = match (
            &self.resolution_strategy,
            &self.resolution_content,
            &self.resolved_by,
            self.resolved_at,
        ) {
            (Some(strategy), Some(content), Some(resolved_by), Some(resolved_at)) => {
                Some(Resolution {
                    strategy: strategy.parse().map_err(|e| format!("{e}"))?,
                    chosen_content: content.clone(),
                    resolved_by: resolved_by.clone(),
                    resolved_at: resolved_at as u64,
                })
            }
            _ if self.resolved => {
                return Err(format!("conflict {} resolved without a resolution row", self.id))
            }
            _ => None,
        };

        Ok(Conflict {
            id: self.id.clone(),
            document_id: self.document_id.clone(),
            section: self.section.clone(),
            user_a: Contributor::new(&self.user_a_id, &self.user_a_name, &self.user_a_content),
            user_b: Contributor::new(&self.user_b_id, &self.user_b_name, &self.user_b_content),
            timestamp: self.timestamp as u64,
            resolved: self.resolved,
            resolution,
            conflict_position: self.conflict_position as u64,
            conflict_length: self.conflict_length as u64,
        })
    }
}

/// Insert a newly detected conflict.
pub async fn insert_conflict(pool: &PgPool, conflict: &Conflict) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO conflicts (
            id, document_id, section,
            user_a_id, user_a_name, user_a_content,
            user_b_id, user_b_name, user_b_content,
            timestamp, conflict_position, conflict_length, resolved
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(&conflict.id)
    .bind(&conflict.document_id)
    .bind(&conflict.section)
    .bind(&conflict.user_a.id)
    .bind(&conflict.user_a.name)
    .bind(&conflict.user_a.content)
    .bind(&conflict.user_b.id)
    .bind(&conflict.user_b.name)
    .bind(&conflict.user_b.content)
    .bind(conflict.timestamp as i64)
    .bind(conflict.conflict_position as i64)
    .bind(conflict.conflict_length as i64)
    .bind(conflict.resolved)
    .execute(pool)
    .await?;

    Ok(())
}

const CONFLICT_COLUMNS: &str = r#"
    id, document_id, section,
    user_a_id, user_a_name, user_a_content,
    user_b_id, user_b_name, user_b_content,
    timestamp, conflict_position, conflict_length, resolved,
    resolution_strategy, resolution_content, resolved_by, resolved_at,
    created_at
"#;

/// Get a conflict by id.
pub async fn get_conflict(pool: &PgPool, id: &str) -> Result<Option<StoredConflict>, sqlx::Error> {
    sqlx::query_as::<_, StoredConflict>(&format!(
        "SELECT {CONFLICT_COLUMNS} FROM conflicts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Conflict history for a document, oldest first.
pub async fn conflicts_for_document(
    pool: &PgPool,
    document_id: &str,
) -> Result<Vec<StoredConflict>, sqlx::Error> {
    sqlx::query_as::<_, StoredConflict>(&format!(
        r#"
        SELECT {CONFLICT_COLUMNS}
        FROM conflicts
        WHERE document_id = $1
        ORDER BY timestamp ASC, id ASC
        "#
    ))
    .bind(document_id)
    .fetch_all(pool)
    .await
}

/// Conflicts detected at or after `since`, with optional user/document
/// filters for scoped analytics.
pub async fn conflicts_since(
    pool: &PgPool,
    since: i64,
    user_id: Option<&str>,
    document_id: Option<&str>,
) -> Result<Vec<StoredConflict>, sqlx::Error> {
    sqlx::query_as::<_, StoredConflict>(&format!(
        r#"
        SELECT {CONFLICT_COLUMNS}
        FROM conflicts
        WHERE timestamp >= $1
          AND ($2::text IS NULL OR user_a_id = $2 OR user_b_id = $2)
          AND ($3::text IS NULL OR document_id = $3)
        ORDER BY timestamp ASC, id ASC
        "#
    ))
    .bind(since)
    .bind(user_id)
    .bind(document_id)
    .fetch_all(pool)
    .await
}

/// Full history touching one user: conflicts they are a party to, plus
/// conflicts they resolved.
pub async fn conflicts_touching_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<StoredConflict>, sqlx::Error> {
    sqlx::query_as::<_, StoredConflict>(&format!(
        r#"
        SELECT {CONFLICT_COLUMNS}
        FROM conflicts
        WHERE user_a_id = $1 OR user_b_id = $1 OR resolved_by = $1
        ORDER BY timestamp ASC, id ASC
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Write a resolution onto a pending conflict.
///
/// The `resolved = FALSE` guard makes the store's row-level atomicity reject
/// a second resolution even when two requests race; returns whether this
/// caller won the write.
pub async fn mark_resolved(
    pool: &PgPool,
    id: &str,
    resolution: &Resolution,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE conflicts
        SET resolved = TRUE,
            resolution_strategy = $2,
            resolution_content = $3,
            resolved_by = $4,
            resolved_at = $5
        WHERE id = $1 AND resolved = FALSE
        "#,
    )
    .bind(id)
    .bind(resolution.strategy.as_str())
    .bind(&resolution.chosen_content)
    .bind(&resolution.resolved_by)
    .bind(resolution.resolved_at as i64)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
