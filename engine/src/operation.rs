//! Edit operations recorded against document sections.
//!
//! Edits are expressed as operations, not direct mutations. Operations are
//! immutable once logged and feed conflict detection and prediction.

use crate::{DocumentId, OperationId, SectionId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Kind of edit a user performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Insert,
    Delete,
    Update,
}

/// A single edit operation on a document section.
///
/// Ordered by `(timestamp, op_id)` within a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOp {
    /// Operation ID
    pub op_id: OperationId,
    /// User who made the edit
    pub user_id: UserId,
    /// Display name of the user
    pub user_name: String,
    /// Document being edited
    pub document_id: DocumentId,
    /// Section of the document being edited
    pub section: SectionId,
    /// Kind of edit
    #[serde(rename = "type")]
    pub kind: EditKind,
    /// Character offset of the edit within the section, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
    /// Text inserted or deleted, when the edit carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Full section content after the edit, when the edit carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Free-form metadata attached by the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// When the edit was made (milliseconds since epoch)
    pub timestamp: Timestamp,
}

impl EditOp {
    /// Create a new edit operation with no positional payload.
    pub fn new(
        op_id: impl Into<OperationId>,
        user_id: impl Into<UserId>,
        user_name: impl Into<String>,
        document_id: impl Into<DocumentId>,
        section: impl Into<SectionId>,
        kind: EditKind,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            op_id: op_id.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            document_id: document_id.into(),
            section: section.into(),
            kind,
            position: None,
            text: None,
            content: None,
            metadata: None,
            timestamp,
        }
    }

    /// Set the character offset of the edit.
    pub fn with_position(mut self, position: u64) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the inserted or deleted text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the full section content after the edit.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Attach client metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Ordering for operations within a section: (timestamp, op_id).
impl Ord for EditOp {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.timestamp.cmp(&other.timestamp) {
            std::cmp::Ordering::Equal => self.op_id.cmp(&other.op_id),
            other => other,
        }
    }
}

impl PartialOrd for EditOp {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for EditOp {}
