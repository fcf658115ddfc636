//! Conflict detection over concurrent section edits.
//!
//! Two users edit a section "concurrently" when their edits arrive as
//! separate requests without one observing the other's result first. There is
//! no pessimistic lock preventing that race; detection catches it after the
//! fact by comparing the contents both users produced.

use crate::{
    error::Result, ConflictId, DocumentId, Error, SectionId, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};

/// One side of a conflict: a user and the content they wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    /// User ID
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Section content this user produced. Empty string is valid content,
    /// not absence.
    pub content: String,
}

impl Contributor {
    /// Create a new contributor.
    pub fn new(
        id: impl Into<UserId>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Strategy applied to resolve a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
    /// Accept user A's content
    UserA,
    /// Accept user B's content
    UserB,
    /// Combine both contents through the configured merger
    Merge,
    /// Substitute caller-provided content
    Custom,
}

impl ResolutionStrategy {
    /// Wire representation of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserA => "user-a",
            Self::UserB => "user-b",
            Self::Merge => "merge",
            Self::Custom => "custom",
        }
    }
}

impl std::str::FromStr for ResolutionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user-a" => Ok(Self::UserA),
            "user-b" => Ok(Self::UserB),
            "merge" => Ok(Self::Merge),
            "custom" => Ok(Self::Custom),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}

/// Terminal decision applied to a conflict.
///
/// Owned exclusively by its parent conflict and written exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// The content that won
    pub chosen_content: String,
    /// Who applied the resolution
    pub resolved_by: UserId,
    /// When the resolution was applied (milliseconds since epoch), never
    /// earlier than the conflict's detection timestamp
    pub resolved_at: Timestamp,
    /// Strategy that was applied
    pub strategy: ResolutionStrategy,
}

/// A detected divergence between two users' edits to the same section.
///
/// Lifecycle: pending (`resolved == false`) until a terminal strategy is
/// applied, then resolved with `resolution` set. Conflict history is
/// append-only; conflicts are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Unique conflict ID
    pub id: ConflictId,
    /// Document the conflict occurred in
    pub document_id: DocumentId,
    /// Section the conflict occurred in
    pub section: SectionId,
    /// First contributor
    pub user_a: Contributor,
    /// Second contributor
    pub user_b: Contributor,
    /// When the divergence was detected (milliseconds since epoch)
    pub timestamp: Timestamp,
    /// Whether a terminal strategy has been applied
    pub resolved: bool,
    /// The terminal decision, present exactly when `resolved` is true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    /// Start of the differing span, in characters from the section start
    pub conflict_position: u64,
    /// Length of the differing region of the longer content, in characters
    pub conflict_length: u64,
}

impl Conflict {
    /// Check whether the conflict still awaits resolution.
    pub fn is_pending(&self) -> bool {
        !self.resolved
    }

    /// Check whether a user is one of the two contributors.
    pub fn involves(&self, user_id: &str) -> bool {
        self.user_a.id == user_id || self.user_b.id == user_id
    }
}

/// Compare the contents two users wrote to the same section.
///
/// Returns `Ok(None)` when the contents are equal: the users converged on the
/// same edit and no conflict exists. Divergent contents produce a pending
/// [`Conflict`] with the character span of the difference. Both contributors
/// sharing a user id is a validation error, not a conflict.
pub fn detect_conflict(
    id: impl Into<ConflictId>,
    document_id: impl Into<DocumentId>,
    section: impl Into<SectionId>,
    user_a: Contributor,
    user_b: Contributor,
    now: Timestamp,
) -> Result<Option<Conflict>> {
    if user_a.id == user_b.id {
        return Err(Error::SameEditor(user_a.id));
    }

    if user_a.content == user_b.content {
        return Ok(None);
    }

    let (position, length) = diff_span(&user_a.content, &user_b.content);

    Ok(Some(Conflict {
        id: id.into(),
        document_id: document_id.into(),
        section: section.into(),
        user_a,
        user_b,
        timestamp: now,
        resolved: false,
        resolution: None,
        conflict_position: position as u64,
        conflict_length: length as u64,
    }))
}

/// Character span of the difference between two unequal contents.
///
/// `position` is the length of the common prefix; `length` covers the
/// differing region of the longer content, common suffix excluded.
fn diff_span(a: &str, b: &str) -> (usize, usize) {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let shorter = a.len().min(b.len());

    let mut prefix = 0;
    while prefix < shorter && a[prefix] == b[prefix] {
        prefix += 1;
    }

    let mut suffix = 0;
    while suffix < shorter - prefix && a[a.len() - 1 - suffix] == b[b.len() - 1 - suffix] {
        suffix += 1;
    }

    let longer = a.len().max(b.len());
    (prefix, longer - prefix - suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice(content: &str) -> Contributor {
        Contributor::new("u1", "Alice", content)
    }

    fn bob(content: &str) -> Contributor {
        Contributor::new("u2", "Bob", content)
    }

    #[test]
    fn equal_contents_are_not_a_conflict() {
        let result =
            detect_conflict("c-1", "doc-1", "intro", alice("Hello"), bob("Hello"), 1000).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn equal_empty_contents_are_not_a_conflict() {
        let result = detect_conflict("c-1", "doc-1", "intro", alice(""), bob(""), 1000).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn divergent_contents_produce_pending_conflict() {
        let conflict = detect_conflict("c-1", "doc-1", "intro", alice("Hello"), bob("Hi"), 1000)
            .unwrap()
            .unwrap();

        assert_eq!(conflict.id, "c-1");
        assert!(!conflict.resolved);
        assert!(conflict.is_pending());
        assert!(conflict.resolution.is_none());
        assert_eq!(conflict.user_a.content, "Hello");
        assert_eq!(conflict.user_b.content, "Hi");
        assert_eq!(conflict.timestamp, 1000);
    }

    #[test]
    fn empty_versus_nonempty_is_a_conflict() {
        let conflict = detect_conflict("c-1", "doc-1", "intro", alice(""), bob("Hi"), 1000)
            .unwrap()
            .unwrap();
        assert_eq!(conflict.conflict_position, 0);
        assert_eq!(conflict.conflict_length, 2);
    }

    #[test]
    fn same_editor_is_rejected() {
        let err = detect_conflict(
            "c-1",
            "doc-1",
            "intro",
            Contributor::new("u1", "Alice", "A"),
            Contributor::new("u1", "Alice (phone)", "B"),
            1000,
        )
        .unwrap_err();
        assert_eq!(err, Error::SameEditor("u1".to_string()));
    }

    #[test]
    fn span_covers_differing_region() {
        // "Hello" vs "Hi": common prefix "H", no common suffix
        let (position, length) = diff_span("Hello", "Hi");
        assert_eq!(position, 1);
        assert_eq!(length, 4);

        // insertion in the middle, common prefix and suffix
        let (position, length) = diff_span("abc", "abXc");
        assert_eq!(position, 2);
        assert_eq!(length, 1);
    }

    #[test]
    fn span_is_measured_in_characters() {
        let (position, length) = diff_span("héllo", "héllq");
        assert_eq!(position, 4);
        assert_eq!(length, 1);
    }

    #[test]
    fn strategy_round_trips_through_str() {
        for strategy in [
            ResolutionStrategy::UserA,
            ResolutionStrategy::UserB,
            ResolutionStrategy::Merge,
            ResolutionStrategy::Custom,
        ] {
            assert_eq!(strategy.as_str().parse::<ResolutionStrategy>().unwrap(), strategy);
        }
        assert!("overwrite".parse::<ResolutionStrategy>().is_err());
    }

    #[test]
    fn serialization_strategy_kebab_case() {
        let json = serde_json::to_string(&ResolutionStrategy::UserA).unwrap();
        assert_eq!(json, "\"user-a\"");

        let conflict = detect_conflict("c-1", "doc-1", "intro", alice("A"), bob("B"), 1000)
            .unwrap()
            .unwrap();
        let json = serde_json::to_string(&conflict).unwrap();
        assert!(json.contains("\"documentId\":\"doc-1\""));
        assert!(json.contains("\"conflictPosition\":0"));
        // Pending conflicts keep the resolution off the wire
        assert!(!json.contains("resolution\""));

        let parsed: Conflict = serde_json::from_str(&json).unwrap();
        assert_eq!(conflict, parsed);
    }
}
