//! Advisory resolution hints for pending conflicts.

use crate::{Conflict, Contributor};

/// Produces a human-readable resolution hint for a conflict.
///
/// Purely advisory: implementations never mutate state and their output is
/// never auto-applied. Richer phrasing can come from an external
/// text-generation backend behind this same trait; the engine ships the
/// templated fallback.
pub trait Suggester: Send + Sync {
    /// Suggest a resolution for `user_id`. Returns `None` when no actionable
    /// suggestion exists, e.g. the conflict is already resolved.
    fn suggest(&self, conflict: &Conflict, user_id: &str) -> Option<String>;
}

/// Template-based suggester.
///
/// Picks a hint from the shape of the two contents: keep the non-empty side,
/// keep the superset side, or merge when neither contains the other.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSuggester;

impl Suggester for TemplateSuggester {
    fn suggest(&self, conflict: &Conflict, user_id: &str) -> Option<String> {
        if conflict.resolved {
            return None;
        }

        let a = &conflict.user_a;
        let b = &conflict.user_b;

        let hint = if a.content.is_empty() {
            format!(
                "{} cleared the section; accepting {} edit (user-b) keeps the text",
                name_of(a, user_id),
                possessive(b, user_id),
            )
        } else if b.content.is_empty() {
            format!(
                "{} cleared the section; accepting {} edit (user-a) keeps the text",
                name_of(b, user_id),
                possessive(a, user_id),
            )
        } else if b.content.contains(&a.content) {
            format!(
                "{} edit extends {}; accepting {} version (user-b) preserves both changes",
                possessive(b, user_id),
                possessive_bare(a, user_id),
                possessive(b, user_id),
            )
        } else if a.content.contains(&b.content) {
            format!(
                "{} edit extends {}; accepting {} version (user-a) preserves both changes",
                possessive(a, user_id),
                possessive_bare(b, user_id),
                possessive(a, user_id),
            )
        } else {
            "the edits overlap with no clear winner; merging keeps both contributions".to_string()
        };

        Some(format!("Conflict {}: {}.", conflict.id, hint))
    }
}

fn name_of(contributor: &Contributor, user_id: &str) -> String {
    if contributor.id == user_id {
        "you".to_string()
    } else {
        contributor.name.clone()
    }
}

fn possessive(contributor: &Contributor, user_id: &str) -> String {
    if contributor.id == user_id {
        "your".to_string()
    } else {
        format!("{}'s", contributor.name)
    }
}

fn possessive_bare(contributor: &Contributor, user_id: &str) -> String {
    if contributor.id == user_id {
        "yours".to_string()
    } else {
        format!("{}'s", contributor.name)
    }
}
