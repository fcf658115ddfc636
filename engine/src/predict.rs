//! Heuristic prediction of future conflicts on a section.
//!
//! The predictor looks at recent edit activity before a hard conflict
//! exists. It is advisory only: a prediction never blocks an edit, and the
//! caller decides whether to surface it.

use crate::{EditOp, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trailing window of edit activity the predictor inspects.
pub const ACTIVITY_WINDOW_MS: u64 = 5 * 60 * 1000;

/// An edit this recent marks the section as hot.
const HOT_EDIT_MS: u64 = 60 * 1000;

/// An edit this recent still signals elevated activity.
const WARM_EDIT_MS: u64 = 3 * 60 * 1000;

/// Likelihood contributed by each distinct concurrent editor.
const PER_EDITOR_WEIGHT: f64 = 0.25;

/// Action the caller may surface to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestedAction {
    None,
    SuggestCoordination,
    LockSection,
}

/// Estimated likelihood of a future conflict on a section.
///
/// Ephemeral: computed fresh per request from recent history, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Likelihood in `0.0..=1.0`
    pub likelihood: f64,
    /// Why the predictor arrived at this likelihood
    pub reasoning: String,
    /// Other users likely to conflict, sorted by user id
    pub potential_users: Vec<UserId>,
    /// Threshold-based recommendation
    pub suggested_action: SuggestedAction,
}

impl Prediction {
    /// Quiet-section prediction: nothing to report.
    pub fn none() -> Self {
        Self {
            likelihood: 0.0,
            reasoning: "no recent edits by other users in this section".to_string(),
            potential_users: Vec::new(),
            suggested_action: SuggestedAction::None,
        }
    }
}

/// Estimate the conflict likelihood for `user_id` on the section the given
/// operations belong to.
///
/// `ops` is the recent history of one `(document, section)` pair; entries
/// outside [`ACTIVITY_WINDOW_MS`] are ignored. Likelihood grows monotonically
/// with the number of distinct other editors and with how recently the newest
/// of them edited: `0.25` per editor, plus `0.2` when the newest other edit
/// is at most a minute old or `0.1` when at most three minutes old, clamped
/// to `1.0`.
pub fn predict_conflicts(ops: &[EditOp], user_id: &str, now: Timestamp) -> Prediction {
    let window_start = now.saturating_sub(ACTIVITY_WINDOW_MS);

    // Newest edit per other user inside the window
    let mut last_seen: BTreeMap<&str, Timestamp> = BTreeMap::new();
    for op in ops {
        if op.user_id == user_id || op.timestamp < window_start || op.timestamp > now {
            continue;
        }
        let newest = last_seen.entry(op.user_id.as_str()).or_insert(op.timestamp);
        if op.timestamp > *newest {
            *newest = op.timestamp;
        }
    }

    if last_seen.is_empty() {
        return Prediction::none();
    }

    let editors = last_seen.len();
    let newest = last_seen.values().copied().max().unwrap_or(window_start);
    let age = now.saturating_sub(newest);

    let recency_bonus = if age <= HOT_EDIT_MS {
        0.2
    } else if age <= WARM_EDIT_MS {
        0.1
    } else {
        0.0
    };

    let likelihood = (editors as f64 * PER_EDITOR_WEIGHT + recency_bonus).min(1.0);

    let suggested_action = if likelihood > 0.7 {
        SuggestedAction::LockSection
    } else if likelihood > 0.4 {
        SuggestedAction::SuggestCoordination
    } else {
        SuggestedAction::None
    };

    let reasoning = format!(
        "{} other {} edited this section in the last {} minutes; most recent edit {}s ago",
        editors,
        if editors == 1 { "user" } else { "users" },
        ACTIVITY_WINDOW_MS / 60_000,
        age / 1000,
    );

    // BTreeMap iteration keeps the user list sorted
    let potential_users = last_seen.keys().map(|user| user.to_string()).collect();

    Prediction {
        likelihood,
        reasoning,
        potential_users,
        suggested_action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditKind;

    const NOW: Timestamp = 1_706_745_600_000;

    fn op(op_id: &str, user: &str, age_ms: u64) -> EditOp {
        EditOp::new(op_id, user, user, "doc-1", "intro", EditKind::Update, NOW - age_ms)
    }

    #[test]
    fn quiet_section_predicts_nothing() {
        let prediction = predict_conflicts(&[], "u1", NOW);
        assert_eq!(prediction.likelihood, 0.0);
        assert_eq!(prediction.suggested_action, SuggestedAction::None);
        assert!(prediction.potential_users.is_empty());
    }

    #[test]
    fn own_edits_do_not_count() {
        let ops = vec![op("op-1", "u1", 1000), op("op-2", "u1", 2000)];
        let prediction = predict_conflicts(&ops, "u1", NOW);
        assert_eq!(prediction.likelihood, 0.0);
    }

    #[test]
    fn stale_edits_fall_out_of_the_window() {
        let ops = vec![op("op-1", "u2", ACTIVITY_WINDOW_MS + 1000)];
        let prediction = predict_conflicts(&ops, "u1", NOW);
        assert_eq!(prediction.likelihood, 0.0);
    }

    #[test]
    fn one_recent_editor_suggests_coordination() {
        let ops = vec![op("op-1", "u2", 30_000)];
        let prediction = predict_conflicts(&ops, "u1", NOW);

        // 0.25 for the editor + 0.2 hot bonus
        assert!((prediction.likelihood - 0.45).abs() < 1e-9);
        assert_eq!(prediction.suggested_action, SuggestedAction::SuggestCoordination);
        assert_eq!(prediction.potential_users, vec!["u2".to_string()]);
    }

    #[test]
    fn three_recent_editors_suggest_locking() {
        let ops = vec![
            op("op-1", "u2", 10_000),
            op("op-2", "u3", 20_000),
            op("op-3", "u4", 30_000),
        ];
        let prediction = predict_conflicts(&ops, "u1", NOW);

        assert!(prediction.likelihood > 0.7);
        assert_eq!(prediction.suggested_action, SuggestedAction::LockSection);
        assert_eq!(
            prediction.potential_users,
            vec!["u2".to_string(), "u3".to_string(), "u4".to_string()]
        );
    }

    #[test]
    fn recency_bonus_decays() {
        let hot = predict_conflicts(&[op("op-1", "u2", 30_000)], "u1", NOW);
        let warm = predict_conflicts(&[op("op-1", "u2", 2 * 60_000)], "u1", NOW);
        let cool = predict_conflicts(&[op("op-1", "u2", 4 * 60_000)], "u1", NOW);

        assert!(hot.likelihood > warm.likelihood);
        assert!(warm.likelihood > cool.likelihood);
        assert!((cool.likelihood - 0.25).abs() < 1e-9);
    }

    #[test]
    fn likelihood_is_clamped() {
        let ops: Vec<EditOp> = (0..10)
            .map(|i| op(&format!("op-{i}"), &format!("u{}", i + 2), 1000))
            .collect();
        let prediction = predict_conflicts(&ops, "u1", NOW);

        assert_eq!(prediction.likelihood, 1.0);
        assert_eq!(prediction.suggested_action, SuggestedAction::LockSection);
    }

    #[test]
    fn repeated_edits_count_one_editor() {
        let ops = vec![
            op("op-1", "u2", 10_000),
            op("op-2", "u2", 20_000),
            op("op-3", "u2", 30_000),
        ];
        let prediction = predict_conflicts(&ops, "u1", NOW);

        assert_eq!(prediction.potential_users.len(), 1);
        assert!((prediction.likelihood - 0.45).abs() < 1e-9);
    }

    #[test]
    fn action_serialization_is_kebab_case() {
        let json = serde_json::to_string(&SuggestedAction::LockSection).unwrap();
        assert_eq!(json, "\"lock-section\"");
        let json = serde_json::to_string(&SuggestedAction::SuggestCoordination).unwrap();
        assert_eq!(json, "\"suggest-coordination\"");
    }
}
