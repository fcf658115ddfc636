//! Edge case tests for accord-engine
//!
//! These tests cover boundary conditions and unusual inputs.

use accord_engine::{
    aggregate, detect_conflict, predict_conflicts, timeline, Conflict, ContentMerger, Contributor,
    EditKind, EditOp, LineMerger, OperationLog, ResolutionStrategy, Resolver, SuggestedAction,
    Suggester, TemplateSuggester, TimeRange, ACTIVITY_WINDOW_MS,
};

// 2024-01-10T12:00:00Z
const NOW: u64 = 1_704_888_000_000;

fn detect(content_a: &str, content_b: &str) -> Option<Conflict> {
    detect_conflict(
        "c-1",
        "doc-1",
        "intro",
        Contributor::new("u1", "Alice", content_a),
        Contributor::new("u2", "Bob", content_b),
        NOW,
    )
    .unwrap()
}

// ============================================================================
// String Edge Cases
// ============================================================================

#[test]
fn empty_contents_are_valid_and_equal() {
    assert!(detect("", "").is_none());
}

#[test]
fn whitespace_only_difference_is_a_conflict() {
    let conflict = detect("Hello world", "Hello  world").unwrap();
    assert!(!conflict.resolved);
    assert!(conflict.conflict_length >= 1);
}

#[test]
fn unicode_contents_keep_character_spans() {
    let cases = vec![
        ("日本語テスト", "日本語テスよ"),
        ("Привет мир", "Привет мыр"),
        ("🎉🚀💯", "🎉🚀🔥"),
        ("Hello\nWorld\tTab", "Hello\nWorld\tTap"),
    ];

    for (a, b) in cases {
        let conflict = detect(a, b).unwrap_or_else(|| panic!("no conflict for: {a}"));
        let chars = a.chars().count().max(b.chars().count()) as u64;
        assert!(conflict.conflict_position < chars, "span start out of range for: {a}");
        assert!(
            conflict.conflict_position + conflict.conflict_length <= chars,
            "span end out of range for: {a}"
        );
    }
}

#[test]
fn large_contents_are_handled() {
    let base = "lorem ipsum ".repeat(10_000);
    let changed = format!("{base}dolor");

    let conflict = detect(&base, &changed).unwrap();
    assert_eq!(conflict.conflict_position as usize, base.chars().count());
    assert_eq!(conflict.conflict_length, 5);
}

// ============================================================================
// Resolution Flow
// ============================================================================

#[test]
fn full_detect_resolve_flow() {
    let conflict = detect("Hello", "Hi").unwrap();
    let resolver = Resolver::default();

    let resolved = resolver
        .resolve(conflict, ResolutionStrategy::UserB, None, "moderator", NOW + 60_000)
        .unwrap();

    assert!(resolved.resolved);
    let resolution = resolved.resolution.as_ref().unwrap();
    assert_eq!(resolution.chosen_content, "Hi");
    assert_eq!(resolution.resolved_by, "moderator");
    assert!(resolution.resolved_at >= resolved.timestamp);

    // Terminal state: a second strategy application must fail
    assert!(resolver
        .resolve(resolved, ResolutionStrategy::UserA, None, "moderator", NOW + 120_000)
        .is_err());
}

#[test]
fn merge_of_identical_middles_does_not_duplicate() {
    let merger = LineMerger;
    let merged = merger.merge("a\nshared\nz", "a\nshared\nextra\nz");
    assert_eq!(merged, "a\nshared\nextra\nz");
}

#[test]
fn suggestion_flow_matches_resolution_state() {
    let conflict = detect("Hello", "Hello world").unwrap();
    let suggester = TemplateSuggester;

    let suggestion = suggester.suggest(&conflict, "u1").unwrap();
    assert!(suggestion.contains(&conflict.id));

    let resolved = Resolver::default()
        .resolve(conflict, ResolutionStrategy::UserB, None, "u1", NOW + 1000)
        .unwrap();
    assert!(suggester.suggest(&resolved, "u1").is_none());
}

// ============================================================================
// Prediction Boundaries
// ============================================================================

fn section_op(op_id: &str, user: &str, timestamp: u64) -> EditOp {
    EditOp::new(op_id, user, user, "doc-1", "intro", EditKind::Update, timestamp)
}

#[test]
fn edit_exactly_at_window_edge_counts() {
    let ops = vec![section_op("op-1", "u2", NOW - ACTIVITY_WINDOW_MS)];
    let prediction = predict_conflicts(&ops, "u1", NOW);
    assert!(prediction.likelihood > 0.0);
}

#[test]
fn future_timestamps_are_ignored() {
    // Clock skew: an op stamped after "now" must not count
    let ops = vec![section_op("op-1", "u2", NOW + 10_000)];
    let prediction = predict_conflicts(&ops, "u1", NOW);
    assert_eq!(prediction.likelihood, 0.0);
    assert_eq!(prediction.suggested_action, SuggestedAction::None);
}

#[test]
fn log_feeds_predictor() {
    let mut log = OperationLog::new();
    for (i, user) in ["u2", "u3", "u4"].iter().enumerate() {
        log.append(section_op(&format!("op-{i}"), user, NOW - 30_000));
    }
    log.append(section_op("op-own", "u1", NOW - 10_000));
    log.append(EditOp::new(
        "op-other-section",
        "u5",
        "u5",
        "doc-1",
        "body",
        EditKind::Update,
        NOW - 5_000,
    ));

    let window_start = NOW - ACTIVITY_WINDOW_MS;
    let recent: Vec<EditOp> = log
        .ops_since("doc-1", "intro", window_start)
        .cloned()
        .collect();
    let prediction = predict_conflicts(&recent, "u1", NOW);

    assert!(prediction.likelihood > 0.7);
    assert_eq!(prediction.suggested_action, SuggestedAction::LockSection);
    assert_eq!(
        prediction.potential_users,
        vec!["u2".to_string(), "u3".to_string(), "u4".to_string()]
    );
}

// ============================================================================
// Analytics Boundaries
// ============================================================================

#[test]
fn conflict_exactly_at_window_start_is_included() {
    let start = TimeRange::Week.window_start(NOW);
    let conflict = detect_conflict(
        "c-edge",
        "doc-1",
        "intro",
        Contributor::new("u1", "Alice", "A"),
        Contributor::new("u2", "Bob", "B"),
        start,
    )
    .unwrap()
    .unwrap();

    let analytics = aggregate(&[conflict], TimeRange::Week, NOW);
    assert_eq!(analytics.total_conflicts, 1);
}

#[test]
fn timeline_bucket_totals_match_aggregate_totals() {
    let mut history = Vec::new();
    for i in 0..10u64 {
        history.push(
            detect_conflict(
                format!("c-{i}"),
                "doc-1",
                "intro",
                Contributor::new("u1", "Alice", format!("a-{i}")),
                Contributor::new("u2", "Bob", format!("b-{i}")),
                NOW - i * 12 * 60 * 60 * 1000, // every 12 hours back
            )
            .unwrap()
            .unwrap(),
        );
    }

    let analytics = aggregate(&history, TimeRange::Week, NOW);
    let timeline = timeline(&history, TimeRange::Week, NOW);
    let bucketed: u64 = timeline.buckets.iter().map(|b| b.total).sum();

    assert_eq!(bucketed, analytics.total_conflicts);
}

// ============================================================================
// Property-based tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_equal_contents_never_conflict(content in ".{0,64}") {
            let result = detect_conflict(
                "c-p",
                "doc-1",
                "intro",
                Contributor::new("u1", "Alice", content.clone()),
                Contributor::new("u2", "Bob", content),
                NOW,
            ).unwrap();
            prop_assert!(result.is_none());
        }

        #[test]
        fn prop_divergent_contents_always_conflict(
            a in ".{0,64}",
            b in ".{0,64}",
        ) {
            prop_assume!(a != b);
            let conflict = detect_conflict(
                "c-p",
                "doc-1",
                "intro",
                Contributor::new("u1", "Alice", a.clone()),
                Contributor::new("u2", "Bob", b.clone()),
                NOW,
            ).unwrap();
            let conflict = conflict.expect("divergent contents must conflict");

            prop_assert!(!conflict.resolved);
            prop_assert_eq!(conflict.user_a.content, a.clone());
            prop_assert_eq!(conflict.user_b.content, b.clone());

            // The span always fits inside the longer content and is non-empty
            let longer = a.chars().count().max(b.chars().count()) as u64;
            prop_assert!(conflict.conflict_length >= 1);
            prop_assert!(conflict.conflict_position + conflict.conflict_length <= longer);
        }

        #[test]
        fn prop_merge_is_deterministic(a in ".{0,64}", b in ".{0,64}") {
            let merger = LineMerger;
            prop_assert_eq!(merger.merge(&a, &b), merger.merge(&a, &b));
        }

        #[test]
        fn prop_resolution_timestamp_never_precedes_detection(
            detected_at in 0u64..2_000_000_000_000,
            resolved_at in 0u64..2_000_000_000_000,
        ) {
            let conflict = detect_conflict(
                "c-p",
                "doc-1",
                "intro",
                Contributor::new("u1", "Alice", "A"),
                Contributor::new("u2", "Bob", "B"),
                detected_at,
            ).unwrap().unwrap();

            let resolved = Resolver::default()
                .resolve(conflict, ResolutionStrategy::UserA, None, "u3", resolved_at)
                .unwrap();
            prop_assert!(resolved.resolution.unwrap().resolved_at >= detected_at);
        }

        #[test]
        fn prop_likelihood_monotone_in_editor_count(editors in 0usize..8) {
            let ops: Vec<EditOp> = (0..editors)
                .map(|i| section_op(&format!("op-{i}"), &format!("u{}", i + 2), NOW - 30_000))
                .collect();
            let more_ops: Vec<EditOp> = (0..=editors)
                .map(|i| section_op(&format!("op-{i}"), &format!("u{}", i + 2), NOW - 30_000))
                .collect();

            let fewer = predict_conflicts(&ops, "u1", NOW);
            let more = predict_conflicts(&more_ops, "u1", NOW);
            prop_assert!(more.likelihood >= fewer.likelihood);
            prop_assert!(fewer.likelihood >= 0.0 && more.likelihood <= 1.0);
        }
    }
}
