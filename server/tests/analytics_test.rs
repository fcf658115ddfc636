//! Integration tests for the analytics protocol.
//!
//! These tests pin the JSON shapes dashboards consume and the aggregation
//! semantics the analytics endpoints serve.

use accord_engine::{
    aggregate, detect_conflict, timeline, user_stats, Conflict, ConflictAnalytics, Contributor,
    ResolutionStrategy, Resolver, TimeRange,
};

// 2024-01-10T12:00:00Z
const NOW: u64 = 1_704_888_000_000;
const DAY_MS: u64 = 24 * 60 * 60 * 1000;

fn conflict(id: &str, age_ms: u64) -> Conflict {
    detect_conflict(
        id,
        "doc-1",
        "sec-1",
        Contributor::new("u1", "Alice", format!("a-{id}")),
        Contributor::new("u2", "Bob", format!("b-{id}")),
        NOW - age_ms,
    )
    .unwrap()
    .unwrap()
}

fn resolved(id: &str, age_ms: u64, strategy: ResolutionStrategy) -> Conflict {
    Resolver::default()
        .resolve(conflict(id, age_ms), strategy, Some("chosen"), "u3", NOW - age_ms + 1000)
        .unwrap()
}

#[cfg(test)]
mod protocol_tests {
    use super::*;

    #[test]
    fn test_empty_store_serves_zeroed_snapshot() {
        let snapshot = aggregate(&[], TimeRange::Week, NOW);

        assert_eq!(snapshot.total_conflicts, 0);
        assert_eq!(snapshot.resolved, 0);
        assert_eq!(snapshot.pending, 0);

        // Exactly what the degraded path serves
        assert_eq!(snapshot, ConflictAnalytics::empty(TimeRange::Week));
    }

    #[test]
    fn test_analytics_wire_format() {
        let history = vec![
            conflict("c-1", DAY_MS),
            resolved("c-2", DAY_MS, ResolutionStrategy::Merge),
        ];
        let snapshot = aggregate(&history, TimeRange::Week, NOW);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"timeRange\":\"week\""));
        assert!(json.contains("\"totalConflicts\":2"));
        assert!(json.contains("\"resolved\":1"));
        assert!(json.contains("\"pending\":1"));
        assert!(json.contains("\"byStrategy\""));
        assert!(json.contains("\"merge\":1"));
        assert!(json.contains("\"topSections\""));
    }

    #[test]
    fn test_timeline_wire_format() {
        let history = vec![conflict("c-1", 0)];
        let series = timeline(&history, TimeRange::Week, NOW);

        assert_eq!(series.buckets.len(), 7);
        let json = serde_json::to_string(&series).unwrap();
        assert!(json.contains("\"label\":\"2024-01-10\""));
        assert!(json.contains("\"buckets\""));
        assert!(json.contains("\"start\""));
    }

    #[test]
    fn test_user_stats_wire_format() {
        let history = vec![resolved("c-1", DAY_MS, ResolutionStrategy::UserA)];
        let stats = user_stats(&history, "u1");

        assert_eq!(stats.total_conflicts, 1);
        assert_eq!(stats.resolved, 1);

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"userId\":\"u1\""));
        assert!(json.contains("\"resolutionsApplied\":0"));
        assert!(json.contains("\"userA\":1"));
    }

    #[test]
    fn test_time_range_query_values() {
        for (value, range) in [
            ("week", TimeRange::Week),
            ("month", TimeRange::Month),
            ("year", TimeRange::Year),
        ] {
            assert_eq!(value.parse::<TimeRange>().unwrap(), range);
        }

        // Unknown ranges are a validation error, not a default
        assert!("quarter".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_invalidate_request_deserialization() {
        #[derive(serde::Deserialize)]
        struct InvalidateRequest {
            #[serde(rename = "type")]
            kind: String,
            id: Option<String>,
        }

        let request: InvalidateRequest =
            serde_json::from_str(r#"{"type": "user", "id": "u1"}"#).unwrap();
        assert_eq!(request.kind, "user");
        assert_eq!(request.id.as_deref(), Some("u1"));

        let request: InvalidateRequest = serde_json::from_str(r#"{"type": "all"}"#).unwrap();
        assert_eq!(request.kind, "all");
        assert!(request.id.is_none());
    }

    #[test]
    fn test_snapshot_round_trips_through_cache_value() {
        // The cache stores snapshots as JSON values; a cached entry must
        // deserialize back to the exact snapshot
        let history = vec![
            conflict("c-1", DAY_MS),
            resolved("c-2", 2 * DAY_MS, ResolutionStrategy::Custom),
        ];
        let snapshot = aggregate(&history, TimeRange::Month, NOW);

        let value = serde_json::to_value(&snapshot).unwrap();
        let restored: ConflictAnalytics = serde_json::from_value(value).unwrap();

        assert_eq!(restored, snapshot);
    }
}
