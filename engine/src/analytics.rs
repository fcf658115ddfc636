//! Aggregated conflict statistics and timelines.
//!
//! Everything here is pure: callers pass the conflict history and the current
//! instant, and get back derived snapshots. Snapshots are never authoritative
//! and can always be recomputed from the history, which is what makes the
//! server-side cache safe to drop at any time.

use crate::{
    error::{Error, Result},
    Conflict, DocumentId, ResolutionStrategy, SectionId, Timestamp, UserId,
};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Sections reported in an analytics snapshot.
const TOP_SECTIONS: usize = 5;

/// Historical window an aggregate covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Week,
    Month,
    Year,
}

impl TimeRange {
    /// Wire representation of the range.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Start of the window ending at `now` (milliseconds since epoch).
    ///
    /// A week is fixed seven-day arithmetic; month and year windows step back
    /// in calendar months.
    pub fn window_start(&self, now: Timestamp) -> Timestamp {
        let end = to_datetime(now);
        let start = match self {
            Self::Week => end - Duration::days(7),
            Self::Month => end
                .checked_sub_months(Months::new(1))
                .unwrap_or(end - Duration::days(30)),
            Self::Year => end
                .checked_sub_months(Months::new(12))
                .unwrap_or(end - Duration::days(365)),
        };
        to_millis(start)
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(Error::InvalidTimeRange(other.to_string())),
        }
    }
}

/// Per-strategy distribution of resolved conflicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyBreakdown {
    pub user_a: u64,
    pub user_b: u64,
    pub merge: u64,
    pub custom: u64,
}

impl StrategyBreakdown {
    fn record(&mut self, strategy: ResolutionStrategy) {
        match strategy {
            ResolutionStrategy::UserA => self.user_a += 1,
            ResolutionStrategy::UserB => self.user_b += 1,
            ResolutionStrategy::Merge => self.merge += 1,
            ResolutionStrategy::Custom => self.custom += 1,
        }
    }

    /// Total resolutions recorded.
    pub fn total(&self) -> u64 {
        self.user_a + self.user_b + self.merge + self.custom
    }
}

/// Conflict count for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionCount {
    pub section: SectionId,
    pub conflicts: u64,
}

/// Aggregate over the conflict history of one scope and window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictAnalytics {
    pub time_range: TimeRange,
    pub total_conflicts: u64,
    pub resolved: u64,
    pub pending: u64,
    pub by_strategy: StrategyBreakdown,
    /// Most conflicted sections in the window, busiest first
    pub top_sections: Vec<SectionCount>,
}

impl ConflictAnalytics {
    /// Zeroed snapshot: the empty-history result and the degraded-mode
    /// fallback.
    pub fn empty(time_range: TimeRange) -> Self {
        Self {
            time_range,
            total_conflicts: 0,
            resolved: 0,
            pending: 0,
            by_strategy: StrategyBreakdown::default(),
            top_sections: Vec::new(),
        }
    }
}

/// One bucket of a conflict timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBucket {
    /// Inclusive bucket start (milliseconds since epoch)
    pub start: Timestamp,
    /// Exclusive bucket end (milliseconds since epoch)
    pub end: Timestamp,
    /// Bucket label: `2026-08-07` for day and week buckets, `2026-08` for
    /// month buckets
    pub label: String,
    pub total: u64,
    pub resolved: u64,
}

/// Time-bucketed conflict counts over a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictTimeline {
    pub time_range: TimeRange,
    pub buckets: Vec<TimelineBucket>,
}

impl ConflictTimeline {
    /// Bucketless timeline: the degraded-mode fallback.
    pub fn empty(time_range: TimeRange) -> Self {
        Self {
            time_range,
            buckets: Vec::new(),
        }
    }
}

/// Conflict involvement statistics for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConflictStats {
    pub user_id: UserId,
    /// Conflicts the user is a party to
    pub total_conflicts: u64,
    pub resolved: u64,
    pub pending: u64,
    /// Resolutions this user applied, to any conflict
    pub resolutions_applied: u64,
    /// Strategy distribution over the user's resolved conflicts
    pub by_strategy: StrategyBreakdown,
}

impl UserConflictStats {
    /// Zeroed stats for a user with no conflict history.
    pub fn empty(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            total_conflicts: 0,
            resolved: 0,
            pending: 0,
            resolutions_applied: 0,
            by_strategy: StrategyBreakdown::default(),
        }
    }
}

/// Conflict statistics for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConflictStats {
    pub document_id: DocumentId,
    pub total_conflicts: u64,
    pub resolved: u64,
    pub pending: u64,
    pub by_strategy: StrategyBreakdown,
    /// Per-section counts, busiest first
    pub sections: Vec<SectionCount>,
}

impl DocumentConflictStats {
    /// Zeroed stats for a document with no conflict history.
    pub fn empty(document_id: impl Into<DocumentId>) -> Self {
        Self {
            document_id: document_id.into(),
            total_conflicts: 0,
            resolved: 0,
            pending: 0,
            by_strategy: StrategyBreakdown::default(),
            sections: Vec::new(),
        }
    }
}

/// Aggregate conflicts detected inside the window ending at `now`.
pub fn aggregate(conflicts: &[Conflict], time_range: TimeRange, now: Timestamp) -> ConflictAnalytics {
    let start = time_range.window_start(now);
    let mut analytics = ConflictAnalytics::empty(time_range);
    let mut sections: HashMap<&str, u64> = HashMap::new();

    for conflict in conflicts {
        if conflict.timestamp < start || conflict.timestamp > now {
            continue;
        }
        analytics.total_conflicts += 1;
        if conflict.resolved {
            analytics.resolved += 1;
            if let Some(resolution) = &conflict.resolution {
                analytics.by_strategy.record(resolution.strategy);
            }
        } else {
            analytics.pending += 1;
        }
        *sections.entry(conflict.section.as_str()).or_default() += 1;
    }

    analytics.top_sections = ranked_sections(sections);
    analytics.top_sections.truncate(TOP_SECTIONS);
    analytics
}

/// Time-bucketed conflict counts: one bucket per day for a week window, per
/// week for a month window, per calendar month for a year window.
pub fn timeline(conflicts: &[Conflict], time_range: TimeRange, now: Timestamp) -> ConflictTimeline {
    let mut buckets: Vec<TimelineBucket> = bucket_boundaries(time_range, now)
        .into_iter()
        .map(|(start, end, label)| TimelineBucket {
            start,
            end,
            label,
            total: 0,
            resolved: 0,
        })
        .collect();

    for conflict in conflicts {
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| conflict.timestamp >= b.start && conflict.timestamp < b.end)
        {
            bucket.total += 1;
            if conflict.resolved {
                bucket.resolved += 1;
            }
        }
    }

    ConflictTimeline { time_range, buckets }
}

/// Involvement statistics for one user over the full history passed in.
pub fn user_stats(conflicts: &[Conflict], user_id: &str) -> UserConflictStats {
    let mut stats = UserConflictStats::empty(user_id);

    for conflict in conflicts {
        if let Some(resolution) = &conflict.resolution {
            if resolution.resolved_by == user_id {
                stats.resolutions_applied += 1;
            }
        }

        if !conflict.involves(user_id) {
            continue;
        }
        stats.total_conflicts += 1;
        if conflict.resolved {
            stats.resolved += 1;
            if let Some(resolution) = &conflict.resolution {
                stats.by_strategy.record(resolution.strategy);
            }
        } else {
            stats.pending += 1;
        }
    }

    stats
}

/// Conflict statistics for one document over the full history passed in.
pub fn document_stats(conflicts: &[Conflict], document_id: &str) -> DocumentConflictStats {
    let mut stats = DocumentConflictStats::empty(document_id);
    let mut sections: HashMap<&str, u64> = HashMap::new();

    for conflict in conflicts {
        if conflict.document_id != document_id {
            continue;
        }
        stats.total_conflicts += 1;
        if conflict.resolved {
            stats.resolved += 1;
            if let Some(resolution) = &conflict.resolution {
                stats.by_strategy.record(resolution.strategy);
            }
        } else {
            stats.pending += 1;
        }
        *sections.entry(conflict.section.as_str()).or_default() += 1;
    }

    stats.sections = ranked_sections(sections);
    stats
}

fn ranked_sections(sections: HashMap<&str, u64>) -> Vec<SectionCount> {
    let mut ranked: Vec<SectionCount> = sections
        .into_iter()
        .map(|(section, conflicts)| SectionCount {
            section: section.to_string(),
            conflicts,
        })
        .collect();
    // Busiest first, section name as the deterministic tiebreak
    ranked.sort_by(|x, y| {
        y.conflicts
            .cmp(&x.conflicts)
            .then_with(|| x.section.cmp(&y.section))
    });
    ranked
}

fn bucket_boundaries(time_range: TimeRange, now: Timestamp) -> Vec<(Timestamp, Timestamp, String)> {
    let today = to_datetime(now).date_naive();

    match time_range {
        TimeRange::Week => (0i64..7)
            .rev()
            .map(|i| {
                let day = today - Duration::days(i);
                let start = start_of_day(day);
                (
                    to_millis(start),
                    to_millis(start + Duration::days(1)),
                    day.format("%Y-%m-%d").to_string(),
                )
            })
            .collect(),
        TimeRange::Month => {
            let end_boundary = start_of_day(today) + Duration::days(1);
            let mut start = start_of_day(to_datetime(time_range.window_start(now)).date_naive());
            let mut buckets = Vec::new();
            while start < end_boundary {
                let end = (start + Duration::days(7)).min(end_boundary);
                buckets.push((
                    to_millis(start),
                    to_millis(end),
                    start.format("%Y-%m-%d").to_string(),
                ));
                start = end;
            }
            buckets
        }
        TimeRange::Year => {
            let first_of_month = today.with_day(1).unwrap_or(today);
            (0u32..12)
                .rev()
                .map(|i| {
                    let month = first_of_month
                        .checked_sub_months(Months::new(i))
                        .unwrap_or(first_of_month);
                    let next = month
                        .checked_add_months(Months::new(1))
                        .unwrap_or(month);
                    (
                        to_millis(start_of_day(month)),
                        to_millis(start_of_day(next)),
                        month.format("%Y-%m").to_string(),
                    )
                })
                .collect()
        }
    }
}

fn to_datetime(timestamp: Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp as i64).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn to_millis(instant: DateTime<Utc>) -> Timestamp {
    instant.timestamp_millis().max(0) as u64
}
