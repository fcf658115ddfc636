//! Resolution strategies applied to detected conflicts.

use crate::{error::Result, Conflict, Error, Resolution, ResolutionStrategy, Timestamp, UserId};

/// Deterministic combination of two divergent contents.
///
/// Implementations must be pure: the same pair of inputs always produces the
/// same merged output.
pub trait ContentMerger: Send + Sync {
    /// Merge user A's content with user B's.
    fn merge(&self, ours: &str, theirs: &str) -> String;
}

/// Line-wise union merge.
///
/// Keeps the common leading and trailing lines once and concatenates the
/// divergent middles, ours first. Middle lines already contributed by ours
/// are not repeated.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineMerger;

impl ContentMerger for LineMerger {
    fn merge(&self, ours: &str, theirs: &str) -> String {
        if ours == theirs {
            return ours.to_string();
        }
        if ours.is_empty() {
            return theirs.to_string();
        }
        if theirs.is_empty() {
            return ours.to_string();
        }

        let a: Vec<&str> = ours.lines().collect();
        let b: Vec<&str> = theirs.lines().collect();
        let shorter = a.len().min(b.len());

        let mut prefix = 0;
        while prefix < shorter && a[prefix] == b[prefix] {
            prefix += 1;
        }

        let mut suffix = 0;
        while suffix < shorter - prefix && a[a.len() - 1 - suffix] == b[b.len() - 1 - suffix] {
            suffix += 1;
        }

        let a_mid = &a[prefix..a.len() - suffix];
        let b_mid = &b[prefix..b.len() - suffix];

        let mut merged: Vec<&str> = Vec::with_capacity(a.len() + b_mid.len());
        merged.extend(&a[..prefix]);
        merged.extend(a_mid);
        merged.extend(b_mid.iter().filter(|line| !a_mid.contains(*line)));
        merged.extend(&a[a.len() - suffix..]);
        merged.join("\n")
    }
}

/// Applies a chosen strategy to a pending conflict.
pub struct Resolver {
    merger: Box<dyn ContentMerger>,
}

impl Resolver {
    /// Create a resolver with a specific merger.
    pub fn new(merger: Box<dyn ContentMerger>) -> Self {
        Self { merger }
    }

    /// Apply a terminal strategy to a pending conflict.
    ///
    /// The returned conflict carries `resolved = true` and a populated
    /// [`Resolution`] whose timestamp is the resolution moment, never earlier
    /// than the conflict's detection timestamp.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyResolved`] when the conflict was resolved before;
    ///   resolving twice is not a defined transition
    /// - [`Error::MissingCustomContent`] when the `custom` strategy is chosen
    ///   without non-empty content
    pub fn resolve(
        &self,
        mut conflict: Conflict,
        strategy: ResolutionStrategy,
        custom_content: Option<&str>,
        resolved_by: impl Into<UserId>,
        now: Timestamp,
    ) -> Result<Conflict> {
        if conflict.resolved {
            return Err(Error::AlreadyResolved(conflict.id.clone()));
        }

        let chosen_content = match strategy {
            ResolutionStrategy::UserA => conflict.user_a.content.clone(),
            ResolutionStrategy::UserB => conflict.user_b.content.clone(),
            ResolutionStrategy::Merge => self
                .merger
                .merge(&conflict.user_a.content, &conflict.user_b.content),
            ResolutionStrategy::Custom => match custom_content {
                Some(content) if !content.is_empty() => content.to_string(),
                _ => return Err(Error::MissingCustomContent(conflict.id.clone())),
            },
        };

        conflict.resolved = true;
        conflict.resolution = Some(Resolution {
            chosen_content,
            resolved_by: resolved_by.into(),
            // A resolution can never predate its conflict's detection.
            resolved_at: now.max(conflict.timestamp),
            strategy,
        });

        Ok(conflict)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(Box::new(LineMerger))
    }
}
