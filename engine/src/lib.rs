//! # Accord Engine
//!
//! Deterministic conflict handling for collaborative document editing.
//!
//! This crate provides the core logic of Accord: detecting divergent edits to
//! the same document section, resolving them with explicit strategies,
//! predicting likely conflicts from recent edit activity, and aggregating
//! conflict history into analytics snapshots.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of databases, HTTP, or caches
//! - **Deterministic**: ids and timestamps are inputs, never generated here;
//!   the same inputs always produce the same outputs
//! - **Testable**: pure logic, no mocks needed
//! - **Advisory where advisory**: predictions and suggestions never mutate
//!   state or block an edit
//!
//! ## Core Concepts
//!
//! ### Operations
//!
//! Every user edit is recorded as an [`EditOp`] (insert, delete, or update)
//! tagged with user, timestamp, and document section. The [`OperationLog`]
//! keeps them in `(timestamp, op_id)` order per section and feeds the
//! predictor.
//!
//! ### Conflicts
//!
//! [`detect_conflict`] compares the contents two users wrote to the same
//! section. Equal contents mean the users converged and no conflict exists;
//! divergent contents produce a pending [`Conflict`] carrying both payloads
//! and the character span of the difference.
//!
//! ### Resolutions
//!
//! The [`Resolver`] applies a terminal [`ResolutionStrategy`] to a pending
//! conflict: take user A's content, take user B's, merge both through a
//! pluggable [`ContentMerger`], or substitute custom content. Resolving an
//! already-resolved conflict is an error, never a silent no-op.
//!
//! ### Predictions
//!
//! [`predict_conflicts`] estimates how likely a future conflict is for a
//! section from the number and recency of other active editors. Predictions
//! are ephemeral and never persisted.
//!
//! ### Analytics
//!
//! The [`analytics`] module turns conflict history into derived snapshots:
//! totals, strategy distributions, and time-bucketed timelines over week,
//! month, and year windows. Snapshots are never authoritative; they can
//! always be recomputed from the history.
//!
//! ## Quick Start
//!
//! ```rust
//! use accord_engine::{detect_conflict, Contributor, ResolutionStrategy, Resolver};
//!
//! let conflict = detect_conflict(
//!     "conflict-1",
//!     "doc-1",
//!     "introduction",
//!     Contributor::new("u1", "Alice", "Hello world"),
//!     Contributor::new("u2", "Bob", "Hello there"),
//!     1_706_745_600_000,
//! )
//! .unwrap()
//! .expect("contents diverge");
//!
//! assert!(!conflict.resolved);
//!
//! let resolver = Resolver::default();
//! let resolved = resolver
//!     .resolve(conflict, ResolutionStrategy::UserA, None, "u1", 1_706_745_660_000)
//!     .unwrap();
//!
//! assert_eq!(resolved.resolution.unwrap().chosen_content, "Hello world");
//! ```

pub mod analytics;
pub mod conflict;
pub mod error;
pub mod log;
pub mod operation;
pub mod predict;
pub mod resolve;
pub mod suggest;

// Re-export main types at crate root
pub use analytics::{
    aggregate, document_stats, timeline, user_stats, ConflictAnalytics, ConflictTimeline,
    DocumentConflictStats, SectionCount, StrategyBreakdown, TimeRange, TimelineBucket,
    UserConflictStats,
};
pub use conflict::{detect_conflict, Conflict, Contributor, Resolution, ResolutionStrategy};
pub use error::Error;
pub use log::OperationLog;
pub use operation::{EditKind, EditOp};
pub use predict::{predict_conflicts, Prediction, SuggestedAction, ACTIVITY_WINDOW_MS};
pub use resolve::{ContentMerger, LineMerger, Resolver};
pub use suggest::{Suggester, TemplateSuggester};

/// Type aliases for clarity
pub type DocumentId = String;
pub type SectionId = String;
pub type UserId = String;
pub type ConflictId = String;
pub type OperationId = String;
pub type Timestamp = u64;
