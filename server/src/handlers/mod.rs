//! Request handlers for the conflict workflow.

mod analytics;
mod detect;
mod operations;
mod predict;
mod resolve;
mod suggest;

pub use analytics::*;
pub use detect::*;
pub use operations::*;
pub use predict::*;
pub use resolve::*;
pub use suggest::*;

use crate::error::{AppError, Result};

/// Current instant in milliseconds since epoch.
pub(crate) fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Reject blank required request fields.
pub(crate) fn require_field<'a>(value: &'a str, name: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{name} is required")));
    }
    Ok(trimmed)
}
