//! HTTP route definitions.

mod analytics;
mod conflicts;
mod health;
mod intelligent;
mod operations;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(operations::routes())
        .merge(conflicts::routes())
        .merge(intelligent::routes())
        .merge(analytics::routes())
}
