//! Accord Server - conflict detection, resolution, and analytics for
//! collaborative documents.
//!
//! This server exposes HTTP endpoints over the accord-engine conflict logic:
//! an operation log feeding detection and prediction, a resolution workflow,
//! and cached analytics over the conflict history.

mod cache;
mod config;
mod db;
mod error;
mod handlers;
mod identity;
mod routes;

use crate::cache::AnalyticsCache;
use crate::config::Config;
use crate::db::Pool;
use accord_engine::{Resolver, Suggester, TemplateSuggester};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
///
/// Every collaborator is constructed here and injected; there are no
/// module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub config: Arc<Config>,
    pub cache: Arc<dyn AnalyticsCache>,
    pub resolver: Arc<Resolver>,
    pub suggester: Arc<dyn Suggester>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "accord_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Accord Server on {}:{}", config.host, config.port);

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await?;

    // Build application state
    let cache = cache::create_cache(&config);
    tracing::info!(backend = %config.cache_backend, "Analytics cache ready");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cache,
        resolver: Arc::new(Resolver::default()),
        suggester: Arc::new(TemplateSuggester),
    };

    // Build router
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
