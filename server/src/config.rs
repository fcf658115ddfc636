//! Configuration management for the server.

use std::env;
use std::fmt;

/// Which analytics cache implementation to run.
///
/// Selected here, by configuration, and nowhere else - business logic only
/// ever sees the cache trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// Unbounded in-process map, invalidation-only
    Memory,
    /// Bounded in-process cache with a TTL safety net
    Bounded,
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Bounded => write!(f, "bounded"),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Reject requests that carry no identity headers
    pub require_identity: bool,
    /// Analytics cache implementation
    pub cache_backend: CacheBackend,
    /// Max entries for the bounded cache backend
    pub cache_capacity: u64,
    /// TTL safety net for the bounded cache backend, in seconds
    pub cache_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let require_identity = env::var("REQUIRE_IDENTITY")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let cache_backend = match env::var("CACHE_BACKEND") {
            Ok(value) => match value.as_str() {
                "memory" => CacheBackend::Memory,
                "bounded" => CacheBackend::Bounded,
                other => return Err(ConfigError::UnknownCacheBackend(other.to_string())),
            },
            Err(_) => CacheBackend::Memory,
        };

        let cache_capacity = env::var("CACHE_CAPACITY")
            .unwrap_or_else(|_| "10000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidCacheTuning("CACHE_CAPACITY"))?;

        let cache_ttl_secs = env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidCacheTuning("CACHE_TTL_SECS"))?;

        Ok(Self {
            host,
            port,
            database_url,
            require_identity,
            cache_backend,
            cache_capacity,
            cache_ttl_secs,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Unknown CACHE_BACKEND value: {0} (expected 'memory' or 'bounded')")]
    UnknownCacheBackend(String),

    #[error("Invalid {0} value")]
    InvalidCacheTuning(&'static str),
}
