//! API Handlers
//!
//! HTTP request handlers for each demo server endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use tokio::time::Instant;

use crate::api::upstream::{EchoResolver, Resolver};
use crate::cache::Cache;
use crate::cancel::Cancellation;
use crate::config::Settings;
use crate::error::ApiError;
use crate::models::{CacheHealth, HealthResponse, LookupResponse, RateLimiterHealth, StatsResponse};
use crate::rate::RateLimiter;
use crate::retry::Retrier;
use crate::telemetry::Telemetry;

/// Keys longer than this are rejected with 400.
pub const MAX_KEY_LENGTH: usize = 256;

/// Upper bound on one lookup, retries included.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<Cache<String>>,
    pub limiter: Arc<RateLimiter>,
    pub retrier: Arc<Retrier>,
    pub resolver: Arc<dyn Resolver>,
    pub started_at: Instant,
}

impl AppState {
    /// Creates state around already-built components, resolving values
    /// with [`EchoResolver`].
    pub fn new(cache: Cache<String>, limiter: RateLimiter, retrier: Retrier) -> Self {
        Self {
            cache: Arc::new(cache),
            limiter: Arc::new(limiter),
            retrier: Arc::new(retrier),
            resolver: Arc::new(EchoResolver),
            started_at: Instant::now(),
        }
    }

    /// Builds every component from settings. Must run inside a tokio
    /// runtime because a live cache spawns its sweep.
    pub fn from_settings(settings: &Settings, telemetry: Telemetry) -> Self {
        Self::new(
            Cache::new(settings.cache.clone(), telemetry.clone()),
            RateLimiter::new(settings.rate_limit.clone(), telemetry.clone()),
            Retrier::new(settings.retry.clone(), telemetry),
        )
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = resolver;
        self
    }
}

/// Handler for GET /lookup/:key
///
/// Admission goes through the rate limiter in immediate mode. The value is
/// served from the cache, or resolved upstream with retries and cached.
pub async fn lookup_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<LookupResponse>, ApiError> {
    if key.len() > MAX_KEY_LENGTH {
        return Err(ApiError::InvalidRequest(format!(
            "key exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        )));
    }

    let cancel = Cancellation::new().with_timeout(LOOKUP_TIMEOUT);
    let resolved_upstream = AtomicBool::new(false);

    let cache = state.cache.as_ref();
    let retrier = state.retrier.as_ref();
    let resolver = state.resolver.as_ref();
    let key_ref = key.as_str();
    let cancel_ref = &cancel;
    let upstream_flag = &resolved_upstream;

    let attempt = move || async move {
        upstream_flag.store(true, Ordering::Relaxed);
        resolver.resolve(key_ref)
    };

    let value = state
        .limiter
        .execute(move || {
            cache.get_or_compute(key_ref, move || retrier.run_classified(cancel_ref, attempt))
        })
        .await?;

    let cached = !resolved_upstream.load(Ordering::Relaxed);
    Ok(Json(LookupResponse::new(key, value, cached)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
///
/// Returns health status with per-component details.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = CacheHealth {
        enabled: state.cache.is_enabled(),
        entries: state.cache.size().await,
    };
    let rate_limiter = RateLimiterHealth {
        enabled: state.limiter.is_enabled(),
        available_tokens: state.limiter.available_tokens(),
    };

    Json(HealthResponse::healthy(
        state.started_at.elapsed().as_secs(),
        cache,
        rate_limiter,
    ))
}
