//! Response DTOs for the demo server
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for GET /lookup/:key
#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    /// The requested key
    pub key: String,
    /// The resolved value
    pub value: String,
    /// Whether the value came from the cache rather than the upstream
    pub cached: bool,
}

impl LookupResponse {
    pub fn new(key: impl Into<String>, value: impl Into<String>, cached: bool) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            cached,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Entries removed by the background sweep
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.entries,
        }
    }
}

// == Health ==
#[derive(Debug, Clone, Serialize)]
pub struct CacheHealth {
    pub enabled: bool,
    pub entries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateLimiterHealth {
    pub enabled: bool,
    /// Absent when the limiter is disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_tokens: Option<u64>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
    /// Seconds since the server state was built
    pub uptime_secs: u64,
    pub cache: CacheHealth,
    pub rate_limiter: RateLimiterHealth,
}

impl HealthResponse {
    /// Creates a healthy response stamped with the current time.
    pub fn healthy(uptime_secs: u64, cache: CacheHealth, rate_limiter: RateLimiterHealth) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_secs,
            cache,
            rate_limiter,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_response_serialize() {
        let resp = LookupResponse::new("user:1", "value:user:1", true);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "user:1");
        assert_eq!(json["cached"], true);
    }

    #[test]
    fn test_stats_response_from_cache_stats() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            evictions: 5,
            expirations: 2,
            entries: 100,
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.total_entries, 100);
        assert_eq!(resp.expirations, 2);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::from(CacheStats::default());
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy(
            12,
            CacheHealth {
                enabled: true,
                entries: 3,
            },
            RateLimiterHealth {
                enabled: false,
                available_tokens: None,
            },
        );
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["status"], "healthy");
        assert_eq!(json["uptime_secs"], 12);
        assert_eq!(json["cache"]["entries"], 3);
        assert!(json["rate_limiter"].get("available_tokens").is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"error":"Something went wrong"}"#);
    }
}
