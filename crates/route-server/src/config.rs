//! Server configuration from environment.

use route_core::EditorConfig;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Open-Meteo compatible elevation endpoint; empty means flat terrain
    pub elevation_provider_url: String,
    pub elevation_timeout_s: u64,
    pub elevation_max_points_per_request: usize,
    pub elevation_cache_ttl_s: u64,
    pub elevation_cache_max_entries: usize,
    /// Pending intents buffered per session before senders wait
    pub session_queue_depth: usize,
    /// Sessions with no request for this long are dropped
    pub session_idle_ttl_s: u64,
    pub session_reap_interval_s: u64,
    pub editor: EditorConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = EditorConfig::default();
        Self {
            server_port: parse_env("ROUTE_PORT", 3000),
            elevation_provider_url: env::var("ELEVATION_PROVIDER_URL")
                .unwrap_or_else(|_| "https://api.open-meteo.com/v1/elevation".to_string()),
            elevation_timeout_s: parse_env("ELEVATION_TIMEOUT_S", 10),
            elevation_max_points_per_request: parse_env("ELEVATION_MAX_POINTS_PER_REQUEST", 100),
            elevation_cache_ttl_s: parse_env("ELEVATION_CACHE_TTL_S", 3600),
            elevation_cache_max_entries: parse_env("ELEVATION_CACHE_MAX_ENTRIES", 50_000),
            session_queue_depth: parse_env("ROUTE_SESSION_QUEUE_DEPTH", 64),
            session_idle_ttl_s: parse_env("ROUTE_SESSION_IDLE_TTL_S", 1800),
            session_reap_interval_s: parse_env("ROUTE_SESSION_REAP_INTERVAL_S", 60),
            editor: EditorConfig {
                history_limit: parse_env("ROUTE_HISTORY_LIMIT", defaults.history_limit),
                sample_spacing_m: parse_env("ROUTE_SAMPLE_SPACING_M", defaults.sample_spacing_m),
                ..defaults
            },
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
