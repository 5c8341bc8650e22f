//! API Middleware (Auth, Rate Limiting, Logging)

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::handlers::AppState;
use super::types::{ApiError, ApiResponse};

/// Rate limiter configuration
pub struct RateLimitConfig {
    /// Requests per window
    pub requests_per_window: u32,
    /// Window duration
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 100,
            window_duration: Duration::from_secs(60),
        }
    }
}

/// In-memory fixed-window rate limiter
pub struct RateLimiter {
    /// Request counts per API key / IP
    requests: DashMap<String, (u32, Instant)>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            requests: DashMap::new(),
            config,
        }
    }

    /// Check if request is allowed, returns (allowed, remaining, reset_seconds)
    pub fn check(&self, key: &str) -> (bool, u32, u64) {
        let now = Instant::now();

        let mut entry = self.requests.entry(key.to_string()).or_insert((0, now));

        // Reset window if expired
        if now.duration_since(entry.1) > self.config.window_duration {
            entry.0 = 0;
            entry.1 = now;
        }

        let reset_secs = self
            .config
            .window_duration
            .saturating_sub(now.duration_since(entry.1))
            .as_secs();

        if entry.0 >= self.config.requests_per_window {
            return (false, 0, reset_secs);
        }

        entry.0 += 1;
        let remaining = self.config.requests_per_window - entry.0;
        (true, remaining, reset_secs)
    }

    /// Drop entries idle for two windows, returns how many were removed
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let before = self.requests.len();
        self.requests.retain(|_, (_, timestamp)| {
            now.duration_since(*timestamp) < self.config.window_duration * 2
        });
        before.saturating_sub(self.requests.len())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Periodically evict stale rate limiter entries
pub fn start_cleanup_task(limiter: Arc<RateLimiter>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(120));
        loop {
            interval.tick().await;
            let removed = limiter.cleanup();
            if removed > 0 {
                info!("🧹 Rate limiter cleanup: {} idle keys removed", removed);
            }
        }
    });
}

fn is_health_path(request: &Request) -> bool {
    matches!(request.uri().path(), "/health" | "/v1/health")
}

fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-api-key").and_then(|v| v.to_str().ok())
}

fn reject(status: StatusCode, error: ApiError) -> Response {
    (status, Json(ApiResponse::error(error, 0.0))).into_response()
}

/// API Key authentication middleware; an empty key set leaves the API open
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    if is_health_path(&request) || state.api_keys.is_empty() {
        return next.run(request).await;
    }

    match api_key(&headers) {
        Some(key) if state.api_keys.contains(key) => next.run(request).await,
        Some(_) => {
            warn!("🔒 Invalid API key attempted");
            reject(StatusCode::UNAUTHORIZED, ApiError::unauthorized())
        }
        None => reject(StatusCode::UNAUTHORIZED, ApiError::unauthorized()),
    }
}

/// Pick the bucket a request counts against.
/// Only accepted API keys get their own bucket; anything else falls back to the client IP.
fn rate_key(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(key) = api_key(headers).filter(|k| state.api_keys.contains(*k)) {
        return format!("key:{}", key);
    }

    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .unwrap_or("unknown");
    format!("ip:{}", ip)
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    if is_health_path(&request) {
        return next.run(request).await;
    }

    let bucket = rate_key(&state, &headers);
    let (allowed, remaining, reset) = state.rate_limiter.check(&bucket);

    if !allowed {
        warn!(bucket = %bucket, "⏳ Rate limit exceeded");
        return reject(StatusCode::TOO_MANY_REQUESTS, ApiError::rate_limited(reset));
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Remaining", remaining.into());
    headers.insert("X-RateLimit-Reset", reset.into());

    response
}

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    info!(
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        latency_ms = %start.elapsed().as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_window() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_window: 2,
            window_duration: Duration::from_secs(60),
        });

        let (allowed, remaining, _) = limiter.check("k");
        assert!(allowed);
        assert_eq!(remaining, 1);
        let (allowed, remaining, _) = limiter.check("k");
        assert!(allowed);
        assert_eq!(remaining, 0);
        let (allowed, _, _) = limiter.check("k");
        assert!(!allowed);

        // other keys have their own window
        assert!(limiter.check("other").0);
    }

    fn app_state(keys: &[&str]) -> AppState {
        AppState::new(
            crate::TransactionAnalyzer::default(),
            Arc::new(crate::TelemetryCollector::with_export_dir(std::env::temp_dir())),
            crate::Network::Testnet,
        )
        .with_api_keys(keys.iter().map(|k| k.to_string()))
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, value.parse().unwrap());
        }
        map
    }

    #[test]
    fn test_rate_key_ignores_unknown_api_keys() {
        let state = app_state(&["sk_live"]);

        let forged = headers(&[("x-api-key", "made-up"), ("x-forwarded-for", "10.0.0.7, 172.16.0.1")]);
        assert_eq!(rate_key(&state, &forged), "ip:10.0.0.7");

        let accepted = headers(&[("x-api-key", "sk_live"), ("x-forwarded-for", "10.0.0.7")]);
        assert_eq!(rate_key(&state, &accepted), "key:sk_live");

        // open API: a key header never opens a fresh bucket
        let open = app_state(&[]);
        let any = headers(&[("x-api-key", "whatever"), ("x-real-ip", "10.0.0.9")]);
        assert_eq!(rate_key(&open, &any), "ip:10.0.0.9");
        assert_eq!(rate_key(&open, &HeaderMap::new()), "ip:unknown");
    }

    #[test]
    fn test_cleanup_keeps_fresh_entries() {
        let limiter = RateLimiter::default();
        limiter.check("a");
        assert_eq!(limiter.cleanup(), 0);
    }
}
