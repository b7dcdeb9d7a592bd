//! Per-client rate limiting
//!
//! Token bucket per client address, held in process memory. Each bucket holds
//! `requests_per_minute` tokens and refills continuously at
//! `requests_per_minute / 60` tokens per second, so a client may burst the
//! whole minute's budget and then proceeds at the steady rate.
//!
//! # Client key
//!
//! The first of these that is present:
//! - `X-Real-IP`
//! - the first hop of `X-Forwarded-For`
//! - the peer address from `ConnectInfo`
//!
//! Requests with none of them share the `unknown` bucket.
//!
//! # Headers
//!
//! - `X-RateLimit-Limit`: requests allowed per minute
//! - `X-RateLimit-Remaining`: tokens left after this request
//! - `X-RateLimit-Reset`: Unix timestamp when the bucket is full again
//! - `Retry-After`: seconds to wait (429 responses only)

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;

use crate::app::AppState;
use crate::error::ApiError;

/// Buckets idle this long are full again and can be forgotten
const WINDOW: Duration = Duration::from_secs(60);

/// Tracked clients before idle buckets are pruned
const PRUNE_THRESHOLD: usize = 10_000;

/// Rate limit configuration
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub requests_per_minute: u32,
}

impl RateLimit {
    fn capacity(&self) -> f64 {
        f64::from(self.requests_per_minute)
    }

    /// Tokens per second
    fn refill_rate(&self) -> f64 {
        self.capacity() / WINDOW.as_secs_f64()
    }
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    fn refill(&mut self, rate: f64, capacity: f64, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(capacity);
        self.last_refill = now;
    }

    fn try_consume(&mut self) -> bool {
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Seconds until `target` tokens are available, rounded up
    fn seconds_until(&self, target: f64, rate: f64) -> u64 {
        let deficit = target - self.tokens;
        if deficit <= 0.0 {
            0
        } else {
            (deficit / rate).ceil() as u64
        }
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    pub ok: bool,
    pub remaining: u32,

    /// Seconds until a retry can succeed when rejected, or until the bucket is
    /// full when allowed
    pub reset_after: u64,
}

/// In-memory token buckets keyed by client
pub struct RateLimiter {
    limit: RateLimit,
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            limit: RateLimit {
                requests_per_minute: requests_per_minute.max(1),
            },
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Consumes one token for `key`, if one is available
    pub fn check(&self, key: &str) -> RateLimitResult {
        let now = Instant::now();
        let capacity = self.limit.capacity();
        let rate = self.limit.refill_rate();

        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());

        if buckets.len() >= PRUNE_THRESHOLD && !buckets.contains_key(key) {
            buckets.retain(|_, b| now.saturating_duration_since(b.last_refill) < WINDOW);
        }

        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::full(capacity, now));
        bucket.refill(rate, capacity, now);

        if bucket.try_consume() {
            RateLimitResult {
                ok: true,
                remaining: bucket.tokens.floor() as u32,
                reset_after: bucket.seconds_until(capacity, rate),
            }
        } else {
            RateLimitResult {
                ok: false,
                remaining: 0,
                reset_after: bucket.seconds_until(1.0, rate).max(1),
            }
        }
    }

    /// Number of clients currently tracked
    pub fn tracked(&self) -> usize {
        self.buckets.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Resolves the rate limit key for a request
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(real_ip) = header("x-real-ip") {
        return real_ip.to_string();
    }

    if let Some(hop) = header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return hop.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiting middleware layer
///
/// # Errors
///
/// 429 Too Many Requests with `Retry-After` when the client's bucket is empty.
pub async fn rate_limit_layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer);

    let result = state.rate_limiter.check(&key);
    if !result.ok {
        tracing::warn!(client = %key, retry_after = result.reset_after, "Rate limit exceeded");
        return Err(ApiError::RateLimitExceeded {
            retry_after: result.reset_after,
            message: format!(
                "Rate limit exceeded. Try again in {} seconds",
                result.reset_after
            ),
        });
    }

    let mut response = next.run(request).await;

    let now_unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let headers = response.headers_mut();
    headers.insert(
        "X-RateLimit-Limit",
        HeaderValue::from(state.rate_limiter.limit().requests_per_minute),
    );
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(result.remaining));
    headers.insert(
        "X-RateLimit-Reset",
        HeaderValue::from(now_unix + result.reset_after),
    );

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_reject() {
        let limiter = RateLimiter::new(3);

        assert_eq!(limiter.check("1.2.3.4").remaining, 2);
        assert_eq!(limiter.check("1.2.3.4").remaining, 1);
        assert!(limiter.check("1.2.3.4").ok);

        let rejected = limiter.check("1.2.3.4");
        assert!(!rejected.ok);
        // 3 per minute refills one token every 20 seconds
        assert_eq!(rejected.reset_after, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_over_time() {
        let limiter = RateLimiter::new(60);
        for _ in 0..60 {
            assert!(limiter.check("client").ok);
        }
        assert!(!limiter.check("client").ok);

        advance(Duration::from_secs(2)).await;
        assert!(limiter.check("client").ok);
        assert!(limiter.check("client").ok);
        assert!(!limiter.check("client").ok);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clients_isolated() {
        let limiter = RateLimiter::new(1);
        assert!(limiter.check("a").ok);
        assert!(!limiter.check("a").ok);
        assert!(limiter.check("b").ok);
        assert_eq!(limiter.tracked(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_capped_at_capacity() {
        let limiter = RateLimiter::new(5);
        assert!(limiter.check("a").ok);

        advance(Duration::from_secs(600)).await;
        assert_eq!(limiter.check("a").remaining, 4);
    }

    #[test]
    fn test_seconds_until() {
        let bucket = TokenBucket {
            tokens: 2.0,
            last_refill: Instant::now(),
        };
        assert_eq!(bucket.seconds_until(5.0, 1.0), 3);
        assert_eq!(bucket.seconds_until(1.0, 1.0), 0);
    }

    #[test]
    fn test_client_key_precedence() {
        let peer: SocketAddr = "10.0.0.9:5555".parse().unwrap();

        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers, None), "unknown");
        assert_eq!(client_key(&headers, Some(peer)), "10.0.0.9");

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_key(&headers, Some(peer)), "203.0.113.7");

        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_key(&headers, Some(peer)), "198.51.100.2");
    }
}
