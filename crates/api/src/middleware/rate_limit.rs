//! Per-client request limiting for sensitive route groups.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::json_error;

/// Tracked clients before idle entries are swept.
const SWEEP_THRESHOLD: usize = 1024;

/// Sliding-window request counter keyed by client IP.
///
/// Requests without a known peer address share one bucket.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    hits: Arc<Mutex<HashMap<Option<IpAddr>, Vec<Instant>>>>,
}

impl RateLimiter {
    /// Allows `limit` requests per client in any `window`.
    #[must_use]
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Records a request from `client`.
    ///
    /// # Errors
    ///
    /// Returns the seconds until a slot frees up when the client is over
    /// its limit. Rejected requests are not counted.
    pub async fn check(&self, client: Option<IpAddr>) -> Result<(), u64> {
        let now = Instant::now();
        let mut hits = self.hits.lock().await;

        if hits.len() > SWEEP_THRESHOLD {
            hits.retain(|_, seen| {
                seen.last()
                    .is_some_and(|t| now.duration_since(*t) < self.window)
            });
        }

        let seen = hits.entry(client).or_default();
        seen.retain(|t| now.duration_since(*t) < self.window);

        if seen.len() >= self.limit {
            let oldest = seen.first().copied().unwrap_or(now);
            let wait = self.window.saturating_sub(now.duration_since(oldest));
            return Err(wait.as_secs().max(1));
        }

        seen.push(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    /// 100 requests per 15 minutes.
    fn default() -> Self {
        Self::new(100, Duration::from_secs(15 * 60))
    }
}

/// Rejects requests over the limiter's budget with 429 and `Retry-After`.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match limiter.check(client).await {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            warn!(client = ?client, path = %request.uri().path(), "Rate limit exceeded");
            let mut response = json_error(
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests, please try again later",
            );
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}
