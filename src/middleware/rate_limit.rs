use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

/// Token bucket shared by every route behind the layer. Holds up to `rps`
/// tokens and refills continuously at `rps` per second, so a full second's
/// allowance can arrive as one burst.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    capacity: f64,
    bucket: Arc<Mutex<Bucket>>,
}

impl RateLimiter {
    pub fn new(rps: u32) -> Self {
        let capacity = f64::from(rps.max(1));
        Self {
            capacity,
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: capacity,
                refilled_at: Instant::now(),
            })),
        }
    }

    /// Takes one token, or reports how long until one is available.
    pub fn acquire(&self) -> Result<(), Duration> {
        self.acquire_at(Instant::now())
    }

    fn acquire_at(&self, now: Instant) -> Result<(), Duration> {
        let mut bucket = self.bucket.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let elapsed = now.saturating_duration_since(bucket.refilled_at).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.capacity).min(self.capacity);
        bucket.refilled_at = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - bucket.tokens;
            Err(Duration::from_secs_f64(missing / self.capacity))
        }
    }
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    match limiter.acquire() {
        Ok(()) => next.run(req).await,
        Err(wait) => {
            let retry_after = wait.as_secs().max(1);
            tracing::warn!(path = %req.uri().path(), retry_after, "rate limit exceeded");
            let mut resp = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "rate_limit_exceeded" })),
            )
                .into_response();
            resp.headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            resp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_up_to_capacity_then_refills_gradually() {
        let limiter = RateLimiter::new(4);
        let start = Instant::now();
        for _ in 0..4 {
            assert!(limiter.acquire_at(start).is_ok());
        }
        let wait = limiter.acquire_at(start).unwrap_err();
        assert!(wait <= Duration::from_millis(250));

        assert!(limiter.acquire_at(start + Duration::from_millis(260)).is_ok());
        assert!(limiter.acquire_at(start + Duration::from_millis(260)).is_err());
    }

    #[test]
    fn idle_time_never_exceeds_capacity() {
        let limiter = RateLimiter::new(2);
        let start = Instant::now();
        let later = start + Duration::from_secs(60);
        assert!(limiter.acquire_at(later).is_ok());
        assert!(limiter.acquire_at(later).is_ok());
        assert!(limiter.acquire_at(later).is_err());
    }

    #[test]
    fn zero_rps_still_admits_one_request() {
        let limiter = RateLimiter::new(0);
        let start = Instant::now();
        assert!(limiter.acquire_at(start).is_ok());
        assert!(limiter.acquire_at(start).is_err());
    }
}
