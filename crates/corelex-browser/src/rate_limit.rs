//! Per-client token bucket limiter as a `tower` layer.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use dashmap::DashMap;
use tower::{Layer, Service};
use tracing::{debug, warn};

const LOG_INTERVAL: Duration = Duration::from_secs(60);
const IDLE_BUCKET_TTL: Duration = Duration::from_secs(600);

#[derive(Clone)]
pub struct RateLimiter<S> {
    inner: S,
    state: SharedState,
    rate_per_sec: f64,
    burst: f64,
}

#[derive(Clone)]
struct SharedState {
    buckets: Arc<DashMap<String, Bucket>>,
    dropped_since_log: Arc<AtomicU64>,
    last_log: Arc<Mutex<Instant>>,
}

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Clone)]
pub struct RateLimiterLayer {
    rate_per_sec: f64,
    burst: f64,
}

impl RateLimiterLayer {
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        Self {
            rate_per_sec: rate_per_sec as f64,
            burst: burst as f64,
        }
    }
}

impl<S> Layer<S> for RateLimiterLayer {
    type Service = RateLimiter<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimiter {
            inner,
            state: SharedState {
                buckets: Arc::new(DashMap::new()),
                dropped_since_log: Arc::new(AtomicU64::new(0)),
                last_log: Arc::new(Mutex::new(Instant::now())),
            },
            rate_per_sec: self.rate_per_sec,
            burst: self.burst,
        }
    }
}

impl<S, ReqBody> Service<Request<ReqBody>> for RateLimiter<S>
where
    S: Service<Request<ReqBody>, Response = Response<Body>> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        housekeeping_if_due(&self.state);
        if let Some(client) = client_id(&req)
            && !self.check_and_consume(&client)
        {
            debug!(client = %client, "rate limited");
            self.state.dropped_since_log.fetch_add(1, Ordering::Relaxed);
            return Box::pin(async move {
                Ok((StatusCode::TOO_MANY_REQUESTS, "rate limited").into_response())
            });
        }

        let fut = self.inner.call(req);
        Box::pin(fut)
    }
}

/// Client key: the proxy-supplied client IP, else the first
/// `X-Forwarded-For` hop. Requests without either are not limited.
fn client_id<B>(req: &Request<B>) -> Option<String> {
    let headers = req.headers();
    headers
        .get("Fly-Client-IP")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("X-Forwarded-For")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').next())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .map(str::to_string)
}

impl<S> RateLimiter<S> {
    fn check_and_consume(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut entry = self
            .state
            .buckets
            .entry(client.to_string())
            .or_insert(Bucket {
                tokens: self.burst,
                last_refill: now,
            });
        let elapsed = now
            .saturating_duration_since(entry.last_refill)
            .as_secs_f64();
        if elapsed > 0.0 {
            entry.tokens = (entry.tokens + elapsed * self.rate_per_sec).min(self.burst);
            entry.last_refill = now;
        }
        if entry.tokens >= 1.0 {
            entry.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Once per interval: report drops and forget idle clients.
fn housekeeping_if_due(state: &SharedState) {
    let now = Instant::now();
    let mut last = match state.last_log.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if now.saturating_duration_since(*last) < LOG_INTERVAL {
        return;
    }
    let dropped = state.dropped_since_log.swap(0, Ordering::Relaxed);
    if dropped > 0 {
        warn!("rate limiter dropped {dropped} requests in the last minute");
    }
    state
        .buckets
        .retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < IDLE_BUCKET_TTL);
    *last = now;
}
