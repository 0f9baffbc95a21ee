use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};

use crate::protocol::messages::ErrorResponse;

struct Bucket {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request counter keyed by client address. A window opens on
/// the first request from an address and everything past the cap inside it
/// gets told how long to wait.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    buckets: Mutex<HashMap<IpAddr, Bucket>>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        RateLimiter {
            window,
            max_requests,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, client: IpAddr) -> RateDecision {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().unwrap();

        // keep the map bounded under address churn
        if buckets.len() > 1024 {
            buckets.retain(|_, bucket| bucket.reset_at > now);
        }

        let bucket = buckets.entry(client).or_insert_with(|| Bucket {
            count: 0,
            reset_at: now + self.window,
        });
        if bucket.reset_at <= now {
            bucket.count = 0;
            bucket.reset_at = now + self.window;
        }
        if bucket.count >= self.max_requests {
            let retry_after_secs = (bucket.reset_at - now).as_secs_f64().ceil().max(1.0) as u64;
            return RateDecision::Limited { retry_after_secs };
        }
        bucket.count += 1;
        RateDecision::Allowed
    }
}

/// Axum middleware wrapper; requests arriving without connection info (unit
/// tests, exotic transports) share one bucket.
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limiter.check(client) {
        RateDecision::Allowed => next.run(request).await,
        RateDecision::Limited { retry_after_secs } => {
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse {
                    error: "too many requests, retry shortly".to_string(),
                }),
            )
                .into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, retry_after_secs.into());
            response
        }
    }
}
