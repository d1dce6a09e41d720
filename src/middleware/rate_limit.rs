use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header::RETRY_AFTER, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// Stale windows are swept once this many clients are tracked.
const SWEEP_AT: usize = 4096;

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

/// Fixed-window request budget, counted separately for each client address.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    scope: &'static str,
    limit: u32,
    period: Duration,
    clients: Arc<Mutex<HashMap<String, WindowState>>>,
}

impl RateLimiter {
    pub fn per_second(scope: &'static str, limit: u32) -> Self {
        Self::new(scope, limit, Duration::from_secs(1))
    }

    pub fn per_minute(scope: &'static str, limit: u32) -> Self {
        Self::new(scope, limit, Duration::from_secs(60))
    }

    fn new(scope: &'static str, limit: u32, period: Duration) -> Self {
        Self {
            scope,
            limit: limit.max(1),
            period,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn allow(&self, client: &str) -> bool {
        self.allow_at(client, Instant::now())
    }

    fn allow_at(&self, client: &str, now: Instant) -> bool {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        if clients.len() >= SWEEP_AT {
            clients.retain(|_, w| now.duration_since(w.start) < self.period);
        }
        let window = clients
            .entry(client.to_string())
            .or_insert(WindowState { start: now, count: 0 });
        if now.duration_since(window.start) >= self.period {
            window.start = now;
            window.count = 0;
        }
        if window.count < self.limit {
            window.count += 1;
            true
        } else {
            false
        }
    }
}

/// Peer address when the server was started with connect info, else one shared bucket.
fn client_key(req: &Request<Body>) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = client_key(&req);
    if !limiter.allow(&client) {
        tracing::warn!(
            scope = limiter.scope,
            client = %client,
            path = %req.uri().path(),
            "Rate limit exceeded"
        );
        let retry_after = limiter.period.as_secs().max(1).to_string();
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(RETRY_AFTER, retry_after)],
            Json(json!({ "error": "Too many requests. Please slow down." })),
        )
            .into_response();
    }
    next.run(req).await
}
