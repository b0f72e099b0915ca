//! Per-client request quota over a rolling window.
//!
//! Each client address keeps a log of the instants its admitted requests
//! arrived. A request is admitted while fewer than `limit` instants fall inside
//! the window. Logs live in a moka cache that evicts clients idle for a full
//! window, which is exactly when their log would be empty anyway.

use crate::config::RateLimitConfig;
use crate::error::GraderError;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use moka::future::Cache;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Key used for requests that arrive without peer address information.
pub const UNKNOWN_CLIENT: &str = "unknown";

const MAX_TRACKED_CLIENTS: u64 = 100_000;

type RequestLog = Arc<Mutex<VecDeque<Instant>>>;

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Request admitted; `remaining` more fit in the current window.
    Allowed { remaining: u32 },
    /// Quota used up; the oldest counted request expires after `retry_after`.
    Limited { retry_after: Duration },
}

/// In-memory sliding-log rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    clients: Cache<String, RequestLog>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        let clients = Cache::builder()
            .max_capacity(MAX_TRACKED_CLIENTS)
            .time_to_idle(window)
            .build();

        Self {
            limit,
            window,
            clients,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests, Duration::from_secs(config.window_secs))
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Check and count a request from `client` arriving now.
    pub async fn check(&self, client: &str) -> Decision {
        self.check_at(client, Instant::now()).await
    }

    /// Check and count a request from `client` arriving at `now`.
    ///
    /// Rejected requests are not recorded.
    pub async fn check_at(&self, client: &str, now: Instant) -> Decision {
        let log = self
            .clients
            .get_with(client.to_string(), async {
                Arc::new(Mutex::new(VecDeque::new()))
            })
            .await;

        let mut log = log.lock().await;

        while let Some(&oldest) = log.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                log.pop_front();
            } else {
                break;
            }
        }

        if (log.len() as u32) < self.limit {
            log.push_back(now);
            Decision::Allowed {
                remaining: self.limit - log.len() as u32,
            }
        } else {
            let retry_after = log
                .front()
                .map(|&oldest| self.window.saturating_sub(now.saturating_duration_since(oldest)))
                .unwrap_or(self.window);
            Decision::Limited { retry_after }
        }
    }

    /// Requests `client` may still make right now, without counting one.
    pub async fn remaining(&self, client: &str) -> u32 {
        self.remaining_at(client, Instant::now()).await
    }

    pub async fn remaining_at(&self, client: &str, now: Instant) -> u32 {
        let Some(log) = self.clients.get(client).await else {
            return self.limit;
        };

        let log = log.lock().await;
        let counted = log
            .iter()
            .filter(|&&at| now.saturating_duration_since(at) < self.window)
            .count() as u32;
        self.limit.saturating_sub(counted)
    }
}

/// Identify the caller by peer IP address.
pub fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Middleware rejecting requests over quota before the handler runs.
pub async fn enforce_quota(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(&request);

    match limiter.check(&client).await {
        Decision::Allowed { remaining } => {
            tracing::debug!(client = %client, remaining, "quota check passed");
            next.run(request).await
        }
        Decision::Limited { retry_after } => {
            let error = GraderError::QuotaExceeded {
                limit: limiter.limit(),
                retry_after_secs: round_up_secs(retry_after),
            };
            tracing::warn!(
                client = %client,
                error_type = error.error_type(),
                retry_after_secs = retry_after.as_secs(),
                "quota exceeded"
            );
            error.into_response()
        }
    }
}

fn round_up_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.max(1)
}
