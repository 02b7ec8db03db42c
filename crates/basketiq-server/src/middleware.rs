//! Request tagging, write-route API keys, and per-client rate budgets.
//!
//! Read routes are open. `POST` routes start feed fetches or bulk history
//! writes, so they need a bearer key (when keys are configured) and draw on
//! a much smaller budget than reads.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const API_KEYS_VAR: &str = "BASKETIQ_API_KEYS";
const ANONYMOUS_CLIENT: &str = "anonymous";

/// Tracked windows above this count trigger a sweep of expired ones.
const MAX_TRACKED_WINDOWS: usize = 1024;

/// Request ID stored as a request extension and echoed as `x-request-id`.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Whether a route only reads the catalog or triggers write-heavy work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    Read,
    Write,
}

impl RouteClass {
    #[must_use]
    pub fn of(method: &Method) -> Self {
        if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
            Self::Read
        } else {
            Self::Write
        }
    }
}

/// Bearer keys accepted on write routes.
#[derive(Debug, Clone)]
pub struct ApiKeys {
    keys: Arc<HashSet<String>>,
}

impl ApiKeys {
    /// Reads comma-separated keys from `BASKETIQ_API_KEYS`.
    ///
    /// # Errors
    ///
    /// Fails outside development when no key is configured.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var(API_KEYS_VAR).unwrap_or_default();
        Self::from_raw_keys(&raw, is_development)
    }

    /// Parses a comma-separated key list. Empty is allowed only in
    /// development, where write routes are then left open.
    ///
    /// # Errors
    ///
    /// Fails outside development when the list holds no key.
    pub fn from_raw_keys(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let keys: HashSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if keys.is_empty() {
            if !is_development {
                anyhow::bail!("{API_KEYS_VAR} must hold at least one key outside development");
            }
            tracing::warn!("{API_KEYS_VAR} not set; write routes are unauthenticated");
        }

        Ok(Self {
            keys: Arc::new(keys),
        })
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.keys.is_empty()
    }

    fn allows(&self, token: &str) -> bool {
        self.keys.contains(token)
    }
}

/// Requests allowed per client within one fixed window.
#[derive(Debug, Clone, Copy)]
pub struct RateBudget {
    pub max_requests: usize,
    pub window: Duration,
}

impl RateBudget {
    #[must_use]
    pub fn per_minute(max_requests: usize) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
struct Window {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter keyed by client and [`RouteClass`].
///
/// The client is the bearer token when one is sent, otherwise a shared
/// anonymous bucket.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    read: RateBudget,
    write: RateBudget,
    windows: Arc<Mutex<HashMap<(String, RouteClass), Window>>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(read: RateBudget, write: RateBudget) -> Self {
        Self {
            read,
            write,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn budget(&self, class: RouteClass) -> RateBudget {
        match class {
            RouteClass::Read => self.read,
            RouteClass::Write => self.write,
        }
    }

    /// Counts one request. `Err` carries the time left in the full window.
    pub async fn check(&self, client: &str, class: RouteClass) -> Result<(), Duration> {
        let budget = self.budget(class);
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        if windows.len() > MAX_TRACKED_WINDOWS {
            windows.retain(|(_, c), w| now.duration_since(w.started_at) < self.budget(*c).window);
        }

        let window = windows
            .entry((client.to_owned(), class))
            .or_insert(Window {
                started_at: now,
                count: 0,
            });
        if now.duration_since(window.started_at) >= budget.window {
            window.started_at = now;
            window.count = 0;
        }
        if window.count >= budget.max_requests {
            return Err(budget.window - now.duration_since(window.started_at));
        }
        window.count += 1;
        Ok(())
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map_or_else(String::new, |id| id.0.clone())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Uses the caller's `x-request-id` or a fresh `UUIDv4`.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Rejects write requests without a configured bearer key.
pub async fn require_api_key_for_writes(
    State(keys): State<ApiKeys>,
    req: Request,
    next: Next,
) -> Response {
    if RouteClass::of(req.method()) == RouteClass::Read || !keys.enabled() {
        return next.run(req).await;
    }

    match bearer_token(req.headers()) {
        Some(token) if keys.allows(token) => next.run(req).await,
        _ => ApiError::new(
            request_id_of(&req),
            "unauthorized",
            "write routes need a valid bearer token",
        )
        .into_response(),
    }
}

/// Applies the read or write budget for the calling client.
pub async fn enforce_rate_limit(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    let class = RouteClass::of(req.method());
    let client = bearer_token(req.headers()).unwrap_or(ANONYMOUS_CLIENT).to_owned();

    if let Err(retry_after) = limiter.check(&client, class).await {
        tracing::warn!(?class, retry_after_secs = retry_after.as_secs(), "rate limit hit");
        let mut res = ApiError::new(request_id_of(&req), "rate_limited", "rate limit exceeded")
            .into_response();
        // Whole seconds, rounded up.
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        if let Ok(val) = HeaderValue::from_str(&secs.to_string()) {
            res.headers_mut().insert(header::RETRY_AFTER, val);
        }
        return res;
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(authorization: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(authorization));
        headers
    }

    #[test]
    fn bearer_token_is_trimmed() {
        assert_eq!(bearer_token(&headers_with("Bearer  key-1 ")), Some("key-1"));
    }

    #[test]
    fn non_bearer_or_blank_token_is_ignored() {
        assert_eq!(bearer_token(&headers_with("Basic abc123")), None);
        assert_eq!(bearer_token(&headers_with("Bearer   ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn route_class_follows_method() {
        assert_eq!(RouteClass::of(&Method::GET), RouteClass::Read);
        assert_eq!(RouteClass::of(&Method::OPTIONS), RouteClass::Read);
        assert_eq!(RouteClass::of(&Method::POST), RouteClass::Write);
    }

    #[test]
    fn api_keys_may_be_empty_only_in_development() {
        let keys = ApiKeys::from_raw_keys("", true).expect("dev allows no keys");
        assert!(!keys.enabled());
        assert!(ApiKeys::from_raw_keys(" , ", false).is_err());
    }

    #[test]
    fn api_keys_trim_and_split() {
        let keys = ApiKeys::from_raw_keys(" alpha , beta,,", false).expect("keys");
        assert!(keys.enabled());
        assert!(keys.allows("alpha"));
        assert!(keys.allows("beta"));
        assert!(!keys.allows(""));
    }

    #[tokio::test]
    async fn write_budget_is_separate_from_reads() {
        let limiter = RateLimiter::new(RateBudget::per_minute(3), RateBudget::per_minute(1));

        assert!(limiter.check("anonymous", RouteClass::Write).await.is_ok());
        let retry = limiter
            .check("anonymous", RouteClass::Write)
            .await
            .expect_err("second write is over budget");
        assert!(retry <= Duration::from_secs(60));

        for _ in 0..3 {
            assert!(limiter.check("anonymous", RouteClass::Read).await.is_ok());
        }
        assert!(limiter.check("anonymous", RouteClass::Read).await.is_err());
    }

    #[tokio::test]
    async fn clients_have_independent_windows() {
        let limiter = RateLimiter::new(RateBudget::per_minute(1), RateBudget::per_minute(1));

        assert!(limiter.check("key-a", RouteClass::Write).await.is_ok());
        assert!(limiter.check("key-a", RouteClass::Write).await.is_err());
        assert!(limiter.check("key-b", RouteClass::Write).await.is_ok());
    }

    #[tokio::test]
    async fn window_resets_after_it_elapses() {
        let limiter = RateLimiter::new(
            RateBudget {
                max_requests: 1,
                window: Duration::from_millis(20),
            },
            RateBudget::per_minute(1),
        );

        assert!(limiter.check("anonymous", RouteClass::Read).await.is_ok());
        assert!(limiter.check("anonymous", RouteClass::Read).await.is_err());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(limiter.check("anonymous", RouteClass::Read).await.is_ok());
    }
}
