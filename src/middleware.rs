use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};

use crate::{AppState, config::RateLimitConfig, error::ApiError};

/// Per-client-IP keyed limiter.
pub type IpRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// RateLimiters
///
/// The two limiters carried in the application state: a global one applied to
/// every route, and a stricter one layered onto the credential endpoints.
#[derive(Clone)]
pub struct RateLimiters {
    pub global: Arc<IpRateLimiter>,
    pub auth: Arc<IpRateLimiter>,
}

impl RateLimiters {
    pub fn new(global: RateLimitConfig, auth: RateLimitConfig) -> Self {
        Self {
            global: build_limiter(global),
            auth: build_limiter(auth),
        }
    }
}

/// Builds a keyed limiter equivalent to "max requests per window": tokens
/// replenish at max/window and the burst capacity is the full window's worth.
fn build_limiter(config: RateLimitConfig) -> Arc<IpRateLimiter> {
    let max = NonZeroU32::new(config.max.max(1)).expect("rate limit max is at least 1");
    let replenish_ms = (config.window_ms / u64::from(max.get())).max(1);
    let quota = Quota::with_period(Duration::from_millis(replenish_ms))
        .expect("rate limit period is non-zero")
        .allow_burst(max);
    Arc::new(RateLimiter::keyed(quota))
}

/// Global rate limit, applied to the whole router.
pub async fn global_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(&state.limits.global, request, next).await
}

/// Stricter limit for /auth/register and /auth/login, on top of the global
/// one.
pub async fn auth_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(&state.limits.auth, request, next).await
}

async fn enforce(limiter: &IpRateLimiter, request: Request, next: Next) -> Response {
    let ip = client_ip(&request);
    if limiter.check_key(&ip).is_err() {
        return ApiError::TooManyRequests.into_response();
    }
    next.run(request).await
}

/// Client address as recorded by the connect-info service. Requests arriving
/// without one (direct service calls in tests) share a single bucket.
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Baseline security headers on every response.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_blocks_after_burst() {
        let limiter = build_limiter(RateLimitConfig {
            window_ms: 60_000,
            max: 3,
        });
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

        for _ in 0..3 {
            assert!(limiter.check_key(&ip).is_ok());
        }
        assert!(limiter.check_key(&ip).is_err());

        // A different client has its own bucket.
        let other = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        assert!(limiter.check_key(&other).is_ok());
    }
}
