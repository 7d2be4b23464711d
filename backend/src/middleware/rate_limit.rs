//! Per-client request throttling.
//!
//! Each client IP gets a token bucket holding `max_requests` tokens that
//! refills evenly across `window`. A request finding the bucket empty is
//! answered with 429 and a `Retry-After` header; the inner service is not
//! called.

use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::Error;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderValue};
use futures_util::future::{Either, LocalBoxFuture, Ready, ready};
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::config::RunMode;
use crate::domain::{ApiError, AppError};

/// Message returned with every throttled response.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

const WINDOW: Duration = Duration::from_secs(15 * 60);
const PRODUCTION_MAX: u32 = 100;
const DEFAULT_MAX: u32 = 1000;

/// Keyed rate-limiting middleware.
///
/// Clones share one limiter, so build it once outside the `HttpServer`
/// factory closure.
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
    clock: DefaultClock,
}

impl RateLimit {
    /// Allow `max_requests` per client across `window`.
    ///
    /// Returns `None` when `window` is too short to divide among the tokens.
    pub fn new(max_requests: NonZeroU32, window: Duration) -> Option<Self> {
        let quota = Quota::with_period(window / max_requests.get())?.allow_burst(max_requests);
        Some(Self::from_quota(quota))
    }

    /// Limits for `mode`: 100 requests per 15 minutes in production, 1000
    /// otherwise.
    pub fn for_mode(mode: RunMode) -> Self {
        let max = if mode == RunMode::Production {
            PRODUCTION_MAX
        } else {
            DEFAULT_MAX
        };
        let max_requests = NonZeroU32::new(max).unwrap_or(NonZeroU32::MIN);
        Self::new(max_requests, WINDOW)
            .unwrap_or_else(|| Self::from_quota(Quota::per_second(max_requests)))
    }

    fn from_quota(quota: Quota) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
            clock: DefaultClock::default(),
        }
    }

    /// Seconds until `client` may retry, or `None` when the request is allowed.
    fn check(&self, client: IpAddr) -> Option<u64> {
        self.limiter.check_key(&client).err().map(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            wait.as_secs().saturating_add(u64::from(wait.subsec_nanos() > 0)).max(1)
        })
    }
}

impl std::fmt::Debug for RateLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimit").finish_non_exhaustive()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limit: self.clone(),
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
pub struct RateLimitMiddleware<S> {
    service: S,
    limit: RateLimit,
}

fn client_ip(req: &ServiceRequest) -> IpAddr {
    req.peer_addr()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |addr| addr.ip())
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Either<
        LocalBoxFuture<'static, Result<Self::Response, Self::Error>>,
        Ready<Result<Self::Response, Self::Error>>,
    >;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(retry_after) = self.limit.check(client_ip(&req)) else {
            let fut = self.service.call(req);
            return Either::Left(Box::pin(async move {
                fut.await.map(ServiceResponse::map_into_left_body)
            }));
        };

        let mut res = req.error_response(ApiError::from(AppError::too_many_requests(
            RATE_LIMIT_MESSAGE,
        )));
        res.response_mut()
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        Either::Right(ready(Ok(res.map_into_right_body())))
    }
}
