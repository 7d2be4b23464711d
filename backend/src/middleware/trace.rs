//! Tracing middleware attaching a request-scoped trace identifier.
//!
//! Each request runs inside [`TraceId::scope`] so handlers, error rendering,
//! and log lines share one correlation id. The id is echoed in the
//! `trace-id` response header. A well-formed inbound `trace-id` header is
//! reused so callers can correlate across services.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{error, info};

use crate::config::RunMode;
use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Tracing middleware adding a `trace-id` header to every response and,
/// outside test mode, logging each completed request.
///
/// Handlers can read the trace ID via [`TraceId::current`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::Trace;
/// use backend::config::RunMode;
///
/// let app = App::new().wrap(Trace::for_mode(RunMode::Development));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Trace {
    log_requests: bool,
}

impl Trace {
    /// Middleware configured for `mode`.
    pub fn for_mode(mode: RunMode) -> Self {
        Self {
            log_requests: mode.logs_requests(),
        }
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::for_mode(RunMode::default())
    }
}

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware {
            service,
            log_requests: self.log_requests,
        }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
    log_requests: bool,
}

fn inbound_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(TraceId::from_header)
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = inbound_trace_id(&req).unwrap_or_else(TraceId::generate);
        let log_requests = self.log_requests;
        let method = req.method().clone();
        let path = req.path().to_owned();
        let started = Instant::now();
        let fut = self.service.call(req);
        Box::pin(TraceId::scope(trace_id, async move {
            let mut res = fut.await?;
            match HeaderValue::from_str(&trace_id.to_string()) {
                Ok(value) => {
                    res.response_mut()
                        .headers_mut()
                        .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                }
                Err(error) => {
                    error!(
                        %error,
                        trace_id = %trace_id,
                        "failed to encode trace identifier header"
                    );
                }
            }
            if log_requests {
                info!(
                    trace_id = %trace_id,
                    method = %method,
                    path = %path,
                    status = res.status().as_u16(),
                    latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "request completed"
                );
            }
            Ok(res)
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Trace id propagation.

    use super::*;
    use actix_web::{App, HttpResponse, test as actix_test, web};

    async fn call_with_header(header: Option<&str>) -> (String, String) {
        let app = actix_test::init_service(
            App::new()
                .wrap(Trace::for_mode(RunMode::Test))
                .route(
                    "/",
                    web::get().to(|| async {
                        let id = TraceId::current().expect("trace id in scope");
                        HttpResponse::Ok().body(id.to_string())
                    }),
                ),
        )
        .await;
        let mut req = actix_test::TestRequest::get().uri("/");
        if let Some(value) = header {
            req = req.insert_header((TRACE_ID_HEADER, value));
        }
        let res = actix_test::call_service(&app, req.to_request()).await;
        let header = res
            .headers()
            .get(TRACE_ID_HEADER)
            .expect("trace id header")
            .to_str()
            .expect("header is ascii")
            .to_owned();
        let body = actix_test::read_body(res).await;
        let body = std::str::from_utf8(&body).expect("utf8 body").to_owned();
        (header, body)
    }

    #[actix_web::test]
    async fn exposes_generated_trace_id_to_handlers() {
        let (header, body) = call_with_header(None).await;
        assert_eq!(header, body);
        assert!(TraceId::from_header(&header).is_some());
    }

    #[actix_web::test]
    async fn reuses_inbound_trace_id() {
        let inbound = "7d444840-9dc0-11d1-b245-5ffdce74fad2";
        let (header, body) = call_with_header(Some(inbound)).await;
        assert_eq!(header, inbound);
        assert_eq!(body, inbound);
    }

    #[actix_web::test]
    async fn replaces_malformed_inbound_trace_id() {
        let (header, _) = call_with_header(Some("not-a-uuid")).await;
        assert_ne!(header, "not-a-uuid");
    }
}
