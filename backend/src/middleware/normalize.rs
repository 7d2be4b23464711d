//! Middleware rendering every failed response as one failure envelope.
//!
//! Handlers and extractors return errors; actix turns each into a response
//! that still carries the original error. This middleware replaces that
//! response with the envelope for the configured run mode, keeping any
//! non-body headers (such as `Retry-After`) the inner layers set.
//! Unrecognized failures are logged with the request path and method.

use std::task::{Context, Poll};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::{StatusCode, header};
use actix_web::{Error, HttpResponse};
use contracts::{ApiResponse, ErrorCode, ErrorPayload};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::error;

use crate::config::RunMode;
use crate::domain::ApiError;
use crate::inbound::http::error::{failure_response, render};

/// Error-rendering middleware.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::ErrorNormalizer;
/// use backend::config::RunMode;
///
/// let app = App::new().wrap(ErrorNormalizer::new(RunMode::Production));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ErrorNormalizer {
    mode: RunMode,
}

impl ErrorNormalizer {
    /// Render failures for `mode`.
    pub fn new(mode: RunMode) -> Self {
        Self { mode }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ErrorNormalizer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorNormalizerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorNormalizerMiddleware {
            service,
            mode: self.mode,
        }))
    }
}

/// Service wrapper produced by [`ErrorNormalizer`].
pub struct ErrorNormalizerMiddleware<S> {
    service: S,
    mode: RunMode,
}

/// Envelope for errors raised by actix itself rather than by handlers.
fn render_foreign(status: StatusCode, message: String) -> HttpResponse {
    let payload = if status.is_server_error() {
        ErrorPayload::new(ErrorCode::InternalError, "Internal server error")
    } else {
        ErrorPayload::new(ErrorCode::AppError, message)
    };
    failure_response(status, &ApiResponse::failure(payload))
}

fn carry_headers(from: &HttpResponse<impl MessageBody>, to: &mut HttpResponse) {
    for (name, value) in from.headers() {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
            continue;
        }
        if !to.headers().contains_key(name) {
            to.headers_mut().insert(name.clone(), value.clone());
        }
    }
}

impl<S, B> Service<ServiceRequest> for ErrorNormalizerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let mode = self.mode;
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            let Some(err) = res.response().error() else {
                return Ok(res.map_into_left_body());
            };

            let path = res.request().path().to_owned();
            let method = res.request().method().to_string();
            let mut rendered = match err.as_error::<ApiError>() {
                Some(api_error) => {
                    if let ApiError::Internal(report) = api_error {
                        error!(%method, %path, error = ?report, "unhandled request failure");
                    }
                    render(api_error, mode)
                }
                None => {
                    let status = res.status();
                    if status.is_server_error() {
                        error!(%method, %path, error = %err, "unhandled request failure");
                    }
                    render_foreign(status, err.to_string())
                }
            };
            carry_headers(res.response(), &mut rendered);

            let (req, _) = res.into_parts();
            Ok(ServiceResponse::new(req, rendered).map_into_right_body())
        })
    }
}

#[cfg(test)]
mod tests {
    //! Rendering through the middleware.

    use actix_web::{App, HttpResponse, test as actix_test, web};
    use color_eyre::eyre;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::AppError;
    use crate::test_support::CapturedLogs;

    async fn failing(mode: RunMode, error: fn() -> ApiError) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .wrap(ErrorNormalizer::new(mode))
                .route(
                    "/",
                    web::get().to(move || async move { Err::<HttpResponse, _>(error()) }),
                ),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/").to_request(),
        )
        .await;
        let status = res.status();
        (status, actix_test::read_body_json(res).await)
    }

    #[rstest]
    #[case(RunMode::Development, true)]
    #[case(RunMode::Production, false)]
    #[actix_web::test]
    async fn internal_details_follow_the_run_mode(#[case] mode: RunMode, #[case] detailed: bool) {
        let (status, body) = failing(mode, || ApiError::internal(eyre::eyre!("db down"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], json!("INTERNAL_ERROR"));
        assert_eq!(body["error"].get("details").is_some(), detailed);
    }

    #[actix_web::test]
    async fn app_errors_keep_their_status() {
        let (status, body) = failing(RunMode::Production, || {
            AppError::conflict("Email already registered").into()
        })
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": { "code": "APP_ERROR", "message": "Email already registered" }
            })
        );
    }

    #[actix_web::test]
    async fn foreign_client_errors_become_app_errors() {
        let app = actix_test::init_service(
            App::new().wrap(ErrorNormalizer::new(RunMode::Test)).route(
                "/",
                web::get().to(|| async {
                    Err::<HttpResponse, _>(actix_web::error::ErrorForbidden("nope"))
                }),
            ),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["error"]["code"], json!("APP_ERROR"));
        assert_eq!(body["error"]["message"], json!("nope"));
    }

    #[actix_web::test]
    async fn successful_responses_pass_through() {
        let app = actix_test::init_service(
            App::new()
                .wrap(ErrorNormalizer::new(RunMode::Test))
                .route("/", web::get().to(|| async { HttpResponse::Ok().body("fine") })),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(res).await, "fine");
    }

    #[actix_web::test]
    async fn unrecognized_failures_are_logged_with_method_and_path() {
        let (logs, _guard) = CapturedLogs::install();
        let app = actix_test::init_service(
            App::new().wrap(ErrorNormalizer::new(RunMode::Production)).route(
                "/orders",
                web::post().to(|| async {
                    Err::<HttpResponse, _>(ApiError::internal(eyre::eyre!("db down")))
                }),
            ),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post().uri("/orders").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let lines = logs.lines_with("unhandled request failure");
        assert_eq!(lines.len(), 1);
        let line = lines.first().expect("one failure line");
        assert!(line.contains("ERROR"), "{line}");
        assert!(line.contains("method=POST"), "{line}");
        assert!(line.contains("path=/orders"), "{line}");
        assert!(line.contains("db down"), "{line}");
    }

    #[actix_web::test]
    async fn application_errors_are_not_logged() {
        let (logs, _guard) = CapturedLogs::install();
        let (status, _) = failing(RunMode::Production, || {
            AppError::conflict("dup").non_operational().into()
        })
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(logs.lines_with("dup").is_empty(), "{}", logs.contents());
        assert!(logs.lines_with("ERROR").is_empty(), "{}", logs.contents());
        assert!(logs.lines_with("WARN").is_empty(), "{}", logs.contents());
    }
}
