//! Handler behaviour through the full middleware stack.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use async_trait::async_trait;
use rstest::rstest;
use serde_json::{Value, json};

use super::configure;
use super::state::HttpState;
use crate::config::RunMode;
use crate::domain::ports::{DependencyProbe, ProbeError, Sleeper};
use crate::domain::{ReadinessService, RetryExecutor, RetryOptions};
use crate::{ErrorNormalizer, Trace};

struct ImmediateSleeper;

#[async_trait]
impl Sleeper for ImmediateSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// Database probe failing its first `failures` checks.
struct FlakyDatabase {
    failures: u32,
    calls: AtomicU32,
}

impl FlakyDatabase {
    fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl DependencyProbe for FlakyDatabase {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> Result<(), ProbeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            Err(ProbeError::unavailable("connection refused"))
        } else {
            Ok(())
        }
    }
}

fn test_app(
    database: Arc<FlakyDatabase>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let retry = RetryExecutor::with_sleeper(RetryOptions::default(), Arc::new(ImmediateSleeper));
    let readiness = ReadinessService::new(vec![database as Arc<dyn DependencyProbe>], retry);
    App::new()
        .app_data(web::Data::new(HttpState::new(readiness)))
        .configure(configure)
        .wrap(ErrorNormalizer::new(RunMode::Test))
        .wrap(Trace::for_mode(RunMode::Test))
}

async fn send(
    database: Arc<FlakyDatabase>,
    req: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(database)).await;
    let res = actix_test::call_service(&app, req.to_request()).await;
    let status = res.status();
    (status, actix_test::read_body_json(res).await)
}

fn healthy() -> Arc<FlakyDatabase> {
    Arc::new(FlakyDatabase::new(0))
}

#[actix_web::test]
async fn echo_returns_the_message() {
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/example/echo")
        .set_json(json!({ "message": "hello" }));
    let (status, body) = send(healthy(), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "data": { "message": "hello" } }));
}

#[actix_web::test]
async fn echo_rejects_an_empty_message() {
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/example/echo")
        .set_json(json!({ "message": "" }));
    let (status, body) = send(healthy(), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert_eq!(body["error"]["message"], json!("Validation error"));
    assert_eq!(body["error"]["details"]["issues"][0]["path"], json!(["message"]));
    assert_eq!(body["error"]["details"]["issues"][0]["code"], json!("too_small"));
}

#[rstest]
#[case(r#"{"message":"#, "invalid_json")]
#[case("", "required")]
#[actix_web::test]
async fn echo_reports_unusable_bodies(#[case] raw: &'static str, #[case] code: &str) {
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/example/echo")
        .insert_header(("content-type", "application/json"))
        .set_payload(raw);
    let (status, body) = send(healthy(), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["issues"][0]["code"], json!(code));
}

#[actix_web::test]
async fn echo_is_repeatable() {
    let app = actix_test::init_service(test_app(healthy())).await;
    let mut bodies = Vec::new();
    for _ in 0..2 {
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/example/echo")
            .set_json(json!({ "message": "same" }))
            .to_request();
        bodies.push(actix_test::call_and_read_body(&app, req).await);
    }
    assert_eq!(bodies.first(), bodies.get(1));
}

#[actix_web::test]
async fn readiness_degrades_when_every_attempt_fails() {
    let database = Arc::new(FlakyDatabase::new(u32::MAX));
    let req = actix_test::TestRequest::get().uri("/api/v1/health/ready");
    let (status, body) = send(Arc::clone(&database), req).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("degraded"));
    assert_eq!(body["data"]["checks"], json!({ "database": "error" }));
    assert_eq!(database.calls.load(Ordering::SeqCst), 5);
}

#[actix_web::test]
async fn readiness_recovers_within_the_retry_budget() {
    let database = Arc::new(FlakyDatabase::new(2));
    let req = actix_test::TestRequest::get().uri("/api/v1/health/ready");
    let (status, body) = send(Arc::clone(&database), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("ok"));
    assert_eq!(body["data"]["checks"], json!({ "database": "ok" }));
    assert!(body["data"]["timestamp"].is_string());
    assert_eq!(database.calls.load(Ordering::SeqCst), 3);
}

#[actix_web::test]
async fn liveness_reports_status_and_uptime() {
    let req = actix_test::TestRequest::get().uri("/api/v1/health");
    let (status, body) = send(healthy(), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("ok"));
    assert!(body["data"]["uptime"].is_number());
    assert!(body["data"]["timestamp"].is_string());
}

#[actix_web::test]
async fn legacy_probe_is_unwrapped() {
    let req = actix_test::TestRequest::get().uri("/api/health");
    let (status, body) = send(healthy(), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_web::test]
async fn unknown_routes_are_app_errors() {
    let req = actix_test::TestRequest::get().uri("/api/v1/nope");
    let (status, body) = send(healthy(), req).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("APP_ERROR"));
    assert_eq!(body["error"]["message"], json!("Route not found"));
}
