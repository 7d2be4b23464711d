//! Health endpoints: liveness and readiness probes for orchestration and load
//! balancers.

use actix_web::{HttpResponse, get, http::header, web};
use chrono::{SecondsFormat, Utc};
use contracts::ApiResponse;
use serde::Serialize;
use std::collections::BTreeMap;

use super::state::HttpState;
use crate::domain::{CheckStatus, ReadinessStatus};

/// Liveness payload.
#[derive(Debug, Clone, Serialize)]
pub struct LivePayload {
    /// Always `"ok"` while the process serves requests.
    pub status: &'static str,
    /// Response instant, RFC 3339.
    pub timestamp: String,
    /// Seconds since startup.
    pub uptime: f64,
}

/// Readiness payload.
#[derive(Debug, Clone, Serialize)]
pub struct ReadyPayload {
    /// `"ok"` or `"degraded"`.
    pub status: ReadinessStatus,
    /// Response instant, RFC 3339.
    pub timestamp: String,
    /// Per-dependency outcome.
    pub checks: BTreeMap<String, CheckStatus>,
}

/// Legacy probe body.
#[derive(Debug, Clone, Serialize)]
pub struct LegacyHealth {
    /// Always `"ok"`.
    pub status: &'static str,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Liveness probe. Answers 200 while the process runs.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive", body = crate::inbound::http::schemas::LiveEnvelopeSchema)
    )
)]
#[get("/health")]
pub async fn live(state: web::Data<HttpState>) -> HttpResponse {
    let payload = LivePayload {
        status: "ok",
        timestamp: now(),
        uptime: state.uptime().as_secs_f64(),
    };
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(ApiResponse::success(payload))
}

/// Readiness probe. Checks every dependency under the retry policy and
/// answers 200 when all respond, 503 otherwise. The envelope reports
/// `success: true` either way; the status field carries the verdict.
#[utoipa::path(
    get,
    path = "/api/v1/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "All dependencies reachable", body = crate::inbound::http::schemas::ReadyEnvelopeSchema),
        (status = 503, description = "At least one dependency unreachable", body = crate::inbound::http::schemas::ReadyEnvelopeSchema)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HttpState>) -> HttpResponse {
    let report = state.readiness.check().await;
    let mut response = if report.is_ready() {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(ApiResponse::success(ReadyPayload {
            status: report.status,
            timestamp: now(),
            checks: report.checks,
        }))
}

/// Unversioned probe kept for existing monitors. Returns a bare object.
#[utoipa::path(
    get,
    path = "/api/health",
    tags = ["health"],
    responses((status = 200, description = "Server is alive", body = crate::inbound::http::schemas::LegacyHealthSchema))
)]
#[get("/api/health")]
pub async fn legacy() -> HttpResponse {
    HttpResponse::Ok().json(LegacyHealth { status: "ok" })
}
