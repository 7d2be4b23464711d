//! HTTP rendering of request failures.
//!
//! Purpose: turn any [`ApiError`] into exactly one failure envelope. The
//! mapping is total: expected failures keep their status and message,
//! validation failures become 400 with every issue, and anything else becomes
//! an opaque 500. Diagnostics are attached only outside production.

use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use contracts::{ApiResponse, ErrorCode, ErrorPayload};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::RunMode;
use crate::domain::{ApiError, TRACE_ID_HEADER, TraceId};

const VALIDATION_MESSAGE: &str = "Validation error";
const INTERNAL_MESSAGE: &str = "Internal server error";

fn details<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

fn to_value(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

/// Map a failure to its status and failure envelope.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use backend::config::RunMode;
/// use backend::domain::{ApiError, AppError};
/// use backend::inbound::http::error::normalize;
///
/// let error = ApiError::from(AppError::not_found("User not found"));
/// let (status, body) = normalize(&error, RunMode::Production);
/// assert_eq!(status, StatusCode::NOT_FOUND);
/// assert_eq!(body.error().map(|e| e.message.as_str()), Some("User not found"));
/// ```
pub fn normalize(error: &ApiError, mode: RunMode) -> (StatusCode, ApiResponse<()>) {
    let (status, payload) = match error {
        ApiError::App(app) => {
            let status =
                StatusCode::from_u16(app.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut payload = ErrorPayload::new(ErrorCode::AppError, app.message());
            if mode.exposes_details() {
                payload = payload.with_details(details([("stack", Value::String(app.stack()))]));
            }
            (status, payload)
        }
        ApiError::Validation(failure) => (
            StatusCode::BAD_REQUEST,
            ErrorPayload::new(ErrorCode::ValidationError, VALIDATION_MESSAGE)
                .with_details(details([("issues", to_value(&failure.issues))])),
        ),
        ApiError::Internal(report) => {
            let mut payload = ErrorPayload::new(ErrorCode::InternalError, INTERNAL_MESSAGE);
            if mode.exposes_details() {
                let chain: Vec<String> = report.chain().map(ToString::to_string).collect();
                payload = payload.with_details(details([
                    ("message", Value::String(report.to_string())),
                    ("stack", to_value(chain)),
                ]));
            }
            (StatusCode::INTERNAL_SERVER_ERROR, payload)
        }
    };
    (status, ApiResponse::failure(payload))
}

/// Build the HTTP response for `error` under `mode`.
pub fn render(error: &ApiError, mode: RunMode) -> HttpResponse {
    let (status, body) = normalize(error, mode);
    failure_response(status, &body)
}

/// Serialize a failure envelope, echoing the request's trace identifier.
pub(crate) fn failure_response(status: StatusCode, body: &ApiResponse<()>) -> HttpResponse {
    let mut builder = HttpResponse::build(status);
    if let Some(id) = TraceId::current()
        && let Ok(value) = HeaderValue::from_str(&id.to_string())
    {
        builder.insert_header((TRACE_ID_HEADER, value));
    }
    if status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::INTERNAL_SERVER_ERROR {
        builder.insert_header((header::CACHE_CONTROL, "no-store"));
    }
    builder.json(body)
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        normalize(self, RunMode::Production).0
    }

    fn error_response(&self) -> HttpResponse {
        render(self, RunMode::Production)
    }
}
