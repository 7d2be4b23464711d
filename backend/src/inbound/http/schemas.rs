//! OpenAPI schema definitions for envelope and payload types.
//!
//! The shared contracts stay free of `utoipa`. These wrappers mirror their
//! serialized form so the generated document matches the wire format.

#![expect(
    dead_code,
    reason = "Fields are read only by utoipa during OpenAPI generation"
)]

use utoipa::ToSchema;

/// Stable machine-readable error codes.
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    /// Input failed validation.
    #[schema(rename = "VALIDATION_ERROR")]
    ValidationError,
    /// Deliberately raised application failure.
    #[schema(rename = "APP_ERROR")]
    AppError,
    /// Unexpected server failure.
    #[schema(rename = "INTERNAL_ERROR")]
    InternalError,
}

/// Error body of a failure envelope.
#[derive(ToSchema)]
#[schema(as = ErrorPayload)]
pub struct ErrorPayloadSchema {
    /// Stable machine-readable error code.
    #[schema(example = "APP_ERROR")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "Route not found")]
    message: String,
    /// Issues, stack, or other diagnostics.
    details: Option<serde_json::Value>,
}

/// Failure envelope.
#[derive(ToSchema)]
#[schema(as = ErrorEnvelope)]
pub struct ErrorEnvelopeSchema {
    /// Always `false`.
    #[schema(example = false)]
    success: bool,
    /// Failure description.
    error: ErrorPayloadSchema,
}

/// Pagination block on list responses.
#[derive(ToSchema)]
#[schema(as = Pagination, rename_all = "camelCase")]
pub struct PaginationSchema {
    /// One-based page number.
    #[schema(minimum = 1, example = 1)]
    page: u32,
    /// Items per page.
    #[schema(minimum = 1, maximum = 100, example = 20)]
    limit: u32,
    /// Items across all pages.
    #[schema(example = 42)]
    total: u64,
    /// `ceil(total / limit)`.
    #[schema(example = 3)]
    total_pages: u64,
}

/// Echo request body.
#[derive(ToSchema)]
#[schema(as = EchoRequest)]
pub struct EchoRequestSchema {
    /// Non-empty text.
    #[schema(min_length = 1, example = "hello")]
    message: String,
}

/// Echo response payload.
#[derive(ToSchema)]
pub struct EchoResponseSchema {
    /// The validated message.
    #[schema(example = "hello")]
    message: String,
}

/// Success envelope around [`EchoResponseSchema`].
#[derive(ToSchema)]
#[schema(as = EchoEnvelope)]
pub struct EchoEnvelopeSchema {
    /// Always `true`.
    #[schema(example = true)]
    success: bool,
    /// Echoed payload.
    data: EchoResponseSchema,
}

/// Liveness payload.
#[derive(ToSchema)]
pub struct LivePayloadSchema {
    /// Always `ok`.
    #[schema(example = "ok")]
    status: String,
    /// Response instant.
    #[schema(example = "2026-01-01T00:00:00.000Z")]
    timestamp: String,
    /// Seconds since startup.
    #[schema(example = 12.5)]
    uptime: f64,
}

/// Success envelope around [`LivePayloadSchema`].
#[derive(ToSchema)]
#[schema(as = LiveEnvelope)]
pub struct LiveEnvelopeSchema {
    /// Always `true`.
    success: bool,
    /// Liveness payload.
    data: LivePayloadSchema,
}

/// Readiness payload.
#[derive(ToSchema)]
pub struct ReadyPayloadSchema {
    /// `ok` when every dependency answered, otherwise `degraded`.
    #[schema(example = "ok")]
    status: String,
    /// Response instant.
    timestamp: String,
    /// Dependency name to `ok` or `error`.
    #[schema(example = json!({ "database": "ok" }))]
    checks: std::collections::BTreeMap<String, String>,
}

/// Success envelope around [`ReadyPayloadSchema`].
#[derive(ToSchema)]
#[schema(as = ReadyEnvelope)]
pub struct ReadyEnvelopeSchema {
    /// Always `true`, even when degraded.
    success: bool,
    /// Readiness payload.
    data: ReadyPayloadSchema,
}

/// Unversioned probe body.
#[derive(ToSchema)]
#[schema(as = LegacyHealth)]
pub struct LegacyHealthSchema {
    /// Always `ok`.
    #[schema(example = "ok")]
    status: String,
}
