//! Domain layer: request failures, retry policy, and readiness checks.
//!
//! Purpose: keep the rules that decide *what* happens on failure free of
//! HTTP types. Inbound adapters translate [`ApiError`] into envelopes and
//! outbound adapters implement the [`ports`] used by [`ReadinessService`].
//!
//! Public surface:
//! - [`AppError`]: deliberately raised failure with an HTTP status.
//! - [`ApiError`]: every failure a handler can return.
//! - [`RetryExecutor`]: bounded retries with exponential backoff.
//! - [`ReadinessService`]: dependency checks behind the readiness probe.

pub mod error;
pub mod ports;
pub mod readiness;
pub mod retry;
mod trace_id;

pub use self::error::{ApiError, ApiResult, AppError, AppErrorValidationError};
pub use self::readiness::{CheckStatus, ReadinessReport, ReadinessService, ReadinessStatus};
pub use self::retry::{RetryError, RetryExecutor, RetryOptions, TokioSleeper};
pub use self::trace_id::TraceId;

/// HTTP header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";
