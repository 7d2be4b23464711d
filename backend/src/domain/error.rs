//! Failures raised while handling a request.
//!
//! Handlers never build error responses themselves. They return an
//! [`ApiError`] and the HTTP error normalizer turns it into exactly one
//! failure envelope.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::Location;

use color_eyre::eyre;
use contracts::ValidationFailure;

/// Validation errors emitted by the [`AppError`] constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppErrorValidationError {
    /// The message is empty once trimmed.
    #[error("error message must not be empty")]
    EmptyMessage,
    /// The status is not a client or server error status.
    #[error("status {0} is not an HTTP error status")]
    InvalidStatus(u16),
}

/// Deliberately raised, expected failure carrying its own HTTP status.
///
/// ## Invariants
/// - `status` lies in `400..=599`.
/// - `message` is non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use backend::domain::AppError;
///
/// let err = AppError::not_found("user not found");
/// assert_eq!(err.status(), 404);
/// assert!(err.is_operational());
/// ```
#[derive(Debug)]
pub struct AppError {
    status: u16,
    message: String,
    is_operational: bool,
    origin: &'static Location<'static>,
    backtrace: Backtrace,
}

impl AppError {
    /// Fallible constructor validating status and message.
    ///
    /// # Errors
    /// Returns [`AppErrorValidationError`] when the status is outside
    /// `400..=599` or the message is blank.
    #[track_caller]
    pub fn new(
        status: u16,
        message: impl Into<String>,
    ) -> Result<Self, AppErrorValidationError> {
        let message = message.into();
        if !(400..=599).contains(&status) {
            return Err(AppErrorValidationError::InvalidStatus(status));
        }
        if message.trim().is_empty() {
            return Err(AppErrorValidationError::EmptyMessage);
        }
        Ok(Self::unchecked(status, message))
    }

    #[track_caller]
    fn unchecked(status: u16, message: String) -> Self {
        Self {
            status,
            message,
            is_operational: true,
            origin: Location::caller(),
            backtrace: Backtrace::capture(),
        }
    }

    /// 400 Bad Request.
    #[track_caller]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::unchecked(400, message.into())
    }

    /// 404 Not Found.
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::unchecked(404, message.into())
    }

    /// 409 Conflict.
    #[track_caller]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::unchecked(409, message.into())
    }

    /// 429 Too Many Requests.
    #[track_caller]
    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::unchecked(429, message.into())
    }

    /// 503 Service Unavailable.
    #[track_caller]
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::unchecked(503, message.into())
    }

    /// Flag the failure as a programming defect rather than an expected
    /// condition. The response is unchanged; only the flag differs.
    #[must_use]
    pub fn non_operational(mut self) -> Self {
        self.is_operational = false;
        self
    }

    /// HTTP status to respond with.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Human-readable message returned to clients.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Whether the failure was anticipated by design.
    pub fn is_operational(&self) -> bool {
        self.is_operational
    }

    /// Where the error was raised: the captured backtrace when backtraces are
    /// enabled, otherwise the construction site.
    pub fn stack(&self) -> String {
        match self.backtrace.status() {
            BacktraceStatus::Captured => self.backtrace.to_string(),
            _ => format!("at {}", self.origin),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

/// Every failure a handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// Expected failure with its own status.
    App(AppError),
    /// Input did not match the declared shape.
    Validation(ValidationFailure),
    /// Anything else.
    Internal(eyre::Report),
}

impl ApiError {
    /// Wrap an unanticipated failure.
    pub fn internal(error: impl Into<eyre::Report>) -> Self {
        Self::Internal(error.into())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::App(error) => write!(f, "{error}"),
            Self::Validation(failure) => write!(f, "{failure}"),
            Self::Internal(report) => write!(f, "{report}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::App(error) => Some(error),
            Self::Validation(failure) => Some(failure),
            Self::Internal(report) => Some(report.as_ref()),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(value: ValidationFailure) -> Self {
        Self::Validation(value)
    }
}

impl From<eyre::Report> for ApiError {
    fn from(value: eyre::Report) -> Self {
        Self::Internal(value)
    }
}

/// Convenient result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    //! Constructor invariants and classification.

    use super::*;
    use contracts::IssueCode;
    use rstest::rstest;

    #[rstest]
    #[case(200)]
    #[case(302)]
    #[case(600)]
    fn new_rejects_non_error_statuses(#[case] status: u16) {
        let result = AppError::new(status, "nope");
        assert_eq!(
            result.err(),
            Some(AppErrorValidationError::InvalidStatus(status))
        );
    }

    #[rstest]
    fn new_rejects_blank_messages() {
        let result = AppError::new(404, "   ");
        assert_eq!(result.err(), Some(AppErrorValidationError::EmptyMessage));
    }

    #[rstest]
    fn named_constructors_set_status() {
        assert_eq!(AppError::bad_request("x").status(), 400);
        assert_eq!(AppError::not_found("x").status(), 404);
        assert_eq!(AppError::conflict("x").status(), 409);
        assert_eq!(AppError::too_many_requests("x").status(), 429);
        assert_eq!(AppError::service_unavailable("x").status(), 503);
    }

    #[rstest]
    fn non_operational_flips_only_the_flag() {
        let error = AppError::conflict("dup").non_operational();
        assert!(!error.is_operational());
        assert_eq!(error.status(), 409);
        assert_eq!(error.message(), "dup");
    }

    #[rstest]
    fn stack_names_the_construction_site() {
        let error = AppError::not_found("missing");
        assert!(error.stack().contains("error.rs"));
    }

    #[rstest]
    fn conversions_pick_the_matching_variant() {
        let app: ApiError = AppError::not_found("x").into();
        assert!(matches!(app, ApiError::App(_)));

        let validation: ApiError = ValidationFailure::single(IssueCode::Required, "Required").into();
        assert!(matches!(validation, ApiError::Validation(_)));

        let internal = ApiError::internal(eyre::eyre!("boom"));
        assert!(matches!(internal, ApiError::Internal(_)));
        assert_eq!(internal.to_string(), "boom");
    }
}
