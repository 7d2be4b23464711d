//! Uniform JSON envelope returned by every endpoint.
//!
//! The envelope is discriminated by the `success` flag:
//!
//! ```json
//! { "success": true, "data": { "message": "hello" } }
//! { "success": false, "error": { "code": "VALIDATION_ERROR", "message": "Validation error" } }
//! ```

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::pagination::Pagination;

/// Stable machine-readable discriminator carried by failure envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input did not match the declared shape.
    ValidationError,
    /// A deliberately raised, expected failure.
    AppError,
    /// Anything unanticipated.
    InternalError,
}

impl ErrorCode {
    /// Wire representation of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::AppError => "APP_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error body of a failure envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Stable discriminator.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Optional diagnostic context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl ErrorPayload {
    /// Build a payload without details.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach diagnostic details.
    #[must_use]
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }
}

/// Response envelope, generic over the success payload.
///
/// # Examples
/// ```
/// use contracts::ApiResponse;
/// use serde_json::json;
///
/// let envelope = ApiResponse::success(json!({ "message": "hello" }));
/// let value = serde_json::to_value(&envelope).expect("serialises");
/// assert_eq!(value, json!({ "success": true, "data": { "message": "hello" } }));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    /// `success: true` with a payload and optional pagination.
    Success {
        /// Payload returned by the handler.
        data: T,
        /// Present on paginated list responses.
        pagination: Option<Pagination>,
    },
    /// `success: false` with an error payload.
    Failure {
        /// Error description.
        error: ErrorPayload,
    },
}

impl<T> ApiResponse<T> {
    /// Success envelope without pagination.
    pub const fn success(data: T) -> Self {
        Self::Success {
            data,
            pagination: None,
        }
    }

    /// Success envelope carrying a pagination block.
    pub const fn paginated(data: T, pagination: Pagination) -> Self {
        Self::Success {
            data,
            pagination: Some(pagination),
        }
    }

    /// Failure envelope.
    pub const fn failure(error: ErrorPayload) -> Self {
        Self::Failure { error }
    }

    /// Error payload when this is a failure envelope.
    pub const fn error(&self) -> Option<&ErrorPayload> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success { data, pagination } => {
                let len = if pagination.is_some() { 3 } else { 2 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", data)?;
                if let Some(block) = pagination {
                    map.serialize_entry("pagination", block)?;
                }
                map.end()
            }
            Self::Failure { error } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

#[derive(Deserialize)]
struct RawEnvelope<T> {
    success: bool,
    data: Option<T>,
    pagination: Option<Pagination>,
    error: Option<ErrorPayload>,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ApiResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEnvelope::<T>::deserialize(deserializer)?;
        match (raw.success, raw.data, raw.error) {
            (true, Some(data), None) => Ok(Self::Success {
                data,
                pagination: raw.pagination,
            }),
            (false, None, Some(error)) => Ok(Self::Failure { error }),
            (true, _, _) => Err(serde::de::Error::custom(
                "success envelope requires `data` and forbids `error`",
            )),
            (false, _, _) => Err(serde::de::Error::custom(
                "failure envelope requires `error` and forbids `data`",
            )),
        }
    }
}
