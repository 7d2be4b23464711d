//! Example endpoint demonstrating request validation.

use actix_web::{post, web};
use contracts::{ApiResponse, FieldShape, ObjectShape, Shaped};
use serde::{Deserialize, Serialize};

use super::validation::ValidatedJson;

/// Echo request body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EchoRequest {
    /// Text to send back. Must be non-empty.
    pub message: String,
}

impl Shaped for EchoRequest {
    fn shape() -> ObjectShape {
        ObjectShape::new().field("message", FieldShape::string().min_len(1))
    }
}

/// Echo response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EchoResponse {
    /// The validated message.
    pub message: String,
}

/// Return the validated message unchanged.
#[utoipa::path(
    post,
    path = "/api/v1/example/echo",
    tags = ["example"],
    request_body = crate::inbound::http::schemas::EchoRequestSchema,
    responses(
        (status = 200, description = "Message echoed", body = crate::inbound::http::schemas::EchoEnvelopeSchema),
        (status = 400, description = "Body failed validation", body = crate::inbound::http::schemas::ErrorEnvelopeSchema)
    )
)]
#[post("/example/echo")]
pub async fn echo(
    ValidatedJson(body): ValidatedJson<EchoRequest>,
) -> web::Json<ApiResponse<EchoResponse>> {
    web::Json(ApiResponse::success(EchoResponse {
        message: body.message,
    }))
}
