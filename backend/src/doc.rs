//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint and the envelope schemas from
//! [`crate::inbound::http::schemas`]. The document is served by Swagger UI at
//! `/api/docs` and exported by the `openapi-dump` binary.

use crate::inbound::http::schemas::{
    EchoEnvelopeSchema, EchoRequestSchema, EchoResponseSchema, ErrorCodeSchema,
    ErrorEnvelopeSchema, ErrorPayloadSchema, LegacyHealthSchema, LiveEnvelopeSchema,
    LivePayloadSchema, PaginationSchema, ReadyEnvelopeSchema, ReadyPayloadSchema,
};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "API",
        description = "Starter HTTP API: validated example endpoint and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::example::echo,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::legacy,
    ),
    components(schemas(
        ErrorCodeSchema,
        ErrorPayloadSchema,
        ErrorEnvelopeSchema,
        PaginationSchema,
        EchoRequestSchema,
        EchoResponseSchema,
        EchoEnvelopeSchema,
        LivePayloadSchema,
        LiveEnvelopeSchema,
        ReadyPayloadSchema,
        ReadyEnvelopeSchema,
        LegacyHealthSchema,
    )),
    tags(
        (name = "example", description = "Example endpoints"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
