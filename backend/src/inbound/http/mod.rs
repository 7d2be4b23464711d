//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod example;
pub mod health;
pub mod schemas;
pub mod state;
pub mod validation;

use actix_web::web;

use crate::domain::{ApiResult, AppError};

pub use validation::{ValidatedJson, ValidatedPath, ValidatedQuery};

/// Register every endpoint: the versioned API under `/api/v1`, the legacy
/// probe, and the catch-all 404.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(example::echo)
            .service(health::live)
            .service(health::ready),
    )
    .service(health::legacy)
    .default_service(web::to(route_not_found));
}

/// Fallback for requests matching no route.
pub async fn route_not_found() -> ApiResult<()> {
    Err(AppError::not_found("Route not found").into())
}

#[cfg(test)]
mod tests;
