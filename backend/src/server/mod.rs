//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{Method, header};
use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpServer, web};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use backend::config::RunMode;
use backend::doc::ApiDoc;
use backend::domain::ports::DependencyProbe;
use backend::domain::{ReadinessService, RetryExecutor, RetryOptions};
use backend::inbound::http::configure;
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::DieselDatabaseProbe;
use backend::{ErrorNormalizer, RateLimit, Trace};

#[derive(Clone)]
struct AppDependencies {
    mode: RunMode,
    http_state: web::Data<HttpState>,
    cors_origins: Vec<String>,
    rate_limit: RateLimit,
}

fn cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::HeaderName::from_static("trace-id")])
        .supports_credentials()
}

fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .add((header::REFERRER_POLICY, "no-referrer"))
        .add((header::STRICT_TRANSPORT_SECURITY, "max-age=15552000; includeSubDomains"))
        .add(("cross-origin-opener-policy", "same-origin"))
        .add(("cross-origin-resource-policy", "same-origin"))
        .add(("x-dns-prefetch-control", "off"))
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        mode,
        http_state,
        cors_origins,
        rate_limit,
    } = deps;

    App::new()
        .app_data(http_state)
        .service(SwaggerUi::new("/api/docs/{_:.*}").url("/api/openapi.json", ApiDoc::openapi()))
        .configure(configure)
        .wrap(rate_limit)
        .wrap(cors(&cors_origins))
        .wrap(security_headers())
        .wrap(ErrorNormalizer::new(mode))
        .wrap(Trace::for_mode(mode))
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let ServerConfig {
        mode,
        bind_addr,
        cors_origins,
        db_pool,
    } = config;

    let probes: Vec<Arc<dyn DependencyProbe>> = vec![Arc::new(DieselDatabaseProbe::new(db_pool))];
    let readiness = ReadinessService::new(probes, RetryExecutor::new(RetryOptions::default()));
    let deps = AppDependencies {
        mode,
        http_state: web::Data::new(HttpState::new(readiness)),
        cors_origins,
        rate_limit: RateLimit::for_mode(mode),
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();
    Ok(server)
}
