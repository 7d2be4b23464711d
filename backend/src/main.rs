//! Backend entry-point: loads configuration, wires REST endpoints and OpenAPI
//! docs, and serves until shutdown.

mod server;

use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::config::{AppConfig, LogLevel};
use backend::outbound::persistence::{DbPool, PoolConfig};
use server::{ServerConfig, create_server};

fn init_tracing(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = AppConfig::load().wrap_err("invalid configuration")?;
    init_tracing(config.log_level);

    let pool = DbPool::new(&PoolConfig::new(&config.database_url));
    let server_config = ServerConfig::new(&config, pool);
    let bind_addr = server_config.bind_addr();
    let server = create_server(server_config).wrap_err("failed to start HTTP server")?;

    info!(mode = %config.mode, %bind_addr, "server listening");
    server.await.wrap_err("HTTP server terminated")
}
