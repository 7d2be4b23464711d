//! HTTP server configuration object and helpers.

use std::net::{Ipv4Addr, SocketAddr};

use backend::config::{AppConfig, RunMode};
use backend::outbound::persistence::DbPool;

/// Everything the server needs beyond the application code itself.
pub struct ServerConfig {
    pub(crate) mode: RunMode,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) cors_origins: Vec<String>,
    pub(crate) db_pool: DbPool,
}

impl ServerConfig {
    /// Derive server settings from validated configuration and a pool.
    #[must_use]
    pub fn new(config: &AppConfig, db_pool: DbPool) -> Self {
        Self {
            mode: config.mode,
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port)),
            cors_origins: config.cors_origins.clone(),
            db_pool,
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
