//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on domain services and remain testable without I/O.

use std::time::{Duration, Instant};

use crate::domain::ReadinessService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone, Debug)]
pub struct HttpState {
    /// Dependency checks behind the readiness probe.
    pub readiness: ReadinessService,
    started_at: Instant,
}

impl HttpState {
    /// Build state, recording the process start instant.
    pub fn new(readiness: ReadinessService) -> Self {
        Self {
            readiness,
            started_at: Instant::now(),
        }
    }

    /// Time elapsed since the state was built.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
