//! Port for checking that a downstream dependency can serve requests.
//!
//! The readiness probe asks each registered dependency in turn. Adapters
//! decide what "reachable" means: the database adapter runs a trivial query.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised when a dependency check fails.
    pub enum ProbeError {
        /// No connection could be obtained.
        Unavailable { message: String } => "dependency unavailable: {message}",
        /// A connection was obtained but the check itself failed.
        Query { message: String } => "dependency check failed: {message}",
    }
}

/// Port for a single dependency health check.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    /// Key used for this dependency in the readiness report.
    fn name(&self) -> &'static str;

    /// Succeed when the dependency is reachable.
    async fn check(&self) -> Result<(), ProbeError>;
}

impl std::fmt::Debug for dyn DependencyProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyProbe")
            .field("name", &self.name())
            .finish()
    }
}

/// Probe that always succeeds, for tests that do not exercise readiness.
#[derive(Debug, Clone, Copy)]
pub struct FixtureDependencyProbe {
    name: &'static str,
}

impl FixtureDependencyProbe {
    /// Build a probe reporting under `name`.
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for FixtureDependencyProbe {
    fn default() -> Self {
        Self::new("database")
    }
}

#[async_trait]
impl DependencyProbe for FixtureDependencyProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn check(&self) -> Result<(), ProbeError> {
        Ok(())
    }
}
