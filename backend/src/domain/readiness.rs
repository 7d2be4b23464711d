//! Readiness checks across downstream dependencies.
//!
//! Each registered [`DependencyProbe`] is checked in registration order under
//! the service's retry policy. A dependency whose retries are exhausted is
//! reported as `error` and the overall status becomes `degraded`. Probing
//! never fails the caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::ports::DependencyProbe;
use super::retry::RetryExecutor;

/// Outcome for one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// The dependency answered.
    Ok,
    /// Every attempt failed.
    Error,
}

/// Aggregate readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessStatus {
    /// All dependencies answered.
    Ok,
    /// At least one dependency failed.
    Degraded,
}

/// Result of a readiness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    /// Aggregate status.
    pub status: ReadinessStatus,
    /// Per-dependency outcomes keyed by probe name.
    pub checks: BTreeMap<String, CheckStatus>,
}

impl ReadinessReport {
    /// Whether every dependency answered.
    pub fn is_ready(&self) -> bool {
        self.status == ReadinessStatus::Ok
    }
}

/// Checks registered dependencies behind the readiness endpoint.
#[derive(Clone, Debug)]
pub struct ReadinessService {
    probes: Vec<Arc<dyn DependencyProbe>>,
    retry: RetryExecutor,
}

impl ReadinessService {
    /// Build a service over `probes`, retrying each under `retry`.
    pub fn new(probes: Vec<Arc<dyn DependencyProbe>>, retry: RetryExecutor) -> Self {
        Self { probes, retry }
    }

    /// Probe every dependency and summarise the outcome.
    pub async fn check(&self) -> ReadinessReport {
        let mut checks = BTreeMap::new();
        for probe in &self.probes {
            let probe: &dyn DependencyProbe = probe.as_ref();
            let status = match self.retry.run(move || probe.check()).await {
                Ok(()) => CheckStatus::Ok,
                Err(error) => {
                    warn!(dependency = probe.name(), error = %error, "dependency is not ready");
                    CheckStatus::Error
                }
            };
            checks.insert(probe.name().to_owned(), status);
        }

        let status = if checks.values().all(|check| *check == CheckStatus::Ok) {
            ReadinessStatus::Ok
        } else {
            ReadinessStatus::Degraded
        };
        ReadinessReport { status, checks }
    }
}
