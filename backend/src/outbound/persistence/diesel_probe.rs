//! Readiness probe backed by the PostgreSQL pool.

use std::time::Duration;

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use super::pool::{DbPool, PoolError};
use crate::domain::ports::{DependencyProbe, ProbeError};

const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_millis(500);

/// Checks the database by running `SELECT 1` on a pooled connection.
///
/// Each check is bounded by its own timeout, independent of the pool's
/// checkout timeout.
#[derive(Clone, Debug)]
pub struct DieselDatabaseProbe {
    pool: DbPool,
    timeout: Duration,
}

impl DieselDatabaseProbe {
    /// Probe connections drawn from `pool`, giving up after 500ms.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }

    /// Override the per-check timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn select_one(&self) -> Result<(), ProbeError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| ProbeError::query(err.to_string()))
    }
}

fn map_pool_error(error: PoolError) -> ProbeError {
    match error {
        PoolError::Checkout { message } => ProbeError::unavailable(message),
    }
}

#[async_trait]
impl DependencyProbe for DieselDatabaseProbe {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> Result<(), ProbeError> {
        tokio::time::timeout(self.timeout, self.select_one())
            .await
            .unwrap_or_else(|_| {
                Err(ProbeError::unavailable(format!(
                    "no response within {}ms",
                    self.timeout.as_millis()
                )))
            })
    }
}
