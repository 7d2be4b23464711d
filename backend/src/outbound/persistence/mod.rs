//! PostgreSQL persistence adapters using Diesel with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Example
//!
//! ```no_run
//! use backend::outbound::persistence::{DbPool, DieselDatabaseProbe, PoolConfig};
//! use url::Url;
//!
//! let url = Url::parse("postgres://localhost/mydb").expect("url");
//! let probe = DieselDatabaseProbe::new(DbPool::new(&PoolConfig::new(&url)));
//! ```

mod diesel_probe;
mod pool;

pub use diesel_probe::DieselDatabaseProbe;
pub use pool::{DbPool, PoolConfig, PoolError};
