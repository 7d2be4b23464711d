//! Request middleware.
//!
//! Purpose: cross-cutting request lifecycle concerns: trace correlation,
//! failure rendering, and per-client throttling.

pub mod normalize;
pub mod rate_limit;
pub mod trace;

pub use normalize::ErrorNormalizer;
pub use rate_limit::RateLimit;
pub use trace::Trace;
