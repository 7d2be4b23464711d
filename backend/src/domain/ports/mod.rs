//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod dependency_probe;
mod sleeper;

#[cfg(test)]
pub use dependency_probe::MockDependencyProbe;
pub use dependency_probe::{DependencyProbe, FixtureDependencyProbe, ProbeError};
pub use sleeper::Sleeper;
