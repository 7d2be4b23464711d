//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters are thin translators between domain ports and infrastructure
//! clients. They contain no business logic.

pub mod persistence;
