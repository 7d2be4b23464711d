//! Shared contracts between the API backend and its clients.
//!
//! The crate is transport agnostic. It defines:
//!
//! - the response envelope every endpoint returns ([`ApiResponse`]);
//! - the pagination block carried by list responses ([`Pagination`]);
//! - a declarative input validator ([`ObjectShape`]) that normalizes untrusted
//!   JSON and reports every violation in one [`ValidationFailure`];
//! - user contracts built on top of the validator.

pub mod envelope;
pub mod pagination;
pub mod shape;
pub mod user;

pub use envelope::{ApiResponse, ErrorCode, ErrorPayload};
pub use pagination::{Pagination, pagination_shape};
pub use shape::{FieldShape, Issue, IssueCode, ObjectShape, PathSegment, Shaped, ValidationFailure};
pub use user::{CreateUser, UpdateUser, User};
