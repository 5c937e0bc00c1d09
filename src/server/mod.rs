//! HTTP surface for composed CRUD stacks
//!
//! This module provides a `ServerBuilder` that mounts, per exposed entity:
//! - The generic CRUD route table under `/<EntityKind>`
//! - Principal resolution from request headers
//! - Error mapping onto HTTP status codes

pub mod builder;
pub mod controller;
pub mod error;
pub mod principal;
pub mod query;
pub mod router;

pub use builder::ServerBuilder;
pub use controller::CrudState;
pub use error::ApiError;
pub use principal::{PrincipalResolver, StaticPrincipalResolver};
pub use query::{ExistsQuery, ListQuery};
pub use router::crud_routes;
