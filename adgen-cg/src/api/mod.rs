//! HTTP API handlers for adgen-cg

pub mod auth;
pub mod concepts;
pub mod health;
pub mod validation;

pub use auth::{auth_middleware, AuthenticatedUser};
pub use concepts::{generate_concept, remix_concept};
pub use health::{health_routes, BuildInfo};
