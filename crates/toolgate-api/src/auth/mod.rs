//! Session authentication and authorization helpers.

pub mod authz;
pub mod middleware;
pub mod models;
pub mod token;

pub use models::SessionContext;
