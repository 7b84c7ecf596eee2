//! HTTP request handlers, one module per resource.

pub mod access_requests;
pub mod audit_logs;
pub mod health;
pub mod invitations;
pub mod organizations;
pub mod tools;
