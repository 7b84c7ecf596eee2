//! Data models for the application
//!
//! This module contains all data structures used throughout the application,
//! organized by domain. Each sub-module represents a specific entity.

mod access_request;
mod audit_log;
mod invitation;
mod membership;
mod organization;
mod profile;
mod subscription;
mod tool;

// Re-export all models for convenient imports
pub use access_request::*;
pub use audit_log::*;
pub use invitation::*;
pub use membership::*;
pub use organization::*;
pub use profile::*;
pub use subscription::*;
pub use tool::*;
