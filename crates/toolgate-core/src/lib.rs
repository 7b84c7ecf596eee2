//! Toolgate Core Library
//!
//! This crate provides core domain models, error types, configuration,
//! authorization policy, and validation that are shared across all Toolgate
//! components.

pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, GovernanceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use policy::{CapacityLimits, CapacityReport};
