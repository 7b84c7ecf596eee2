//! Startup configuration validation

use anyhow::Result;
use toolgate_core::Config;

/// Validate configuration before any services start.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;
    Ok(())
}
