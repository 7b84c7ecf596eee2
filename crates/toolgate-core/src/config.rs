//! Configuration module
//!
//! Env-driven configuration for the API service: server, database,
//! CORS, and governance settings (invitation expiry). Loaded once at
//! startup and validated before anything else is initialized.

use std::env;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const INVITATION_EXPIRES_DAYS: i64 = 7;
const SESSION_DEFAULT_AUDIT_PAGE: i64 = 50;

/// Base configuration shared across the service
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Access-governance service configuration
#[derive(Clone, Debug)]
pub struct GovernanceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    /// Days until a newly created invitation expires.
    pub invitation_expires_days: i64,
    /// Default page size for audit-log listings.
    pub audit_default_page_size: i64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<GovernanceConfig>);

impl Config {
    fn inner(&self) -> &GovernanceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = GovernanceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn invitation_expires_days(&self) -> i64 {
        self.inner().invitation_expires_days
    }

    pub fn audit_default_page_size(&self) -> i64 {
        self.inner().audit_default_page_size
    }
}

impl GovernanceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        Ok(GovernanceConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            invitation_expires_days: env::var("INVITATION_EXPIRES_DAYS")
                .unwrap_or_else(|_| INVITATION_EXPIRES_DAYS.to_string())
                .parse()
                .unwrap_or(INVITATION_EXPIRES_DAYS),
            audit_default_page_size: env::var("AUDIT_DEFAULT_PAGE_SIZE")
                .unwrap_or_else(|_| SESSION_DEFAULT_AUDIT_PAGE.to_string())
                .parse()
                .unwrap_or(SESSION_DEFAULT_AUDIT_PAGE),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.database_url.trim().is_empty() {
            return Err(anyhow::anyhow!("DATABASE_URL must not be empty"));
        }
        if self.invitation_expires_days < 1 {
            return Err(anyhow::anyhow!(
                "INVITATION_EXPIRES_DAYS must be at least 1"
            ));
        }
        if self.base.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(invitation_days: i64, max_conns: u32) -> GovernanceConfig {
        GovernanceConfig {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["*".to_string()],
                db_max_connections: max_conns,
                db_timeout_seconds: 30,
                environment: "development".to_string(),
            },
            database_url: "postgres://localhost/toolgate".to_string(),
            invitation_expires_days: invitation_days,
            audit_default_page_size: 50,
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(config_with(7, 20).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_expiry() {
        assert!(config_with(0, 20).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_connections() {
        assert!(config_with(7, 0).validate().is_err());
    }

    #[test]
    fn test_is_production() {
        let mut cfg = config_with(7, 20);
        cfg.base.environment = "Production".to_string();
        let config = Config(Box::new(cfg));
        assert!(config.is_production());
    }
}
