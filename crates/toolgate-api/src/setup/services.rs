//! Repository and service wiring

use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;
use toolgate_core::Config;

use crate::audit::AuditRecorder;
use crate::state::{AppState, DbState};

/// Build the application state from the connection pool.
pub fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let db = DbState::new(pool);
    let audit = AuditRecorder::new(db.audit_log_repository.clone());
    let is_production = config.is_production();

    Ok(Arc::new(AppState {
        db,
        audit,
        config: config.clone(),
        is_production,
    }))
}
