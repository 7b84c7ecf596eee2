//! Application state and sub-state extractors.
//!
//! AppState is split so handlers can extract only the database sub-state they
//! need via Axum's `FromRef`.

use sqlx::PgPool;
use std::sync::Arc;
use toolgate_core::Config;
use toolgate_db::{
    AccessRequestRepository, AuditLogRepository, InvitationRepository, MembershipRepository,
    OrganizationRepository, SessionRepository, SubscriptionRepository, ToolRepository,
};

use crate::audit::AuditRecorder;

/// Database pool and all repositories.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub organization_repository: OrganizationRepository,
    pub membership_repository: MembershipRepository,
    pub session_repository: SessionRepository,
    pub subscription_repository: SubscriptionRepository,
    pub tool_repository: ToolRepository,
    pub access_request_repository: AccessRequestRepository,
    pub invitation_repository: InvitationRepository,
    pub audit_log_repository: AuditLogRepository,
}

impl DbState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            organization_repository: OrganizationRepository::new(pool.clone()),
            membership_repository: MembershipRepository::new(pool.clone()),
            session_repository: SessionRepository::new(pool.clone()),
            subscription_repository: SubscriptionRepository::new(pool.clone()),
            tool_repository: ToolRepository::new(pool.clone()),
            access_request_repository: AccessRequestRepository::new(pool.clone()),
            invitation_repository: InvitationRepository::new(pool.clone()),
            audit_log_repository: AuditLogRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub audit: AuditRecorder,
    pub config: Config,
    pub is_production: bool,
}

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
