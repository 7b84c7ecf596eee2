//! Fire-and-forget audit recording.
//!
//! Audit writes ride on a spawned task so a failing insert can never roll
//! back or fail the primary operation. Failures are logged and swallowed.

use serde_json::Value;
use toolgate_core::models::NewAuditLog;
use toolgate_db::AuditLogRepository;
use uuid::Uuid;

#[derive(Clone)]
pub struct AuditRecorder {
    repository: AuditLogRepository,
}

impl AuditRecorder {
    pub fn new(repository: AuditLogRepository) -> Self {
        Self { repository }
    }

    /// Record an audit entry without blocking the caller. The write happens
    /// on a spawned task; a failure is logged at warn and otherwise ignored.
    pub fn record(
        &self,
        organization_id: Uuid,
        actor_id: Option<Uuid>,
        action: &str,
        resource_type: &str,
        resource_id: Option<Uuid>,
        metadata: Option<Value>,
    ) {
        let entry = NewAuditLog {
            organization_id,
            actor_id,
            action: action.to_string(),
            resource_type: resource_type.to_string(),
            resource_id,
            metadata,
        };
        let repository = self.repository.clone();
        tokio::spawn(async move {
            if let Err(err) = repository.insert(&entry).await {
                tracing::warn!(
                    action = %entry.action,
                    organization_id = %entry.organization_id,
                    error = %err,
                    "Failed to write audit log entry"
                );
            }
        });
    }
}
