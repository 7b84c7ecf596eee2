use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ProfileSummary;

/// Append-only record of a state-changing action, kept for compliance review.
/// Never updated or deleted by this service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditLog {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// None for system-initiated actions.
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Audit entry before persistence. The id and timestamp are assigned by the
/// database on insert.
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub organization_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
}

/// Audit entry joined with the actor's profile for the admin listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditLogDetails {
    #[serde(flatten)]
    pub entry: AuditLog,
    pub actor: Option<ProfileSummary>,
}

/// Audit actions emitted by the lifecycle components. Free-form tags in
/// storage; constants here so call sites and tests agree on spelling.
pub mod actions {
    pub const ORGANIZATION_CREATED: &str = "ORGANIZATION_CREATED";
    pub const INVITATION_CREATED: &str = "INVITATION_CREATED";
    pub const INVITATION_ACCEPTED: &str = "INVITATION_ACCEPTED";
    pub const INVITATION_DECLINED: &str = "INVITATION_DECLINED";
    pub const TOOL_CREATED: &str = "TOOL_CREATED";
    pub const TOOL_UPDATED: &str = "TOOL_UPDATED";
    pub const TOOL_ARCHIVED: &str = "TOOL_ARCHIVED";
    pub const ACCESS_REQUEST_CREATED: &str = "ACCESS_REQUEST_CREATED";
    pub const ACCESS_REQUEST_APPROVED: &str = "ACCESS_REQUEST_APPROVED";
    pub const ACCESS_REQUEST_REJECTED: &str = "ACCESS_REQUEST_REJECTED";
    pub const ACCESS_REQUEST_REVOKED: &str = "ACCESS_REQUEST_REVOKED";
}
