use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ProfileSummary;

/// Role of a user within an organization.
///
/// Closed three-value enum; authorization decisions compare against the
/// capability functions in [`crate::policy`], never against ad hoc role lists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "user_role", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Owner => write!(f, "OWNER"),
            Role::Admin => write!(f, "ADMIN"),
            Role::Member => write!(f, "MEMBER"),
        }
    }
}

/// Membership: the binding of a user to an organization with a role.
///
/// At most one non-deleted membership exists per (organization, user); the
/// storage layer enforces this with a partial unique index.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Membership {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Membership joined with the member's profile, as returned by the members
/// listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberDetails {
    #[serde(flatten)]
    pub membership: Membership,
    pub profile: Option<ProfileSummary>,
}
