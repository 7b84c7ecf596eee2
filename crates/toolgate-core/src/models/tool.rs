use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Tool status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "tool_status", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ToolStatus {
    Active,
    Inactive,
}

/// Access tier on a tool. Toolgate only records approval state for a tier;
/// the access itself is granted outside this system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "access_level", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessLevel {
    Read,
    Write,
    Admin,
}

impl AccessLevel {
    /// The fixed set of tiers created for every tool, in creation order.
    pub const ALL: [AccessLevel; 3] = [AccessLevel::Read, AccessLevel::Write, AccessLevel::Admin];

    /// Default human-readable description used when seeding a tool's tiers.
    pub fn default_description(&self) -> &'static str {
        match self {
            AccessLevel::Read => "Read-only access",
            AccessLevel::Write => "Read and write access",
            AccessLevel::Admin => "Full administrative access",
        }
    }
}

/// Internal tool whose access is governed by this platform.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Tool {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: ToolStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// One of the three access tiers of a tool; immutable after tool creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ToolAccessLevel {
    pub id: Uuid,
    pub tool_id: Uuid,
    pub level: AccessLevel,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
