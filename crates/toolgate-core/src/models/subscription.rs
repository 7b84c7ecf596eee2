use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Subscription plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "subscription_plan", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionPlan {
    Free,
    Pro,
}

/// Per-organization subscription with plan-dependent caps.
///
/// Provisioned together with the organization and read-only afterwards; the
/// caps feed [`crate::policy::CapacityReport`] as advisory soft limits.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Subscription {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub plan: SubscriptionPlan,
    pub user_limit: i64,
    pub tool_limit: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
